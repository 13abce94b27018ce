//! Checks that a registry of gases covers the whole dive.

use super::mix::Gas;
use super::registry::Gases;
use crate::issues::Issue;
use crate::options::DecompressionOptions;
use crate::pressure::DepthConverter;

/// Pressure range (bar) in which a gas can be breathed.
#[derive(Debug, Clone, Copy)]
struct Range {
    from: f64,
    to: f64,
}

impl Range {
    fn of(gas: &Gas, ppo2: f64) -> Self {
        Range {
            from: gas.ceiling_bars(),
            to: gas.mod_bars(ppo2),
        }
    }
}

/// Validate the registry against a dive reaching `max_depth_pressure` bar.
///
/// Each failed check yields one issue. An empty registry only reports
/// `NoGasDefined`.
pub fn validate(
    gases: &Gases,
    options: &DecompressionOptions,
    converter: &DepthConverter,
    max_depth_pressure: f64,
) -> Vec<Issue> {
    if gases.is_empty() {
        return vec![Issue::NoGasDefined];
    }

    let mut issues = Vec::new();
    let surface_pressure = converter.surface_pressure();

    let covers_bottom = gases
        .bottom
        .iter()
        .any(|gas| gas.mod_bars(options.max_ppo2) >= max_depth_pressure);
    if !covers_bottom {
        issues.push(Issue::NoBottomGasForDepth {
            max_depth: to_depth(converter, max_depth_pressure),
        });
    }

    let reaches_surface = gases.all().any(|gas| gas.ceiling_bars() <= surface_pressure);
    if !reaches_surface {
        issues.push(Issue::NoGasToSurface);
    }

    if let Some(gap) = find_gap(gases, options, max_depth_pressure) {
        issues.push(Issue::GasCoverageGap {
            from_depth: to_depth(converter, gap.from),
            to_depth: to_depth(converter, gap.to),
        });
    }

    issues
}

fn to_depth(converter: &DepthConverter, bars: f64) -> f64 {
    converter.from_bar(bars).max(0.0)
}

/// First hole between breathable ranges shallower than `max_depth_pressure`.
///
/// Not covering the surface or the bottom is reported by the other checks.
fn find_gap(
    gases: &Gases,
    options: &DecompressionOptions,
    max_depth_pressure: f64,
) -> Option<Range> {
    let mut ranges: Vec<Range> = gases
        .bottom
        .iter()
        .map(|gas| Range::of(gas, options.max_ppo2))
        .chain(gases.deco.iter().map(|gas| Range::of(gas, options.max_deco_ppo2)))
        .filter(|range| range.from <= range.to)
        .collect();
    ranges.sort_by(|a, b| a.from.total_cmp(&b.from));

    let mut ranges = ranges.into_iter();
    let mut reach = ranges.next()?.to;
    for range in ranges {
        if reach >= max_depth_pressure {
            break;
        }
        if range.from > reach {
            return Some(Range {
                from: reach,
                to: range.from.min(max_depth_pressure),
            });
        }
        reach = reach.max(range.to);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const AIR: Gas = Gas::air();
    const EAN50: Gas = Gas::new(0.5, 0.0);
    const TRIMIX_1070: Gas = Gas::new(0.1, 0.7);
    const OXYGEN: Gas = Gas::oxygen();

    fn run(gases: &Gases, max_depth_pressure: f64) -> Vec<Issue> {
        let options = DecompressionOptions::default();
        validate(gases, &options, &DepthConverter::for_fresh_water(), max_depth_pressure)
    }

    #[test]
    fn test_no_gas_defined() {
        assert_eq!(run(&Gases::new(), 4.0), vec![Issue::NoGasDefined]);
    }

    #[test]
    fn test_only_one_gas() {
        let mut gases = Gases::new();
        gases.add_bottom_gas(AIR);
        assert!(run(&gases, 4.0).is_empty());
    }

    #[test]
    fn test_no_bottom_gas_for_depth() {
        let mut gases = Gases::new();
        gases.add_bottom_gas(AIR);
        let issues = run(&gases, 11.0);
        assert_eq!(issues.len(), 1);
        assert!(matches!(issues[0], Issue::NoBottomGasForDepth { .. }));
    }

    #[test]
    fn test_no_gas_to_surface() {
        let mut gases = Gases::new();
        gases.add_bottom_gas(TRIMIX_1070);
        assert_eq!(run(&gases, 4.0), vec![Issue::NoGasToSurface]);
    }

    #[test]
    fn test_gases_do_not_cover_all_depths() {
        let mut gases = Gases::new();
        gases.add_bottom_gas(TRIMIX_1070);
        gases.add_deco_gas(OXYGEN);
        let issues = run(&gases, 4.0);
        assert_eq!(issues.len(), 1);
        match issues[0] {
            Issue::GasCoverageGap {
                from_depth,
                to_depth,
            } => {
                // oxygen ends at 1.6 bar, trimix 10/70 starts at ~1.82 bar
                assert!(from_depth < to_depth);
                assert!((to_depth - 8.27).abs() < 0.01, "gap ends at {to_depth}");
            }
            ref other => panic!("expected a coverage gap, got {other:?}"),
        }
    }

    #[test]
    fn test_multiple_gases() {
        let mut gases = Gases::new();
        gases.add_bottom_gas(AIR);
        gases.add_deco_gas(EAN50);
        assert!(run(&gases, 4.0).is_empty());
    }

    #[test]
    fn test_independent_checks_accumulate() {
        let mut gases = Gases::new();
        gases.add_bottom_gas(TRIMIX_1070);
        gases.add_deco_gas(OXYGEN);
        // too deep for 10/70 at ppO2 1.4, and a gap between O2 and 10/70
        let issues = run(&gases, 15.0);
        assert_eq!(issues.len(), 2);
    }
}
