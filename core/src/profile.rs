//! Full dive calculation: validation, planning and the derived outputs.

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::algorithm::{
    no_deco_limit, plan_decompression, validate_input, Ceiling, DecoPlan, DecoStop,
};
use crate::error::DecoError;
use crate::gases::{name_for, validate, Gases};
use crate::issues::Issue;
use crate::options::DecompressionOptions;
use crate::pressure::DepthConverter;
use crate::segments::{Direction, Segment};
use crate::tissues::{TissueSnapshot, Tissues};
use crate::waypoints::{calculate_waypoints, Waypoint};

const SPEED_TOLERANCE: f64 = 1e-6;
const PPO2_TOLERANCE: f64 = 1e-6;

/// Input of one dive calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct PlanRequest {
    /// User-defined part of the dive, usually descent and bottom.
    pub segments: Vec<Segment>,
    pub gases: Gases,
    #[serde(default)]
    pub options: DecompressionOptions,
    /// Tissues at the end of a previous dive; empty for a first dive.
    #[serde(default)]
    pub previous_tissues: Vec<TissueSnapshot>,
    /// Minutes at the surface since `previous_tissues` were taken.
    #[serde(default)]
    pub surface_interval: f64,
}

/// Result of [`calculate`].
///
/// When `calculated` is false the issues explain why; `segments` then holds
/// only the user segments and there are no stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct CalculatedProfile {
    pub calculated: bool,
    pub segments: Vec<Segment>,
    pub stops: Vec<DecoStop>,
    pub waypoints: Vec<Waypoint>,
    pub ceilings: Vec<Ceiling>,
    /// Tissues at the end of the profile.
    pub tissues: Vec<TissueSnapshot>,
    /// Ceiling (m) under gf_high at the end of the user segments.
    pub ceiling: f64,
    /// No-decompression limit (min) at the end of the user segments.
    pub ndl: u32,
    pub time_to_surface: f64,
    pub issues: Vec<Issue>,
}

/// Plan a dive. Malformed input fails; problems with the gas plan are
/// reported as issues of an uncalculated profile.
#[instrument(skip_all, fields(segments = request.segments.len()))]
pub fn calculate(request: &PlanRequest) -> Result<CalculatedProfile, DecoError> {
    let options = &request.options;
    validate_input(&request.segments, options)?;
    for gas in request.gases.all() {
        gas.validate()?;
    }
    for segment in &request.segments {
        if !request.gases.is_registered(&segment.gas) {
            return Err(DecoError::invalid(format!(
                "segment gas {} is not registered",
                name_for(&segment.gas)
            )));
        }
    }

    let converter = options.depth_converter();
    let tissues = initial_tissues(request, &converter)?;
    let max_depth = request
        .segments
        .iter()
        .map(Segment::max_depth)
        .fold(0.0_f64, f64::max);

    let mut issues = validate(&request.gases, options, &converter, converter.to_bar(max_depth));
    issues.extend(segment_issues(&request.segments, options, &converter));

    let ndl = no_deco_limit(&request.segments, options, &tissues)?;
    let mut bottom = tissues.clone();
    for segment in &request.segments {
        bottom.load(segment, &segment.gas, &converter);
    }
    let ceiling = bottom.ceiling(options.gf_high, &converter);

    let plan = if issues.iter().any(Issue::is_blocking) {
        None
    } else {
        match plan_decompression(&request.segments, &request.gases, options, tissues) {
            Ok(plan) => Some(plan),
            Err(error) => match Issue::from_planning_failure(&error) {
                Some(issue) => {
                    warn!(%error, "plan aborted");
                    issues.push(issue);
                    None
                }
                None => return Err(error),
            },
        }
    };

    Ok(match plan {
        Some(plan) => planned(plan, ceiling, ndl, issues),
        None => CalculatedProfile {
            calculated: false,
            segments: request.segments.clone(),
            stops: Vec::new(),
            waypoints: calculate_waypoints(&request.segments),
            ceilings: Vec::new(),
            tissues: bottom.snapshot(),
            ceiling,
            ndl,
            time_to_surface: 0.0,
            issues,
        },
    })
}

fn planned(plan: DecoPlan, ceiling: f64, ndl: u32, issues: Vec<Issue>) -> CalculatedProfile {
    CalculatedProfile {
        calculated: true,
        stops: plan.stops(),
        time_to_surface: plan.time_to_surface(),
        waypoints: calculate_waypoints(&plan.segments),
        tissues: plan.tissues.snapshot(),
        segments: plan.segments,
        ceilings: plan.ceilings,
        ceiling,
        ndl,
        issues,
    }
}

/// Surface-saturated tissues, or the previous dive's tissues off-gassed over
/// the surface interval.
fn initial_tissues(
    request: &PlanRequest,
    converter: &DepthConverter,
) -> Result<Tissues, DecoError> {
    if !request.surface_interval.is_finite() || request.surface_interval < 0.0 {
        return Err(DecoError::invalid("surface interval must not be negative"));
    }
    if request.previous_tissues.is_empty() {
        return Ok(Tissues::new(converter.surface_pressure()));
    }

    let mut tissues =
        Tissues::from_snapshot(&request.previous_tissues, converter.surface_pressure())?;
    if request.surface_interval > 0.0 {
        tissues.surface_interval(request.surface_interval, converter);
    }
    Ok(tissues)
}

/// User segments moving faster than the configured speeds or breathing a gas
/// above the maximum ppO2.
fn segment_issues(
    segments: &[Segment],
    options: &DecompressionOptions,
    converter: &DepthConverter,
) -> Vec<Issue> {
    let max_ascent = options
        .ascent_speed_50perc
        .max(options.ascent_speed_50perc_to_6m)
        .max(options.ascent_speed_6m);

    let mut issues = Vec::new();
    for (index, segment) in segments.iter().enumerate() {
        let index = index as u32;
        let speed = segment.speed().abs();
        match segment.direction() {
            Direction::Descending if speed > options.descent_speed + SPEED_TOLERANCE => {
                issues.push(Issue::HighDescentSpeed {
                    segment: index,
                    speed,
                });
            }
            Direction::Ascending if speed > max_ascent + SPEED_TOLERANCE => {
                issues.push(Issue::HighAscentSpeed {
                    segment: index,
                    speed,
                });
            }
            _ => {}
        }

        let ppo2 = segment.gas.ppo2_at(segment.max_depth(), converter);
        if ppo2 > options.max_ppo2 + PPO2_TOLERANCE {
            issues.push(Issue::HighPpO2 {
                segment: index,
                ppo2,
            });
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gases::Gas;

    const AIR: Gas = Gas::air();
    const EAN50: Gas = Gas::new(0.5, 0.0);

    fn request(depth: f64, bottom_time: f64, gases: Gases) -> PlanRequest {
        PlanRequest {
            segments: vec![
                Segment::new(0.0, depth, depth / 10.0, AIR),
                Segment::flat(depth, bottom_time, AIR),
            ],
            gases,
            ..Default::default()
        }
    }

    fn air_only() -> Gases {
        let mut gases = Gases::new();
        gases.add_bottom_gas(AIR);
        gases
    }

    #[test]
    fn test_deco_dive() {
        let profile = calculate(&request(40.0, 20.0, air_only())).unwrap();
        assert!(profile.calculated);
        assert!(profile.issues.is_empty(), "issues: {:?}", profile.issues);
        assert!(!profile.stops.is_empty());
        assert_eq!(profile.ndl, 0);
        assert!(profile.ceiling > 0.0);
        assert_eq!(profile.waypoints.len(), profile.segments.len());
        assert_eq!(profile.tissues.len(), 16);
        assert!(profile.time_to_surface > 0.0);

        let total: f64 = profile.segments.iter().map(|s| s.duration).sum();
        let last = profile.waypoints.last().unwrap();
        assert!((last.end_time - total).abs() < 1e-9);
        assert_eq!(last.end_depth, 0.0);
    }

    #[test]
    fn test_no_deco_dive() {
        let profile = calculate(&request(18.0, 20.0, air_only())).unwrap();
        assert!(profile.calculated);
        assert_eq!(profile.ceiling, 0.0);
        assert!(profile.ndl > 0);
        // only the safety stop
        assert_eq!(profile.stops.len(), 1);
    }

    #[test]
    fn test_gas_plan_issues_skip_planning() {
        let trimix = Gas::new(0.1, 0.7);
        let mut gases = Gases::new();
        gases.add_bottom_gas(trimix);
        gases.add_deco_gas(Gas::oxygen());
        let mut request = request(60.0, 10.0, gases);
        for segment in &mut request.segments {
            segment.gas = trimix;
        }

        let profile = calculate(&request).unwrap();
        assert!(!profile.calculated);
        assert!(profile
            .issues
            .iter()
            .any(|issue| matches!(issue, Issue::GasCoverageGap { .. })));
        assert_eq!(profile.segments, request.segments);
        assert!(profile.stops.is_empty());
    }

    #[test]
    fn test_unregistered_gas_is_invalid() {
        let mut gases = Gases::new();
        gases.add_bottom_gas(EAN50);
        let result = calculate(&request(20.0, 10.0, gases));
        assert!(matches!(result, Err(DecoError::InvalidInput { .. })));
    }

    #[test]
    fn test_fast_descent_is_reported() {
        let mut request = request(30.0, 10.0, air_only());
        request.segments[0].duration = 1.0;

        let profile = calculate(&request).unwrap();
        assert!(profile.calculated, "speed issues do not block planning");
        assert_eq!(
            profile.issues,
            vec![Issue::HighDescentSpeed {
                segment: 0,
                speed: 30.0
            }]
        );
    }

    #[test]
    fn test_fast_ascent_is_reported() {
        let mut request = request(30.0, 10.0, air_only());
        request.segments.push(Segment::new(30.0, 10.0, 1.0, AIR));

        let profile = calculate(&request).unwrap();
        assert!(matches!(
            profile.issues.as_slice(),
            [Issue::HighAscentSpeed { segment: 2, .. }]
        ));
    }

    #[test]
    fn test_high_ppo2_is_reported() {
        let mut gases = air_only();
        gases.add_deco_gas(EAN50);
        let mut request = request(40.0, 20.0, gases);
        for segment in &mut request.segments {
            segment.gas = EAN50;
        }

        let profile = calculate(&request).unwrap();
        assert!(profile.calculated, "ppO2 issues do not block planning");
        let flagged: Vec<u32> = profile
            .issues
            .iter()
            .map(|issue| match issue {
                Issue::HighPpO2 { segment, ppo2 } => {
                    assert!((ppo2 - 2.527).abs() < 0.001, "ppO2 was {ppo2}");
                    *segment
                }
                other => panic!("unexpected issue {other:?}"),
            })
            .collect();
        // the descent reaches 40 m too
        assert_eq!(flagged, vec![0, 1]);
    }

    #[test]
    fn test_repetitive_dive_needs_more_deco() {
        let mut gases = air_only();
        gases.add_deco_gas(EAN50);
        let first = calculate(&request(40.0, 20.0, gases.clone())).unwrap();

        let fresh = calculate(&request(30.0, 20.0, gases.clone())).unwrap();
        let repetitive = calculate(&PlanRequest {
            previous_tissues: first.tissues.clone(),
            surface_interval: 60.0,
            ..request(30.0, 20.0, gases)
        })
        .unwrap();

        assert!(repetitive.time_to_surface > fresh.time_to_surface);
        assert!(repetitive.ndl <= fresh.ndl);
    }

    #[test]
    fn test_invalid_previous_tissues() {
        let request = PlanRequest {
            previous_tissues: vec![TissueSnapshot {
                p_n2: 0.75,
                p_he: 0.0,
                p_total: 0.75,
            }],
            ..request(20.0, 10.0, air_only())
        };
        assert!(matches!(
            calculate(&request),
            Err(DecoError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_request_json_uses_default_options() {
        let json = r#"{
            "segments": [
                {"start_depth": 0.0, "end_depth": 30.0, "duration": 3.0, "gas": {"fo2": 0.21, "fhe": 0.0}},
                {"start_depth": 30.0, "end_depth": 30.0, "duration": 10.0, "gas": {"fo2": 0.21, "fhe": 0.0}}
            ],
            "gases": {"bottom": [{"fo2": 0.21, "fhe": 0.0}], "deco": []}
        }"#;
        let request: PlanRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.options, DecompressionOptions::default());

        let profile = calculate(&request).unwrap();
        let encoded = serde_json::to_value(&profile).unwrap();
        assert_eq!(encoded["calculated"], true);
        assert!(encoded["waypoints"].as_array().is_some_and(|w| !w.is_empty()));
    }
}
