//! Decompression planning over an ordered list of segments.
//!
//! The planner loads the user-defined segments, then ascends stop by stop:
//! at every stop depth it switches to the best deco gas, and it only leaves a
//! depth once the tissue ceiling (under the gradient factor interpolated for
//! the next depth) allows it. The NDL search works on a copy of the tissues.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

use crate::error::DecoError;
use crate::gases::{name_for, BestGasOptions, Gas, Gases};
use crate::options::{DecompressionOptions, SAFETY_STOP_DURATION, STOP_DISTANCE};
use crate::pressure::DepthConverter;
use crate::segments::{Segment, Segments};
use crate::tissues::Tissues;

/// One day in minutes; the NDL search gives up here and reports it as
/// unlimited.
pub const NDL_UNLIMITED: u32 = 1440;

/// Longest time spent at one stop before the ascent is declared unreachable.
const MAX_STOP_DURATION: f64 = NDL_UNLIMITED as f64;

/// Stops are extended by this many minutes at a time.
const STOP_INCREMENT: f64 = 1.0;

const DEPTH_TOLERANCE: f64 = 1e-9;
const TIME_TOLERANCE: f64 = 1e-9;

/// Ceiling at a given run time, for charting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct Ceiling {
    /// Run time (min)
    pub time: f64,
    /// Ceiling depth (m)
    pub depth: f64,
}

/// A mandatory stop in the generated schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct DecoStop {
    /// Stop depth (m)
    pub depth: f64,
    /// Stop duration (min)
    pub duration: f64,
    pub gas: Gas,
}

/// Gradient factor as a function of depth.
///
/// Until the first stop is known `low` applies. Afterwards the factor moves
/// linearly from `low` at the first stop to `high` at the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientFactors {
    low: f64,
    high: f64,
    first_stop: Option<f64>,
}

impl GradientFactors {
    pub fn new(low: f64, high: f64) -> Self {
        GradientFactors {
            low,
            high,
            first_stop: None,
        }
    }

    pub fn first_stop(&self) -> Option<f64> {
        self.first_stop
    }

    /// Fix the first stop; later calls keep the first value.
    pub fn anchor(&mut self, depth: f64) {
        if self.first_stop.is_none() {
            self.first_stop = Some(depth);
        }
    }

    pub fn at(&self, depth: f64) -> f64 {
        match self.first_stop {
            None => self.low,
            Some(first_stop) if first_stop <= 0.0 => self.high,
            Some(first_stop) => {
                let gf = self.high - (self.high - self.low) * depth / first_stop;
                gf.clamp(self.low, self.high)
            }
        }
    }
}

/// Profile expanded with the synthesized ascent.
#[derive(Debug, Clone)]
pub struct DecoPlan {
    pub segments: Vec<Segment>,
    /// Index of the first ascent segment in `segments`.
    pub ascent_start: usize,
    pub ceilings: Vec<Ceiling>,
    /// Tissues at the surface after the whole plan.
    pub tissues: Tissues,
    pub first_stop: Option<f64>,
}

impl DecoPlan {
    /// Flat segments of the ascent below the surface.
    pub fn stops(&self) -> Vec<DecoStop> {
        self.segments[self.ascent_start..]
            .iter()
            .filter(|segment| {
                segment.is_flat() && segment.end_depth > DEPTH_TOLERANCE && segment.duration > 0.0
            })
            .map(|segment| DecoStop {
                depth: segment.end_depth,
                duration: segment.duration,
                gas: segment.gas,
            })
            .collect()
    }

    /// Minutes from leaving the bottom to reaching the surface.
    pub fn time_to_surface(&self) -> f64 {
        self.segments[self.ascent_start..]
            .iter()
            .map(|segment| segment.duration)
            .sum()
    }
}

/// Reject malformed segments and options before any simulation.
pub fn validate_input(
    segments: &[Segment],
    options: &DecompressionOptions,
) -> Result<(), DecoError> {
    options.validate()?;
    if segments.is_empty() {
        return Err(DecoError::invalid("no segments provided"));
    }
    for segment in segments {
        segment.validate()?;
    }
    for pair in segments.windows(2) {
        if (pair[0].end_depth - pair[1].start_depth).abs() > 1e-6 {
            return Err(DecoError::invalid(format!(
                "segment starting at {} m does not continue from {} m",
                pair[1].start_depth, pair[0].end_depth
            )));
        }
    }
    Ok(())
}

struct Planner<'a> {
    gases: &'a Gases,
    options: &'a DecompressionOptions,
    converter: DepthConverter,
    best_gas: BestGasOptions,
    tissues: Tissues,
    segments: Segments,
    /// Segments before this index are never merged into.
    fixed: usize,
    ceilings: Vec<Ceiling>,
    run_time: f64,
    gf: GradientFactors,
}

impl<'a> Planner<'a> {
    fn new(gases: &'a Gases, options: &'a DecompressionOptions, tissues: Tissues) -> Self {
        let converter = options.depth_converter();
        let best_gas = BestGasOptions {
            max_deco_ppo2: options.max_deco_ppo2,
            max_end_pressure: options.max_end_pressure(&converter),
        };
        Planner {
            gases,
            options,
            converter,
            best_gas,
            tissues,
            segments: Segments::new(),
            fixed: 0,
            ceilings: Vec::new(),
            run_time: 0.0,
            gf: GradientFactors::new(options.gf_low, options.gf_high),
        }
    }

    /// Append a segment and load the tissues with it.
    fn push(&mut self, segment: Segment) -> Result<(), DecoError> {
        if self.segments.len() > self.fixed {
            self.segments.add_merged(segment);
        } else {
            self.segments.add(segment);
        }
        self.load(&segment)
    }

    /// Load in slices ending on whole minutes of run time, sampling the
    /// ceiling at each of them.
    fn load(&mut self, segment: &Segment) -> Result<(), DecoError> {
        let speed = segment.speed();
        let mut remaining = segment.duration;
        let mut depth = segment.start_depth;

        while remaining > TIME_TOLERANCE {
            let to_next_minute = (self.run_time + TIME_TOLERANCE).floor() + 1.0 - self.run_time;
            let step = remaining.min(to_next_minute);
            remaining -= step;
            let end = if remaining > TIME_TOLERANCE {
                (depth + speed * step).max(0.0)
            } else {
                segment.end_depth
            };

            let slice = Segment::new(depth, end, step, segment.gas);
            self.tissues.load(&slice, &segment.gas, &self.converter);
            self.run_time += step;
            depth = end;

            if (self.run_time - self.run_time.round()).abs() < TIME_TOLERANCE {
                self.ceilings.push(Ceiling {
                    time: self.run_time.round(),
                    depth: self.tissues.ceiling(self.gf.at(end), &self.converter),
                });
            }
        }

        if !self.tissues.is_finite() {
            return Err(DecoError::divergence(format!(
                "tissue pressures diverged at {:.1} min",
                self.run_time
            )));
        }
        Ok(())
    }

    /// Next stop above `depth`: the closest shallower multiple of the stop
    /// distance, or the surface from the last stop.
    fn next_stop(&self, depth: f64) -> f64 {
        if depth <= self.options.last_stop_depth + DEPTH_TOLERANCE {
            return 0.0;
        }
        let below = ((depth - DEPTH_TOLERANCE) / STOP_DISTANCE).floor() * STOP_DISTANCE;
        below.max(self.options.last_stop_depth)
    }

    /// Whether the tissues tolerate `ascent` under the gradient factor of its
    /// target depth. Works on a copy.
    fn can_ascend(&self, ascent: &Segment) -> bool {
        let mut trial = self.tissues.clone();
        trial.load(ascent, &ascent.gas, &self.converter);
        let gf = self.gf.at(ascent.end_depth);
        trial.ceiling(gf, &self.converter) <= ascent.end_depth + DEPTH_TOLERANCE
    }

    fn is_breathable(&self, gas: &Gas, depth: f64) -> bool {
        gas.ceiling_bars() <= self.converter.to_bar(depth) + DEPTH_TOLERANCE
    }

    /// Switch to a better gas at `depth`, adding the switch segment.
    fn switch_gas(&mut self, depth: f64, current: Gas) -> Result<Gas, DecoError> {
        match self.gases.best_deco_gas(depth, &self.converter, &self.best_gas) {
            Ok(best)
                if !best.composition_equals(Some(&current))
                    && (best.fo2 > current.fo2 || !self.is_breathable(&current, depth)) =>
            {
                debug!(depth, gas = %name_for(&best), "gas switch");
                let switch = Segment::flat(depth, self.options.gas_switch_duration, best);
                self.segments.add(switch);
                self.load(&switch)?;
                Ok(best)
            }
            Ok(_) => Ok(current),
            Err(_) if self.is_breathable(&current, depth) => Ok(current),
            Err(_) => {
                warn!(depth, "no breathable gas during ascent");
                Err(DecoError::UnreachableAscent { depth })
            }
        }
    }

    /// Stay at `from` until the ascent to `to` is allowed, then ascend.
    fn ascend(&mut self, from: f64, to: f64, gas: Gas, safety_stop: bool) -> Result<(), DecoError> {
        let speed = self.options.ascent_speed(from, self.segments.max_depth());
        let mut waited = 0.0;

        loop {
            let ascent = Segment::depth_change(from, to, speed, gas);
            let clear = self.can_ascend(&ascent);
            let safety_done = !safety_stop || waited + TIME_TOLERANCE >= SAFETY_STOP_DURATION;
            if clear && safety_done {
                return self.push(ascent);
            }

            if !clear && self.gf.first_stop().is_none() {
                debug!(depth = from, "first stop");
                self.gf.anchor(from);
                continue;
            }

            if waited >= MAX_STOP_DURATION {
                warn!(depth = from, "stop never clears");
                return Err(DecoError::UnreachableAscent { depth: from });
            }

            self.push(Segment::flat(from, STOP_INCREMENT, gas))?;
            waited += STOP_INCREMENT;
            trace!(depth = from, waited, "stop");
        }
    }
}

/// Load `segments` onto `tissues` and synthesize the ascent to the surface.
#[instrument(skip_all, fields(segments = segments.len()))]
pub fn plan_decompression(
    segments: &[Segment],
    gases: &Gases,
    options: &DecompressionOptions,
    tissues: Tissues,
) -> Result<DecoPlan, DecoError> {
    validate_input(segments, options)?;

    let mut planner = Planner::new(gases, options, tissues);
    for segment in segments {
        planner.segments.add(*segment);
        planner.load(segment)?;
    }

    let bottom = segments[segments.len() - 1];
    let mut depth = bottom.end_depth;
    let mut gas = bottom.gas;

    if depth > DEPTH_TOLERANCE && options.problem_solving_duration > 0.0 {
        let problem_solving = Segment::flat(depth, options.problem_solving_duration, gas);
        planner.segments.add(problem_solving);
        planner.load(&problem_solving)?;
    }
    planner.fixed = planner.segments.len();
    let ascent_start = planner.fixed;

    if planner.tissues.ceiling(options.gf_high, &planner.converter) <= 0.0 {
        debug!("no decompression required");
        planner.gf = GradientFactors::new(options.gf_high, options.gf_high);
    }

    let safety_stop = options.needs_safety_stop(planner.segments.max_depth());
    let mut leaving_bottom = true;
    while depth > DEPTH_TOLERANCE {
        if !leaving_bottom {
            gas = planner.switch_gas(depth, gas)?;
        }
        leaving_bottom = false;

        let next = planner.next_stop(depth);
        planner.ascend(depth, next, gas, safety_stop && next <= 0.0)?;
        depth = next;
    }

    Ok(DecoPlan {
        segments: planner.segments.into_vec(),
        ascent_start,
        ceilings: planner.ceilings,
        tissues: planner.tissues,
        first_stop: planner.gf.first_stop(),
    })
}

/// Minutes the diver can still stay at the depth where `segments` end before
/// a stop becomes mandatory (under gf_high). 0 when already in deco,
/// [`NDL_UNLIMITED`] when the limit is a day or more. `tissues` is not changed.
#[instrument(skip_all, fields(segments = segments.len()))]
pub fn no_deco_limit(
    segments: &[Segment],
    options: &DecompressionOptions,
    tissues: &Tissues,
) -> Result<u32, DecoError> {
    validate_input(segments, options)?;
    let converter = options.depth_converter();

    let mut trial = tissues.clone();
    for segment in segments {
        trial.load(segment, &segment.gas, &converter);
    }
    if !trial.is_finite() {
        return Err(DecoError::divergence("tissue pressures diverged"));
    }
    if trial.ceiling(options.gf_high, &converter) > 0.0 {
        return Ok(0);
    }

    let bottom = segments[segments.len() - 1];
    let minute = Segment::flat(bottom.end_depth, 1.0, bottom.gas);
    for elapsed in 0..NDL_UNLIMITED {
        trial.load(&minute, &minute.gas, &converter);
        if trial.ceiling(options.gf_high, &converter) > 0.0 {
            debug!(depth = bottom.end_depth, ndl = elapsed, "no decompression limit");
            return Ok(elapsed);
        }
    }
    Ok(NDL_UNLIMITED)
}
