//! Renderable profile: one waypoint per segment with cumulative run time.

use serde::{Deserialize, Serialize};

use crate::gases::Gas;
use crate::segments::{Direction, Segment};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct Waypoint {
    /// Run time when the segment starts (min)
    pub start_time: f64,
    /// Run time when the segment ends (min)
    pub end_time: f64,
    pub start_depth: f64,
    pub end_depth: f64,
    pub duration: f64,
    pub gas: Gas,
    pub direction: Direction,
    /// Set when the gas differs from the previous segment's gas.
    pub gas_switch: bool,
}

impl Waypoint {
    fn from_segment(segment: &Segment, start_time: f64, gas_switch: bool) -> Self {
        Waypoint {
            start_time,
            end_time: start_time + segment.duration,
            start_depth: segment.start_depth,
            end_depth: segment.end_depth,
            duration: segment.duration,
            gas: segment.gas,
            direction: segment.direction(),
            gas_switch,
        }
    }
}

/// Convert a profile into waypoints. An empty profile gives no waypoints.
pub fn calculate_waypoints(segments: &[Segment]) -> Vec<Waypoint> {
    let mut waypoints = Vec::with_capacity(segments.len());
    let mut run_time = 0.0;
    let mut previous: Option<&Segment> = None;

    for segment in segments {
        let gas_switch =
            previous.is_some_and(|last| !segment.gas.composition_equals(Some(&last.gas)));
        let waypoint = Waypoint::from_segment(segment, run_time, gas_switch);
        run_time = waypoint.end_time;
        waypoints.push(waypoint);
        previous = Some(segment);
    }

    waypoints
}

#[cfg(test)]
mod tests {
    use super::*;

    const AIR: Gas = Gas::air();
    const EAN50: Gas = Gas::new(0.5, 0.0);

    #[test]
    fn test_empty_profile() {
        assert!(calculate_waypoints(&[]).is_empty());
    }

    #[test]
    fn test_run_time_accumulates() {
        let segments = [
            Segment::new(0.0, 30.0, 3.0, AIR),
            Segment::flat(30.0, 10.0, AIR),
            Segment::new(30.0, 0.0, 10.0, AIR),
        ];
        let waypoints = calculate_waypoints(&segments);
        assert_eq!(waypoints.len(), 3);
        assert_eq!(waypoints[0].start_time, 0.0);
        assert_eq!(waypoints[1].start_time, 3.0);
        assert_eq!(waypoints[2].start_time, 13.0);
        assert_eq!(waypoints[2].end_time, 23.0);
        assert_eq!(waypoints[0].direction, Direction::Descending);
        assert_eq!(waypoints[1].direction, Direction::Level);
        assert_eq!(waypoints[2].direction, Direction::Ascending);
        assert!(waypoints.iter().all(|w| !w.gas_switch));
    }

    #[test]
    fn test_gas_switch_flag() {
        let segments = [
            Segment::new(0.0, 30.0, 3.0, EAN50),
            Segment::new(30.0, 21.0, 1.0, AIR),
            Segment::flat(21.0, 1.0, EAN50),
            Segment::flat(21.0, 2.0, Gas::new(0.5, 0.0)),
        ];
        let switches: Vec<bool> = calculate_waypoints(&segments)
            .iter()
            .map(|w| w.gas_switch)
            .collect();
        // the first segment never counts as a switch
        assert_eq!(switches, vec![false, true, true, false]);
    }
}
