//! Dive profile segments.

use serde::{Deserialize, Serialize};

use crate::error::DecoError;
use crate::gases::Gas;

/// Depths closer than this are the same depth.
const DEPTH_TOLERANCE: f64 = 1e-9;

/// Longest accepted segment, one week in minutes.
pub const MAX_SEGMENT_DURATION: f64 = 7.0 * 24.0 * 60.0;

/// Direction of a segment, from its speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, uniffi::Enum)]
pub enum Direction {
    Descending,
    Level,
    Ascending,
}

/// One leg of a dive: depth change over time on one gas.
///
/// Depths in metres, duration in minutes. The gas is a snapshot taken when
/// the segment was built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct Segment {
    pub start_depth: f64,
    pub end_depth: f64,
    pub duration: f64,
    pub gas: Gas,
}

impl Segment {
    pub fn new(start_depth: f64, end_depth: f64, duration: f64, gas: Gas) -> Self {
        Segment {
            start_depth,
            end_depth,
            duration,
            gas,
        }
    }

    /// Segment staying at `depth`.
    pub fn flat(depth: f64, duration: f64, gas: Gas) -> Self {
        Self::new(depth, depth, duration, gas)
    }

    /// Segment moving between two depths at `speed` m/min (unsigned).
    pub fn depth_change(start_depth: f64, end_depth: f64, speed: f64, gas: Gas) -> Self {
        let duration = (end_depth - start_depth).abs() / speed;
        Self::new(start_depth, end_depth, duration, gas)
    }

    /// Signed speed in m/min, positive when descending; 0 for empty segments.
    pub fn speed(&self) -> f64 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (self.end_depth - self.start_depth) / self.duration
    }

    pub fn is_flat(&self) -> bool {
        (self.end_depth - self.start_depth).abs() < DEPTH_TOLERANCE
    }

    pub fn direction(&self) -> Direction {
        if self.is_flat() {
            Direction::Level
        } else if self.end_depth > self.start_depth {
            Direction::Descending
        } else {
            Direction::Ascending
        }
    }

    pub fn max_depth(&self) -> f64 {
        self.start_depth.max(self.end_depth)
    }

    pub fn validate(&self) -> Result<(), DecoError> {
        let values = [self.start_depth, self.end_depth, self.duration];
        if values.iter().any(|value| !value.is_finite()) {
            return Err(DecoError::invalid("segment values must be finite"));
        }
        if self.start_depth < 0.0 || self.end_depth < 0.0 {
            return Err(DecoError::invalid("segment depth must not be negative"));
        }
        if self.duration < 0.0 {
            return Err(DecoError::invalid("segment duration must not be negative"));
        }
        if self.duration > MAX_SEGMENT_DURATION {
            return Err(DecoError::invalid(format!(
                "segment duration must not exceed {MAX_SEGMENT_DURATION} min"
            )));
        }
        if self.duration == 0.0 && !self.is_flat() {
            return Err(DecoError::invalid(
                "segment changing depth needs a positive duration",
            ));
        }
        self.gas.validate()
    }
}

/// Ordered profile under construction.
///
/// Legs continuing the previous one at the same speed on the same gas can be
/// merged, so a stop built minute by minute or an ascent built stop by stop
/// ends up as one segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segments {
    items: Vec<Segment>,
}

impl Segments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(items: Vec<Segment>) -> Self {
        Segments { items }
    }

    /// Append a segment without merging.
    pub fn add(&mut self, segment: Segment) {
        self.items.push(segment);
    }

    /// Append a segment, extending the last one when it continues it: same
    /// gas, same speed and starting where the last one ends.
    pub fn add_merged(&mut self, segment: Segment) {
        if let Some(last) = self.items.last_mut() {
            if (last.end_depth - segment.start_depth).abs() < DEPTH_TOLERANCE
                && (last.speed() - segment.speed()).abs() < DEPTH_TOLERANCE
                && last.gas.composition_equals(Some(&segment.gas))
            {
                last.end_depth = segment.end_depth;
                last.duration += segment.duration;
                return;
            }
        }
        self.items.push(segment);
    }

    pub fn last(&self) -> Option<&Segment> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Segment] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Segment> {
        self.items
    }

    /// Total duration in minutes.
    pub fn duration(&self) -> f64 {
        self.items.iter().map(|segment| segment.duration).sum()
    }

    pub fn max_depth(&self) -> f64 {
        self.items
            .iter()
            .map(Segment::max_depth)
            .fold(0.0_f64, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AIR: Gas = Gas::air();

    #[test]
    fn test_speed_and_direction() {
        let descent = Segment::new(0.0, 40.0, 4.0, AIR);
        assert_eq!(descent.speed(), 10.0);
        assert_eq!(descent.direction(), Direction::Descending);

        let ascent = Segment::new(40.0, 10.0, 3.0, AIR);
        assert_eq!(ascent.speed(), -10.0);
        assert_eq!(ascent.direction(), Direction::Ascending);

        let level = Segment::flat(40.0, 20.0, AIR);
        assert_eq!(level.speed(), 0.0);
        assert!(level.is_flat());
        assert_eq!(level.direction(), Direction::Level);
    }

    #[test]
    fn test_depth_change_duration() {
        let ascent = Segment::depth_change(30.0, 21.0, 9.0, AIR);
        assert!((ascent.duration - 1.0).abs() < 1e-12);
        assert!((ascent.speed() + 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_validate() {
        assert!(Segment::new(0.0, 40.0, 4.0, AIR).validate().is_ok());
        assert!(Segment::flat(0.0, 0.0, AIR).validate().is_ok());
        assert!(Segment::new(-1.0, 10.0, 1.0, AIR).validate().is_err());
        assert!(Segment::new(0.0, 10.0, 0.0, AIR).validate().is_err());
        assert!(Segment::flat(10.0, -1.0, AIR).validate().is_err());
        assert!(Segment::flat(10.0, 1.0, Gas::new(0.0, 0.0)).validate().is_err());
        assert!(Segment::flat(10.0, MAX_SEGMENT_DURATION, AIR).validate().is_ok());
        assert!(Segment::flat(10.0, 1e15, AIR).validate().is_err());
    }

    #[test]
    fn test_add_merged_extends_same_stop() {
        let mut segments = Segments::new();
        segments.add(Segment::new(40.0, 6.0, 5.0, AIR));
        segments.add_merged(Segment::flat(6.0, 1.0, AIR));
        segments.add_merged(Segment::flat(6.0, 1.0, AIR));
        assert_eq!(segments.len(), 2);
        assert_eq!(segments.last().map(|s| s.duration), Some(2.0));

        // different gas starts a new segment
        segments.add_merged(Segment::flat(6.0, 1.0, Gas::oxygen()));
        assert_eq!(segments.len(), 3);
        assert_eq!(segments.duration(), 8.0);
        assert_eq!(segments.max_depth(), 40.0);
    }

    #[test]
    fn test_add_merged_extends_ascent() {
        let mut segments = Segments::new();
        segments.add_merged(Segment::depth_change(30.0, 27.0, 9.0, AIR));
        segments.add_merged(Segment::depth_change(27.0, 24.0, 9.0, AIR));
        assert_eq!(segments.len(), 1);
        let ascent = segments.items()[0];
        assert_eq!(ascent.end_depth, 24.0);
        assert!((ascent.speed() + 9.0).abs() < 1e-9);

        // slower tier is a new segment
        segments.add_merged(Segment::depth_change(24.0, 21.0, 6.0, AIR));
        assert_eq!(segments.len(), 2);
    }
}
