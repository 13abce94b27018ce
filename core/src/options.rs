//! Decompression options.
//!
//! One value is used for a whole calculation. Missing fields deserialize to
//! the defaults below.

use serde::{Deserialize, Serialize};

use crate::error::DecoError;
use crate::pressure::{DepthConverter, WaterType, MAX_ALTITUDE};

/// Depth difference between two deco stops (m).
pub const STOP_DISTANCE: f64 = 3.0;

/// Depth from which the shallowest ascent speed applies (m).
pub const SHALLOW_ASCENT_DEPTH: f64 = 6.0;

/// Dives deeper than this get a safety stop in `SafetyStop::Auto` mode (m).
pub const AUTO_SAFETY_STOP_DEPTH: f64 = 10.0;

/// Duration of the safety stop (min).
pub const SAFETY_STOP_DURATION: f64 = 3.0;

/// When to add a safety stop at the last stop depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, uniffi::Enum)]
pub enum SafetyStop {
    Never,
    #[default]
    Auto,
    Always,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(default)]
pub struct DecompressionOptions {
    /// Gradient factor applied at the first stop (0.0-1.0)
    pub gf_low: f64,
    /// Gradient factor applied at the surface (0.0-1.0)
    pub gf_high: f64,
    /// Maximum ppO2 for bottom gases (bar)
    pub max_ppo2: f64,
    /// Maximum ppO2 for deco gases (bar)
    pub max_deco_ppo2: f64,
    /// Maximum equivalent narcotic depth (m)
    pub max_end: f64,
    /// Shallowest stop; stops above it are merged into it (m)
    pub last_stop_depth: f64,
    /// Descent speed (m/min)
    pub descent_speed: f64,
    /// Ascent speed deeper than 50% of the maximum depth (m/min)
    pub ascent_speed_50perc: f64,
    /// Ascent speed from 50% of the maximum depth up to 6 m (m/min)
    pub ascent_speed_50perc_to_6m: f64,
    /// Ascent speed from 6 m to the surface (m/min)
    pub ascent_speed_6m: f64,
    /// Time spent at the switch depth changing gas (min)
    pub gas_switch_duration: f64,
    /// Time spent at the bottom depth before the ascent starts (min)
    pub problem_solving_duration: f64,
    pub safety_stop: SafetyStop,
    /// Altitude of the dive site above sea level (m)
    pub altitude: f64,
    pub water: WaterType,
}

impl Default for DecompressionOptions {
    fn default() -> Self {
        DecompressionOptions {
            gf_low: 0.4,
            gf_high: 0.85,
            max_ppo2: 1.4,
            max_deco_ppo2: 1.6,
            max_end: 30.0,
            last_stop_depth: 3.0,
            descent_speed: 18.0,
            ascent_speed_50perc: 9.0,
            ascent_speed_50perc_to_6m: 6.0,
            ascent_speed_6m: 3.0,
            gas_switch_duration: 1.0,
            problem_solving_duration: 1.0,
            safety_stop: SafetyStop::Auto,
            altitude: 0.0,
            water: WaterType::Salt,
        }
    }
}

impl DecompressionOptions {
    /// Reject values outside their physical ranges.
    pub fn validate(&self) -> Result<(), DecoError> {
        let fields = [
            ("gf_low", self.gf_low),
            ("gf_high", self.gf_high),
            ("max_ppo2", self.max_ppo2),
            ("max_deco_ppo2", self.max_deco_ppo2),
            ("max_end", self.max_end),
            ("last_stop_depth", self.last_stop_depth),
            ("descent_speed", self.descent_speed),
            ("ascent_speed_50perc", self.ascent_speed_50perc),
            ("ascent_speed_50perc_to_6m", self.ascent_speed_50perc_to_6m),
            ("ascent_speed_6m", self.ascent_speed_6m),
            ("gas_switch_duration", self.gas_switch_duration),
            ("problem_solving_duration", self.problem_solving_duration),
            ("altitude", self.altitude),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(DecoError::invalid(format!("{name} must be finite")));
            }
        }

        if self.gf_low <= 0.0 || self.gf_low > 1.0 {
            return Err(DecoError::invalid("gf_low must be in (0, 1]"));
        }
        if self.gf_high <= 0.0 || self.gf_high > 1.0 {
            return Err(DecoError::invalid("gf_high must be in (0, 1]"));
        }
        if self.gf_low > self.gf_high {
            return Err(DecoError::invalid("gf_low must not exceed gf_high"));
        }
        if self.max_ppo2 <= 0.0 || self.max_deco_ppo2 <= 0.0 {
            return Err(DecoError::invalid("ppO2 limits must be positive"));
        }
        if self.max_end <= 0.0 {
            return Err(DecoError::invalid("max_end must be positive"));
        }
        let stops = self.last_stop_depth / STOP_DISTANCE;
        if self.last_stop_depth <= 0.0 || (stops - stops.round()).abs() > 1e-9 {
            return Err(DecoError::invalid(format!(
                "last_stop_depth must be a positive multiple of {STOP_DISTANCE} m"
            )));
        }
        if self.descent_speed <= 0.0
            || self.ascent_speed_50perc <= 0.0
            || self.ascent_speed_50perc_to_6m <= 0.0
            || self.ascent_speed_6m <= 0.0
        {
            return Err(DecoError::invalid("speeds must be positive"));
        }
        if self.gas_switch_duration < 0.0 || self.problem_solving_duration < 0.0 {
            return Err(DecoError::invalid("durations must not be negative"));
        }
        if !(0.0..=MAX_ALTITUDE).contains(&self.altitude) {
            return Err(DecoError::invalid(format!(
                "altitude must be in 0..={MAX_ALTITUDE} m"
            )));
        }
        Ok(())
    }

    pub fn depth_converter(&self) -> DepthConverter {
        DepthConverter::new(self.water, self.altitude)
    }

    /// Maximum narcotic pressure derived from `max_end` (bar).
    pub fn max_end_pressure(&self, converter: &DepthConverter) -> f64 {
        converter.to_bar(self.max_end)
    }

    /// Ascent speed (m/min) to use when leaving `depth` on a dive to `max_depth`.
    pub fn ascent_speed(&self, depth: f64, max_depth: f64) -> f64 {
        if depth > max_depth / 2.0 {
            self.ascent_speed_50perc
        } else if depth > SHALLOW_ASCENT_DEPTH {
            self.ascent_speed_50perc_to_6m
        } else {
            self.ascent_speed_6m
        }
    }

    /// Whether a safety stop applies to a dive reaching `max_depth`.
    pub fn needs_safety_stop(&self, max_depth: f64) -> bool {
        match self.safety_stop {
            SafetyStop::Never => false,
            SafetyStop::Auto => max_depth > AUTO_SAFETY_STOP_DEPTH,
            SafetyStop::Always => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(DecompressionOptions::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_gradient_factors() {
        let options = DecompressionOptions {
            gf_low: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(DecoError::InvalidInput { .. })
        ));

        let options = DecompressionOptions {
            gf_low: 0.9,
            gf_high: 0.8,
            ..Default::default()
        };
        assert!(options.validate().is_err());

        let options = DecompressionOptions {
            gf_high: 1.2,
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_invalid_last_stop() {
        let options = DecompressionOptions {
            last_stop_depth: 5.0,
            ..Default::default()
        };
        assert!(options.validate().is_err());

        let options = DecompressionOptions {
            last_stop_depth: 6.0,
            ..Default::default()
        };
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_invalid_speed_and_altitude() {
        let options = DecompressionOptions {
            ascent_speed_6m: 0.0,
            ..Default::default()
        };
        assert!(options.validate().is_err());

        let options = DecompressionOptions {
            altitude: -10.0,
            ..Default::default()
        };
        assert!(options.validate().is_err());

        let options = DecompressionOptions {
            descent_speed: f64::NAN,
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_ascent_speed_tiers() {
        let options = DecompressionOptions::default();
        assert_eq!(options.ascent_speed(40.0, 40.0), 9.0);
        assert_eq!(options.ascent_speed(21.0, 40.0), 9.0);
        assert_eq!(options.ascent_speed(15.0, 40.0), 6.0);
        assert_eq!(options.ascent_speed(6.0, 40.0), 3.0);
        assert_eq!(options.ascent_speed(3.0, 40.0), 3.0);
    }

    #[test]
    fn test_safety_stop_policy() {
        let mut options = DecompressionOptions::default();
        assert!(options.needs_safety_stop(18.0));
        assert!(!options.needs_safety_stop(10.0));

        options.safety_stop = SafetyStop::Never;
        assert!(!options.needs_safety_stop(40.0));

        options.safety_stop = SafetyStop::Always;
        assert!(options.needs_safety_stop(5.0));
    }

    #[test]
    fn test_missing_fields_deserialize_to_defaults() {
        let options: DecompressionOptions =
            serde_json::from_str(r#"{"gf_low": 0.3, "water": "Fresh"}"#).unwrap();
        assert_eq!(options.gf_low, 0.3);
        assert_eq!(options.gf_high, 0.85);
        assert_eq!(options.water, WaterType::Fresh);
        assert_eq!(options.last_stop_depth, 3.0);
    }
}
