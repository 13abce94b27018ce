//! Breathing gas mixture and its physical limits.

use serde::{Deserialize, Serialize};

use crate::error::DecoError;
use crate::pressure::{DepthConverter, STANDARD_PRESSURE};

/// Fraction of O2 in air.
pub const AIR_FO2: f64 = 0.21;

/// Fraction of N2 in air, used for tissue saturation at the surface.
pub const AIR_FN2: f64 = 0.79;

/// Minimum breathable ppO2: 0.18 ATA expressed in bar.
pub const MIN_PPO2: f64 = 0.18 * STANDARD_PRESSURE;

/// Two fractions closer than this are the same composition.
const COMPOSITION_TOLERANCE: f64 = 1e-6;

/// Partial pressure (bar) of a gas fraction at an absolute pressure.
pub fn partial_pressure(absolute_pressure: f64, fraction: f64) -> f64 {
    absolute_pressure * fraction
}

/// Breathing gas defined by its oxygen and helium fractions.
///
/// Value type: editing a gas means building a new one. Equality is by
/// composition only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct Gas {
    /// Fraction of O2 (0.0-1.0)
    pub fo2: f64,
    /// Fraction of He (0.0-1.0)
    pub fhe: f64,
}

impl Gas {
    pub const fn new(fo2: f64, fhe: f64) -> Self {
        Gas { fo2, fhe }
    }

    pub const fn air() -> Self {
        Gas::new(AIR_FO2, 0.0)
    }

    pub const fn oxygen() -> Self {
        Gas::new(1.0, 0.0)
    }

    /// Build a gas, rejecting fractions that cannot describe a mixture.
    pub fn try_new(fo2: f64, fhe: f64) -> Result<Self, DecoError> {
        let gas = Gas::new(fo2, fhe);
        gas.validate()?;
        Ok(gas)
    }

    pub fn validate(&self) -> Result<(), DecoError> {
        if !self.fo2.is_finite() || !self.fhe.is_finite() {
            return Err(DecoError::invalid("gas fractions must be finite"));
        }
        if self.fo2 <= 0.0 || self.fo2 > 1.0 {
            return Err(DecoError::invalid("oxygen fraction must be in (0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.fhe) {
            return Err(DecoError::invalid("helium fraction must be in [0, 1]"));
        }
        if self.fo2 + self.fhe > 1.0 + COMPOSITION_TOLERANCE {
            return Err(DecoError::invalid("gas fractions (O2 + He) exceed 1.0"));
        }
        Ok(())
    }

    /// Fraction of N2, the rest of the mixture.
    pub fn fn2(&self) -> f64 {
        (1.0 - self.fo2 - self.fhe).max(0.0)
    }

    /// Maximum ambient pressure (bar) keeping ppO2 at or below `ppo2`.
    pub fn mod_bars(&self, ppo2: f64) -> f64 {
        ppo2 / self.fo2
    }

    /// Maximum operating depth (m) for `ppo2`, unrounded.
    pub fn mod_depth(&self, ppo2: f64, converter: &DepthConverter) -> f64 {
        converter.from_bar(self.mod_bars(ppo2))
    }

    /// Ambient pressure (bar) below which the gas becomes hypoxic.
    pub fn ceiling_bars(&self) -> f64 {
        MIN_PPO2 / self.fo2
    }

    /// Shallowest depth (m) at which the gas is breathable; 0 if it is
    /// breathable at the surface.
    pub fn ceiling(&self, converter: &DepthConverter) -> f64 {
        let bars = self.ceiling_bars();
        if bars <= converter.surface_pressure() {
            return 0.0;
        }
        converter.from_bar(bars)
    }

    /// Pressure of the narcotic part of the mixture; O2 and N2 count, He doesn't.
    pub fn narcotic_pressure(&self, absolute_pressure: f64) -> f64 {
        partial_pressure(absolute_pressure, 1.0 - self.fhe)
    }

    /// Equivalent narcotic depth (m) when breathing this gas at `depth`.
    pub fn end(&self, depth: f64, converter: &DepthConverter) -> f64 {
        let narcotic = self.narcotic_pressure(converter.to_bar(depth));
        converter.from_bar(narcotic).max(0.0)
    }

    pub fn ppo2_at(&self, depth: f64, converter: &DepthConverter) -> f64 {
        partial_pressure(converter.to_bar(depth), self.fo2)
    }

    /// Same O2 and He fractions within tolerance; `None` never matches.
    pub fn composition_equals(&self, other: Option<&Gas>) -> bool {
        match other {
            Some(other) => {
                (self.fo2 - other.fo2).abs() < COMPOSITION_TOLERANCE
                    && (self.fhe - other.fhe).abs() < COMPOSITION_TOLERANCE
            }
            None => false,
        }
    }
}

impl Default for Gas {
    fn default() -> Self {
        Gas::air()
    }
}
