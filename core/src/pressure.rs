//! Pressure and depth conversion.
//!
//! Depth is converted to absolute pressure with a linear hydrostatic model for
//! the chosen water density, offset by the surface pressure at the configured
//! altitude. All pressures are in bar, depths in metres.

use serde::{Deserialize, Serialize};

// ============================================================================
// Physical Constants
// ============================================================================

/// Standard atmospheric pressure at sea level (bar).
pub const STANDARD_PRESSURE: f64 = 1.01325;

/// Standard gravity (m/s²).
const GRAVITY: f64 = 9.80665;

/// Density of fresh water (kg/m³).
const FRESH_WATER_DENSITY: f64 = 1000.0;

/// Density of salt water (kg/m³), EN13319.
const SALT_WATER_DENSITY: f64 = 1030.0;

/// Pascal per bar.
const PASCAL_PER_BAR: f64 = 100_000.0;

// International standard atmosphere, troposphere layer.
const SEA_LEVEL_TEMPERATURE: f64 = 288.15;
const TEMPERATURE_LAPSE_RATE: f64 = 0.0065;
const MOLAR_MASS_AIR: f64 = 0.028_964_4;
const GAS_CONSTANT: f64 = 8.314_47;

// Antoine equation coefficients for water in mmHg, valid 1-100 °C.
const ANTOINE_A: f64 = 8.07131;
const ANTOINE_B: f64 = 1730.63;
const ANTOINE_C: f64 = 233.426;
const BAR_PER_MMHG: f64 = 0.001_333_22;

/// Highest altitude the barometric model is used for (m).
pub const MAX_ALTITUDE: f64 = 5000.0;

/// Barometric surface pressure (bar) at the given altitude above sea level.
pub fn altitude_pressure(altitude_m: f64) -> f64 {
    let altitude = altitude_m.clamp(0.0, MAX_ALTITUDE);
    let base = 1.0 - TEMPERATURE_LAPSE_RATE * altitude / SEA_LEVEL_TEMPERATURE;
    let exponent = GRAVITY * MOLAR_MASS_AIR / (GAS_CONSTANT * TEMPERATURE_LAPSE_RATE);
    STANDARD_PRESSURE * base.powf(exponent)
}

/// Saturated water vapour pressure (bar) at the given temperature.
pub fn water_vapour_pressure(celsius: f64) -> f64 {
    let mm_hg = 10.0_f64.powf(ANTOINE_A - ANTOINE_B / (ANTOINE_C + celsius));
    mm_hg * BAR_PER_MMHG
}

/// Water the dive takes place in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, uniffi::Enum)]
pub enum WaterType {
    Fresh,
    #[default]
    Salt,
}

impl WaterType {
    /// Density in kg/m³.
    pub fn density(&self) -> f64 {
        match self {
            WaterType::Fresh => FRESH_WATER_DENSITY,
            WaterType::Salt => SALT_WATER_DENSITY,
        }
    }
}

/// Linear depth/pressure mapping for one water type and altitude.
///
/// Immutable once constructed; the surface pressure is computed once from the
/// barometric model and kept for the lifetime of the converter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthConverter {
    water: WaterType,
    surface_pressure: f64,
    bar_per_meter: f64,
}

impl DepthConverter {
    pub fn new(water: WaterType, altitude_m: f64) -> Self {
        Self::with_surface_pressure(water, altitude_pressure(altitude_m))
    }

    pub fn with_surface_pressure(water: WaterType, surface_pressure: f64) -> Self {
        DepthConverter {
            water,
            surface_pressure,
            bar_per_meter: water.density() * GRAVITY / PASCAL_PER_BAR,
        }
    }

    pub fn for_salt_water() -> Self {
        Self::new(WaterType::Salt, 0.0)
    }

    pub fn for_fresh_water() -> Self {
        Self::new(WaterType::Fresh, 0.0)
    }

    pub fn water(&self) -> WaterType {
        self.water
    }

    /// Absolute pressure at the water surface (bar).
    pub fn surface_pressure(&self) -> f64 {
        self.surface_pressure
    }

    /// Hydrostatic pressure change per metre (bar/m).
    pub fn bar_per_meter(&self) -> f64 {
        self.bar_per_meter
    }

    /// Absolute pressure (bar) at `depth` metres.
    pub fn to_bar(&self, depth: f64) -> f64 {
        self.surface_pressure + depth * self.bar_per_meter
    }

    /// Depth (m) at which the absolute pressure equals `bars`.
    pub fn from_bar(&self, bars: f64) -> f64 {
        (bars - self.surface_pressure) / self.bar_per_meter
    }
}

impl Default for DepthConverter {
    fn default() -> Self {
        Self::for_salt_water()
    }
}
