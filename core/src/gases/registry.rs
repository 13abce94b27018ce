//! Registry of gases available on a dive and deco gas selection.

use serde::{Deserialize, Serialize};

use super::mix::{Gas, AIR_FO2};
use crate::error::DecoError;
use crate::pressure::DepthConverter;

/// Slack for pressure comparisons, so a gas is usable exactly at its MOD.
const PRESSURE_TOLERANCE: f64 = 1e-9;

/// Limits applied when choosing a gas during the ascent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct BestGasOptions {
    /// Maximum ppO2 for deco gases (bar)
    pub max_deco_ppo2: f64,
    /// Maximum narcotic pressure (bar)
    pub max_end_pressure: f64,
}

/// Bottom and deco gases registered for one dive.
///
/// A composition is registered at most once, in the role it was first added
/// with. Insertion order within a role is kept and decides ties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct Gases {
    pub bottom: Vec<Gas>,
    pub deco: Vec<Gas>,
}

impl Gases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bottom gas; returns false if the composition was already known.
    pub fn add_bottom_gas(&mut self, gas: Gas) -> bool {
        if self.is_registered(&gas) {
            return false;
        }
        self.bottom.push(gas);
        true
    }

    /// Register a deco gas; returns false if the composition was already known.
    pub fn add_deco_gas(&mut self, gas: Gas) -> bool {
        if self.is_registered(&gas) {
            return false;
        }
        self.deco.push(gas);
        true
    }

    pub fn is_registered(&self, gas: &Gas) -> bool {
        self.all().any(|registered| registered.composition_equals(Some(gas)))
    }

    pub fn is_empty(&self) -> bool {
        self.bottom.is_empty() && self.deco.is_empty()
    }

    /// Bottom gases followed by deco gases.
    pub fn all(&self) -> impl Iterator<Item = &Gas> {
        self.bottom.iter().chain(self.deco.iter())
    }

    /// Best gas to breathe at `pressure` bar during the ascent.
    ///
    /// The richest deco gas within the ppO2, narcotic and hypoxic limits wins;
    /// the first registered one wins ties. Without a usable deco gas the same
    /// selection runs over the bottom gases.
    pub fn best_gas_at_pressure(&self, pressure: f64, options: &BestGasOptions) -> Option<Gas> {
        best_of(&self.deco, pressure, options).or_else(|| best_of(&self.bottom, pressure, options))
    }

    /// Best gas at `depth` metres; fails when no registered gas is usable there.
    pub fn best_deco_gas(
        &self,
        depth: f64,
        converter: &DepthConverter,
        options: &BestGasOptions,
    ) -> Result<Gas, DecoError> {
        let pressure = converter.to_bar(depth);
        self.best_gas_at_pressure(pressure, options)
            .ok_or(DecoError::NoUsableGas { depth })
    }
}

fn best_of(gases: &[Gas], pressure: f64, options: &BestGasOptions) -> Option<Gas> {
    let mut found: Option<Gas> = None;
    for gas in gases {
        if !is_usable(gas, pressure, options) {
            continue;
        }
        match found {
            Some(best) if best.fo2 >= gas.fo2 => {}
            _ => found = Some(*gas),
        }
    }
    found
}

fn is_usable(gas: &Gas, pressure: f64, options: &BestGasOptions) -> bool {
    gas.mod_bars(options.max_deco_ppo2) + PRESSURE_TOLERANCE >= pressure
        && gas.narcotic_pressure(pressure) <= options.max_end_pressure + PRESSURE_TOLERANCE
        && gas.ceiling_bars() <= pressure + PRESSURE_TOLERANCE
}

/// Richest nitrox (O2 percent) usable at `depth` under `max_ppo2`, 21-100.
pub fn best_nitrox_mix(depth: f64, max_ppo2: f64, converter: &DepthConverter) -> u32 {
    let fo2 = max_ppo2 / converter.to_bar(depth);
    let percent = (fo2 * 100.0).floor();
    percent.clamp(AIR_FO2 * 100.0, 100.0) as u32
}
