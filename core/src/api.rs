//! Functions exported to foreign languages.
//!
//! Thin wrappers taking owned records, so hosts never hold Rust state between
//! calls.

use crate::algorithm::no_deco_limit;
use crate::error::DecoError;
use crate::gases::{best_nitrox_mix, by_name, name_for, validate, Gas, Gases};
use crate::issues::Issue;
use crate::ndl::{ndl_limits, NdlLimit};
use crate::options::DecompressionOptions;
use crate::profile::{calculate, CalculatedProfile, PlanRequest};
use crate::segments::Segment;
use crate::tissues::Tissues;
use crate::waypoints::{calculate_waypoints, Waypoint};

#[uniffi::export]
pub fn default_options() -> DecompressionOptions {
    DecompressionOptions::default()
}

#[uniffi::export]
pub fn calculate_profile(request: PlanRequest) -> Result<CalculatedProfile, DecoError> {
    calculate(&request)
}

/// NDL (min) at the end of `segments` for a first dive of the day.
#[uniffi::export]
pub fn no_decompression_limit(
    segments: Vec<Segment>,
    options: DecompressionOptions,
) -> Result<u32, DecoError> {
    let tissues = Tissues::new(options.depth_converter().surface_pressure());
    no_deco_limit(&segments, &options, &tissues)
}

#[uniffi::export]
pub fn ndl_table(gas: Gas, options: DecompressionOptions) -> Result<Vec<NdlLimit>, DecoError> {
    ndl_limits(gas, &options)
}

#[uniffi::export]
pub fn validate_gases(gases: Gases, options: DecompressionOptions, max_depth: f64) -> Vec<Issue> {
    let converter = options.depth_converter();
    validate(&gases, &options, &converter, converter.to_bar(max_depth))
}

#[uniffi::export]
pub fn profile_waypoints(segments: Vec<Segment>) -> Vec<Waypoint> {
    calculate_waypoints(&segments)
}

#[uniffi::export]
pub fn gas_by_name(name: String) -> Result<Gas, DecoError> {
    by_name(&name)
}

#[uniffi::export]
pub fn gas_name(gas: Gas) -> String {
    name_for(&gas)
}

/// Maximum operating depth (m) at `ppo2`.
#[uniffi::export]
pub fn gas_mod(gas: Gas, ppo2: f64, options: DecompressionOptions) -> Result<f64, DecoError> {
    gas.validate()?;
    Ok(gas.mod_depth(ppo2, &options.depth_converter()))
}

/// Equivalent narcotic depth (m) at `depth`.
#[uniffi::export]
pub fn gas_end(gas: Gas, depth: f64, options: DecompressionOptions) -> Result<f64, DecoError> {
    gas.validate()?;
    Ok(gas.end(depth, &options.depth_converter()))
}

/// Shallowest depth (m) where the gas is not hypoxic.
#[uniffi::export]
pub fn gas_ceiling(gas: Gas, options: DecompressionOptions) -> Result<f64, DecoError> {
    gas.validate()?;
    Ok(gas.ceiling(&options.depth_converter()))
}

#[uniffi::export]
pub fn best_nitrox(depth: f64, options: DecompressionOptions) -> u32 {
    best_nitrox_mix(depth, options.max_ppo2, &options.depth_converter())
}

#[uniffi::export]
pub fn calculate_sac(
    depth: f64,
    tank: f64,
    used: f64,
    duration: f64,
    options: DecompressionOptions,
) -> Result<f64, DecoError> {
    crate::sac::calculate_sac(depth, tank, used, duration, &options.depth_converter())
}

#[uniffi::export]
pub fn calculate_duration(
    depth: f64,
    tank: f64,
    used: f64,
    sac: f64,
    options: DecompressionOptions,
) -> Result<f64, DecoError> {
    crate::sac::calculate_duration(depth, tank, used, sac, &options.depth_converter())
}

#[uniffi::export]
pub fn calculate_used(
    depth: f64,
    tank: f64,
    duration: f64,
    sac: f64,
    options: DecompressionOptions,
) -> Result<f64, DecoError> {
    crate::sac::calculate_used(depth, tank, duration, sac, &options.depth_converter())
}
