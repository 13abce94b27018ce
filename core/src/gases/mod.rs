//! Breathing gases: mixtures, names, the per-dive registry and its validation.

pub mod mix;
pub mod names;
pub mod registry;
pub mod validator;

pub use mix::{partial_pressure, Gas, AIR_FN2, AIR_FO2, MIN_PPO2};
pub use names::{by_name, name_for};
pub use registry::{best_nitrox_mix, BestGasOptions, Gases};
pub use validator::validate;
