pub mod algorithm;
pub mod api;
pub mod compartments;
pub mod error;
pub mod gases;
pub mod issues;
pub mod ndl;
pub mod options;
pub mod pressure;
pub mod profile;
pub mod sac;
pub mod segments;
pub mod tissues;
pub mod waypoints;

uniffi::setup_scaffolding!();

pub use algorithm::{
    no_deco_limit, plan_decompression, Ceiling, DecoPlan, DecoStop, GradientFactors, NDL_UNLIMITED,
};
pub use compartments::{buhlmann_zhl16c, Compartment, NUM_COMPARTMENTS};
pub use error::DecoError;
pub use gases::{best_nitrox_mix, by_name, name_for, BestGasOptions, Gas, Gases};
pub use issues::Issue;
pub use ndl::{ndl_limits, NdlLimit};
pub use options::{DecompressionOptions, SafetyStop};
pub use pressure::{DepthConverter, WaterType};
pub use profile::{calculate, CalculatedProfile, PlanRequest};
pub use segments::{Direction, Segment, Segments};
pub use tissues::{Tissue, TissueSnapshot, Tissues};
pub use waypoints::{calculate_waypoints, Waypoint};
