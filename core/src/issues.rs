//! Problems found in a plan that the caller can fix by re-planning.

use serde::{Deserialize, Serialize};

use crate::error::DecoError;

/// Depths are in metres, speeds in m/min, segment indexes are zero based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Enum)]
pub enum Issue {
    /// No gas is registered at all.
    NoGasDefined,
    /// No bottom gas can be breathed at the deepest point of the dive.
    NoBottomGasForDepth { max_depth: f64 },
    /// No gas can be breathed at the surface.
    NoGasToSurface,
    /// No gas can be breathed between these two depths.
    GasCoverageGap { from_depth: f64, to_depth: f64 },
    /// The ascent found no usable gas at this depth.
    NoUsableGas { depth: f64 },
    /// The stop at this depth never cleared.
    UnreachableAscent { depth: f64 },
    HighAscentSpeed { segment: u32, speed: f64 },
    HighDescentSpeed { segment: u32, speed: f64 },
    /// The segment's gas exceeds the maximum ppO2 (bar) at its deepest point.
    HighPpO2 { segment: u32, ppo2: f64 },
}

impl Issue {
    /// Planning failures become issues; other errors stay errors.
    pub fn from_planning_failure(error: &DecoError) -> Option<Issue> {
        match error {
            DecoError::NoUsableGas { depth } => Some(Issue::NoUsableGas { depth: *depth }),
            DecoError::UnreachableAscent { depth } => {
                Some(Issue::UnreachableAscent { depth: *depth })
            }
            _ => None,
        }
    }

    /// Whether the issue prevents computing a decompression schedule.
    pub fn is_blocking(&self) -> bool {
        !matches!(
            self,
            Issue::HighAscentSpeed { .. }
                | Issue::HighDescentSpeed { .. }
                | Issue::HighPpO2 { .. }
        )
    }
}
