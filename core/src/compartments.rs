//! Bühlmann ZHL-16C compartment constants.
//!
//! A compartment is the static, physiological half of a tissue: half-times and
//! M-value coefficients for nitrogen and helium. Compartments are never mutated;
//! the per-dive pressures live in [`crate::tissues::Tissue`].

use serde::{Deserialize, Serialize};

use crate::error::DecoError;

/// Number of tissue compartments.
pub const NUM_COMPARTMENTS: usize = 16;

/// N2 half-times in minutes for compartments 1–16 (ZHL-16C).
const N2_HALF_TIMES: [f64; NUM_COMPARTMENTS] = [
    5.0, 8.0, 12.5, 18.5, 27.0, 38.3, 54.3, 77.0, 109.0, 146.0, 187.0, 239.0, 305.0, 390.0, 498.0,
    635.0,
];

/// He half-times in minutes for compartments 1–16 (ZHL-16C).
const HE_HALF_TIMES: [f64; NUM_COMPARTMENTS] = [
    1.88, 3.02, 4.72, 6.99, 10.21, 14.48, 20.53, 29.11, 41.20, 55.19, 70.69, 90.34, 115.29, 147.42,
    188.24, 240.03,
];

/// N2 'a' coefficients (bar) for ZHL-16C.
const A_N2: [f64; NUM_COMPARTMENTS] = [
    1.1696, 1.0000, 0.8618, 0.7562, 0.6200, 0.5043, 0.4410, 0.4000, 0.3750, 0.3500, 0.3295, 0.3065,
    0.2835, 0.2610, 0.2480, 0.2327,
];

/// N2 'b' coefficients (dimensionless) for ZHL-16C.
const B_N2: [f64; NUM_COMPARTMENTS] = [
    0.5578, 0.6514, 0.7222, 0.7825, 0.8126, 0.8434, 0.8693, 0.8910, 0.9092, 0.9222, 0.9319, 0.9403,
    0.9477, 0.9544, 0.9602, 0.9653,
];

/// He 'a' coefficients (bar) for ZHL-16C.
const A_HE: [f64; NUM_COMPARTMENTS] = [
    1.6189, 1.3830, 1.1919, 1.0458, 0.9220, 0.8205, 0.7305, 0.6502, 0.5950, 0.5545, 0.5333, 0.5189,
    0.5181, 0.5176, 0.5172, 0.5119,
];

/// He 'b' coefficients (dimensionless) for ZHL-16C.
const B_HE: [f64; NUM_COMPARTMENTS] = [
    0.4770, 0.5747, 0.6527, 0.7223, 0.7582, 0.7957, 0.8279, 0.8553, 0.8757, 0.8903, 0.8997, 0.9073,
    0.9122, 0.9171, 0.9217, 0.9267,
];

/// Half-times (min) and M-value coefficients of one compartment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct Compartment {
    pub n2_half_time: f64,
    pub n2_a: f64,
    pub n2_b: f64,
    pub he_half_time: f64,
    pub he_a: f64,
    pub he_b: f64,
}

impl Compartment {
    /// Reject constants the Schreiner equation or the ceiling cannot work with.
    pub fn validate(&self) -> Result<(), DecoError> {
        let values = [
            self.n2_half_time,
            self.n2_a,
            self.n2_b,
            self.he_half_time,
            self.he_a,
            self.he_b,
        ];
        if values.iter().any(|value| !value.is_finite()) {
            return Err(DecoError::divergence("compartment constants must be finite"));
        }
        if self.n2_half_time <= 0.0 || self.he_half_time <= 0.0 {
            return Err(DecoError::divergence("half time must be positive"));
        }
        if self.n2_b <= 0.0 || self.he_b <= 0.0 {
            return Err(DecoError::divergence("b coefficient must be positive"));
        }
        Ok(())
    }
}

/// The sixteen ZHL-16C compartments, fastest first.
pub fn buhlmann_zhl16c() -> [Compartment; NUM_COMPARTMENTS] {
    std::array::from_fn(|i| Compartment {
        n2_half_time: N2_HALF_TIMES[i],
        n2_a: A_N2[i],
        n2_b: B_N2[i],
        he_half_time: HE_HALF_TIMES[i],
        he_a: A_HE[i],
        he_b: B_HE[i],
    })
}
