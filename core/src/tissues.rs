//! Bühlmann ZHL-16C tissue loading.
//!
//! Each tissue tracks nitrogen and helium partial pressures and loads them with
//! the Schreiner equation for a constant rate of depth change. The inspired
//! inert gas pressure is the ambient pressure at the start of the leg times the
//! gas fraction; water vapour only lowers the initial surface loading. A
//! tissue's ceiling uses the Bühlmann M-value line reduced by a gradient factor.

use serde::{Deserialize, Serialize};

use crate::compartments::{buhlmann_zhl16c, Compartment, NUM_COMPARTMENTS};
use crate::error::DecoError;
use crate::gases::{partial_pressure, Gas, AIR_FN2};
use crate::options::STOP_DISTANCE;
use crate::pressure::{water_vapour_pressure, DepthConverter};
use crate::segments::Segment;

/// Body temperature assumed for lung water vapour (°C).
const BODY_TEMPERATURE: f64 = 35.2;

/// Round a depth up to the next multiple of the stop distance; never down.
pub fn round_up_to_stop(depth: f64) -> f64 {
    if depth <= 0.0 {
        return 0.0;
    }
    let stops = (depth / STOP_DISTANCE - 1e-9).ceil();
    stops.max(0.0) * STOP_DISTANCE
}

/// Schreiner equation: inert gas pressure at the end of a constant-rate leg.
///
/// `p_gas` is the inspired inert gas pressure at the start of the leg, `rate`
/// its change in bar/min.
fn schreiner_equation(p_begin: f64, p_gas: f64, time: f64, half_time: f64, rate: f64) -> f64 {
    let k = std::f64::consts::LN_2 / half_time;
    p_gas + rate * (time - 1.0 / k) - (p_gas - p_begin - rate / k) * (-k * time).exp()
}

/// Read-only pressures of one tissue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct TissueSnapshot {
    pub p_n2: f64,
    pub p_he: f64,
    pub p_total: f64,
}

/// One compartment's constants plus its current inert gas pressures (bar).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tissue {
    compartment: Compartment,
    p_n2: f64,
    p_he: f64,
    p_total: f64,
}

impl Tissue {
    /// Tissue loaded with the nitrogen of air at `surface_pressure`, less the
    /// lung water vapour.
    pub fn new(compartment: Compartment, surface_pressure: f64) -> Self {
        let vapour_pressure = water_vapour_pressure(BODY_TEMPERATURE);
        let p_n2 = partial_pressure(surface_pressure, AIR_FN2) - vapour_pressure;
        Tissue {
            compartment,
            p_n2,
            p_he: 0.0,
            p_total: p_n2,
        }
    }

    pub fn compartment(&self) -> &Compartment {
        &self.compartment
    }

    pub fn p_n2(&self) -> f64 {
        self.p_n2
    }

    pub fn p_he(&self) -> f64 {
        self.p_he
    }

    pub fn p_total(&self) -> f64 {
        self.p_total
    }

    pub fn snapshot(&self) -> TissueSnapshot {
        TissueSnapshot {
            p_n2: self.p_n2,
            p_he: self.p_he,
            p_total: self.p_total,
        }
    }

    /// Load the tissue over `segment` breathing `gas`; returns the change of
    /// the total pressure.
    pub fn load(&mut self, segment: &Segment, gas: &Gas, converter: &DepthConverter) -> f64 {
        if segment.duration <= 0.0 {
            return 0.0;
        }

        let previous = self.p_total;
        let n2_half_time = self.compartment.n2_half_time;
        let he_half_time = self.compartment.he_half_time;
        self.p_n2 = self.load_gas(segment, gas.fn2(), self.p_n2, n2_half_time, converter);
        self.p_he = self.load_gas(segment, gas.fhe, self.p_he, he_half_time, converter);
        self.p_total = self.p_n2 + self.p_he;
        self.p_total - previous
    }

    fn load_gas(
        &self,
        segment: &Segment,
        fraction: f64,
        p_begin: f64,
        half_time: f64,
        converter: &DepthConverter,
    ) -> f64 {
        let p_gas = partial_pressure(converter.to_bar(segment.start_depth), fraction);
        let rate = segment.speed() * converter.bar_per_meter() * fraction;
        schreiner_equation(p_begin, p_gas, segment.duration, half_time, rate)
    }

    /// Ceiling depth (m) under gradient factor `gf`, rounded up to the stop
    /// distance. A non-positive `gf` means no reduction.
    pub fn ceiling(&self, gf: f64, converter: &DepthConverter) -> f64 {
        let gf = if gf > 0.0 { gf } else { 1.0 };
        let c = &self.compartment;

        let (a, b) = if self.p_total > 1e-10 {
            let a = (c.n2_a * self.p_n2 + c.he_a * self.p_he) / self.p_total;
            let b = (c.n2_b * self.p_n2 + c.he_b * self.p_he) / self.p_total;
            (a, b)
        } else {
            (c.n2_a, c.n2_b)
        };

        let bars = (self.p_total - a * gf) / (gf / b + 1.0 - gf);
        if bars < converter.surface_pressure() {
            return 0.0;
        }
        round_up_to_stop(converter.from_bar(bars))
    }
}

/// All sixteen tissues of one dive calculation, in half-time order.
#[derive(Debug, Clone, PartialEq)]
pub struct Tissues {
    compartments: [Tissue; NUM_COMPARTMENTS],
}

impl Tissues {
    /// ZHL-16C tissues saturated at `surface_pressure`.
    pub fn new(surface_pressure: f64) -> Self {
        let table = buhlmann_zhl16c();
        Tissues {
            compartments: std::array::from_fn(|i| Tissue::new(table[i], surface_pressure)),
        }
    }

    /// Tissues from a custom compartment table of exactly sixteen entries.
    pub fn with_compartments(
        table: &[Compartment],
        surface_pressure: f64,
    ) -> Result<Self, DecoError> {
        if table.len() != NUM_COMPARTMENTS {
            return Err(DecoError::invalid(format!(
                "expected {NUM_COMPARTMENTS} compartments, got {}",
                table.len()
            )));
        }
        for compartment in table {
            compartment.validate()?;
        }
        Ok(Tissues {
            compartments: std::array::from_fn(|i| Tissue::new(table[i], surface_pressure)),
        })
    }

    /// ZHL-16C tissues restored from a snapshot of a previous dive.
    pub fn from_snapshot(
        snapshot: &[TissueSnapshot],
        surface_pressure: f64,
    ) -> Result<Self, DecoError> {
        if snapshot.len() != NUM_COMPARTMENTS {
            return Err(DecoError::invalid(format!(
                "expected {NUM_COMPARTMENTS} tissue pressures, got {}",
                snapshot.len()
            )));
        }
        let mut tissues = Self::new(surface_pressure);
        for (tissue, saved) in tissues.compartments.iter_mut().zip(snapshot) {
            let valid = [saved.p_n2, saved.p_he]
                .iter()
                .all(|p| p.is_finite() && *p >= 0.0);
            if !valid {
                return Err(DecoError::invalid(
                    "tissue pressures must be finite and not negative",
                ));
            }
            tissue.p_n2 = saved.p_n2;
            tissue.p_he = saved.p_he;
            tissue.p_total = saved.p_n2 + saved.p_he;
        }
        Ok(tissues)
    }

    pub fn compartments(&self) -> &[Tissue] {
        &self.compartments
    }

    pub fn snapshot(&self) -> Vec<TissueSnapshot> {
        self.compartments.iter().map(Tissue::snapshot).collect()
    }

    /// Load every compartment; returns the sum of their total pressure changes.
    pub fn load(&mut self, segment: &Segment, gas: &Gas, converter: &DepthConverter) -> f64 {
        self.compartments
            .iter_mut()
            .map(|tissue| tissue.load(segment, gas, converter))
            .sum()
    }

    /// Deepest compartment ceiling (m) under gradient factor `gf`.
    pub fn ceiling(&self, gf: f64, converter: &DepthConverter) -> f64 {
        self.compartments
            .iter()
            .map(|tissue| tissue.ceiling(gf, converter))
            .fold(0.0_f64, f64::max)
    }

    /// Off-gas at the surface breathing air for `minutes`.
    pub fn surface_interval(&mut self, minutes: f64, converter: &DepthConverter) -> f64 {
        let segment = Segment::flat(0.0, minutes, Gas::air());
        self.load(&segment, &Gas::air(), converter)
    }

    /// True when every pressure is a finite number.
    pub fn is_finite(&self) -> bool {
        self.compartments
            .iter()
            .all(|tissue| tissue.p_n2.is_finite() && tissue.p_he.is_finite())
    }
}
