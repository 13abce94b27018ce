//! No-decompression limits across recreational depths for one gas.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::algorithm::no_deco_limit;
use crate::error::DecoError;
use crate::gases::Gas;
use crate::options::{DecompressionOptions, STOP_DISTANCE};
use crate::segments::Segment;
use crate::tissues::Tissues;

const MIN_TABLE_DEPTH: f64 = 12.0;
const MAX_TABLE_DEPTH: f64 = 42.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct NdlLimit {
    pub depth: f64,
    /// Minutes at depth, `NDL_UNLIMITED` when unlimited.
    pub limit: u32,
}

/// NDL from a fresh surface state, every 3 m from 12 m to 42 m. Depths
/// beyond the gas MOD at `max_ppo2` are left out.
#[instrument(skip_all)]
pub fn ndl_limits(gas: Gas, options: &DecompressionOptions) -> Result<Vec<NdlLimit>, DecoError> {
    options.validate()?;
    gas.validate()?;
    let converter = options.depth_converter();
    let max_depth = gas.mod_depth(options.max_ppo2, &converter);
    let tissues = Tissues::new(converter.surface_pressure());

    let mut limits = Vec::new();
    let mut depth = MIN_TABLE_DEPTH;
    while depth <= MAX_TABLE_DEPTH && depth <= max_depth {
        let descent = Segment::depth_change(0.0, depth, options.descent_speed, gas);
        let limit = no_deco_limit(&[descent], options, &tissues)?;
        limits.push(NdlLimit { depth, limit });
        depth += STOP_DISTANCE;
    }
    Ok(limits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_air_table() {
        let limits = ndl_limits(Gas::air(), &DecompressionOptions::default()).unwrap();
        // air MOD at 1.4 is about 56 m, so the whole table is present
        assert_eq!(limits.len(), 11);
        assert_eq!(limits[0].depth, 12.0);
        assert_eq!(limits[10].depth, 42.0);
        for pair in limits.windows(2) {
            assert!(
                pair[0].limit >= pair[1].limit,
                "NDL must not grow with depth: {pair:?}"
            );
        }
    }

    #[test]
    fn test_table_stops_at_mod() {
        let limits = ndl_limits(Gas::new(0.32, 0.0), &DecompressionOptions::default()).unwrap();
        // EAN32 at 1.4 reaches its MOD at about 33.4 m
        assert_eq!(limits.last().map(|l| l.depth), Some(33.0));
    }

    #[test]
    fn test_nitrox_extends_limits() {
        let options = DecompressionOptions::default();
        let air = ndl_limits(Gas::air(), &options).unwrap();
        let nitrox = ndl_limits(Gas::new(0.32, 0.0), &options).unwrap();
        assert!(nitrox[3].limit > air[3].limit, "EAN32 at 21 m should beat air");
    }
}
