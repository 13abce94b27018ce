//! Surface air consumption (SAC) formulas.
//!
//! Tank sizes are water volumes in litres, gas amounts are bars taken from the
//! tank, depths are average depths in metres.

use crate::error::DecoError;
use crate::pressure::DepthConverter;

fn check_positive(name: &str, value: f64) -> Result<(), DecoError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DecoError::invalid(format!("{name} must be positive")));
    }
    Ok(())
}

fn check_depth(depth: f64) -> Result<(), DecoError> {
    if !depth.is_finite() || depth < 0.0 {
        return Err(DecoError::invalid("depth must not be negative"));
    }
    Ok(())
}

/// Surface air consumption in l/min, rounded up to two decimals.
pub fn calculate_sac(
    depth: f64,
    tank: f64,
    used: f64,
    duration: f64,
    converter: &DepthConverter,
) -> Result<f64, DecoError> {
    check_depth(depth)?;
    check_positive("tank", tank)?;
    check_positive("duration", duration)?;
    if !used.is_finite() || used < 0.0 {
        return Err(DecoError::invalid("used gas must not be negative"));
    }

    let sac = tank * used / duration / converter.to_bar(depth);
    Ok((sac * 100.0).ceil() / 100.0)
}

/// Minutes `used` bars last at `depth` for a diver with the given SAC,
/// rounded up.
pub fn calculate_duration(
    depth: f64,
    tank: f64,
    used: f64,
    sac: f64,
    converter: &DepthConverter,
) -> Result<f64, DecoError> {
    check_depth(depth)?;
    check_positive("tank", tank)?;
    check_positive("sac", sac)?;
    if !used.is_finite() || used < 0.0 {
        return Err(DecoError::invalid("used gas must not be negative"));
    }

    Ok((tank * used / sac / converter.to_bar(depth)).ceil())
}

/// Bars consumed from the tank over `duration` minutes at `depth`, rounded up.
pub fn calculate_used(
    depth: f64,
    tank: f64,
    duration: f64,
    sac: f64,
    converter: &DepthConverter,
) -> Result<f64, DecoError> {
    check_depth(depth)?;
    check_positive("tank", tank)?;
    check_positive("sac", sac)?;
    if !duration.is_finite() || duration < 0.0 {
        return Err(DecoError::invalid("duration must not be negative"));
    }

    Ok((duration * converter.to_bar(depth) * sac / tank).ceil())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> DepthConverter {
        DepthConverter::for_fresh_water()
    }

    #[test]
    fn test_sac() {
        // 15 l tank, 150 bar over 45 min at 15 m in fresh water
        let sac = calculate_sac(15.0, 15.0, 150.0, 45.0, &fresh()).unwrap();
        assert!((sac - 20.13).abs() < 1e-9, "sac was {sac}");
    }

    #[test]
    fn test_duration() {
        let duration = calculate_duration(15.0, 15.0, 150.0, 20.0, &fresh()).unwrap();
        assert_eq!(duration, 46.0);
    }

    #[test]
    fn test_used() {
        let used = calculate_used(15.0, 15.0, 45.0, 20.0, &fresh()).unwrap();
        assert_eq!(used, 150.0);
    }

    #[test]
    fn test_at_surface() {
        let converter = DepthConverter::with_surface_pressure(Default::default(), 1.0);
        let used = calculate_used(0.0, 10.0, 10.0, 20.0, &converter).unwrap();
        assert_eq!(used, 20.0);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(calculate_sac(15.0, 15.0, 150.0, 0.0, &fresh()).is_err());
        assert!(calculate_sac(-1.0, 15.0, 150.0, 45.0, &fresh()).is_err());
        assert!(calculate_duration(15.0, 0.0, 150.0, 20.0, &fresh()).is_err());
        assert!(calculate_used(15.0, 15.0, 45.0, f64::NAN, &fresh()).is_err());
    }
}
