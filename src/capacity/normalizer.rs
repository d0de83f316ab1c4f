//! Generation series to capacity factor conversion

use crate::models::generation::{CapacityFactorPoint, GenerationSample, YearMonth};

/// Capacity factor for one month of generation, clamped to [0, 1]
///
/// A non-positive nameplate yields 0 instead of dividing by zero.
pub fn capacity_factor(energy_mwh: f64, nameplate_mw: f64, month: YearMonth) -> f64 {
    if nameplate_mw <= 0.0 || !nameplate_mw.is_finite() {
        return 0.0;
    }
    let factor = energy_mwh / (nameplate_mw * month.hours());
    if factor.is_nan() {
        return 0.0;
    }
    factor.clamp(0.0, 1.0)
}

/// Normalize a plant's samples into an equal-length factor series
///
/// `None` samples stay `None`; reported zeros become a 0.0 factor. Idleness
/// follows the reported energy, not the clamped factor.
pub fn normalize_series(nameplate_mw: f64, samples: &[GenerationSample]) -> Vec<CapacityFactorPoint> {
    samples
        .iter()
        .map(|sample| CapacityFactorPoint {
            month: sample.month,
            factor: sample
                .energy_mwh
                .map(|mwh| capacity_factor(mwh, nameplate_mw, sample.month)),
            idle: sample.energy_mwh.map_or(true, |mwh| mwh == 0.0),
        })
        .collect()
}
