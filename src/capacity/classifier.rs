//! Trailing-twelve-month status classification
//!
//! Evaluation order is fixed: maintenance detection short-circuits before the
//! active-month floor, which in turn short-circuits before curtailment scoring.

use crate::capacity::regional::PeerSeries;
use crate::models::generation::{CapacityFactorPoint, FuelType};
use crate::models::status::PlantStatus;

pub const TTM_WINDOW: usize = 12;
/// Consecutive trailing idle months that mark a plant offline
pub const MAINTENANCE_RUN: usize = 3;
/// Factor a month must exceed to count as actively generating
pub const ACTIVE_FLOOR: f64 = 0.02;
pub const MIN_ACTIVE_MONTHS: usize = 6;
/// Plants below this fraction of their benchmark read as curtailed
pub const CURTAILMENT_RATIO: f64 = 0.80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchmarkSource {
    Peer,
    National,
}

/// Status plus the intermediate values it was derived from
#[derive(Debug, Clone, PartialEq)]
pub struct TrendAnalysis {
    pub status: PlantStatus,
    pub active_months: usize,
    pub active_average: f64,
    pub regional_reference: f64,
    pub benchmark: BenchmarkSource,
}

pub struct TrendClassifier;

impl TrendClassifier {
    pub fn classify(
        points: &[CapacityFactorPoint],
        peer: Option<&PeerSeries>,
        fuel: FuelType,
    ) -> PlantStatus {
        Self::analyze(points, peer, fuel).status
    }

    pub fn analyze(
        points: &[CapacityFactorPoint],
        peer: Option<&PeerSeries>,
        fuel: FuelType,
    ) -> TrendAnalysis {
        let start = points.len().saturating_sub(TTM_WINDOW);
        let ttm = &points[start..];

        let ttm_average = mean(ttm.iter().filter_map(|p| p.factor)).unwrap_or(0.0);
        let trailing_zero_run_length = ttm.iter().rev().take_while(|p| p.is_idle()).count();

        let active: Vec<&CapacityFactorPoint> = ttm
            .iter()
            .filter(|p| matches!(p.factor, Some(f) if f > ACTIVE_FLOOR))
            .collect();
        let active_average = mean(active.iter().filter_map(|p| p.factor)).unwrap_or(ttm_average);

        let (regional_reference, benchmark) = Self::regional_reference(&active, peer, fuel);

        let mut status = PlantStatus {
            ttm_average,
            is_likely_curtailed: false,
            curtailment_score: 0,
            has_no_recent_data: false,
            is_maintenance_offline: false,
            trailing_zero_run_length,
        };

        if trailing_zero_run_length >= MAINTENANCE_RUN {
            status.is_maintenance_offline = true;
        } else if active.len() < MIN_ACTIVE_MONTHS {
            status.has_no_recent_data = true;
        } else {
            status.is_likely_curtailed = active_average < regional_reference * CURTAILMENT_RATIO;
            status.curtailment_score = curtailment_score(active_average, regional_reference);
        }

        TrendAnalysis {
            status,
            active_months: active.len(),
            active_average,
            regional_reference,
            benchmark,
        }
    }

    /// Mean peer factor over the plant's active months, else the national constant
    fn regional_reference(
        active: &[&CapacityFactorPoint],
        peer: Option<&PeerSeries>,
        fuel: FuelType,
    ) -> (f64, BenchmarkSource) {
        let peer_mean = peer.and_then(|series| {
            mean(active.iter().filter_map(|p| series.get(&p.month).copied()))
        });
        match peer_mean {
            Some(reference) if reference > 0.0 => (reference, BenchmarkSource::Peer),
            _ => (fuel.national_typical_factor(), BenchmarkSource::National),
        }
    }
}

/// Percentage shortfall against the reference, rounded into 0..=100
pub fn curtailment_score(active_average: f64, reference: f64) -> u8 {
    if reference <= 0.0 {
        return 0;
    }
    let shortfall = ((reference - active_average) / reference) * 100.0;
    shortfall.clamp(0.0, 100.0).round() as u8
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
