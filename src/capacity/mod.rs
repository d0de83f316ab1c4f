//! Capacity-factor normalization, peer benchmarks and status classification

pub mod classifier;
pub mod normalizer;
pub mod regional;

pub use classifier::{BenchmarkSource, TrendAnalysis, TrendClassifier};
pub use normalizer::{capacity_factor, normalize_series};
pub use regional::{PeerKey, PeerSeries, RegionalPeerTable};

use crate::models::generation::Plant;

/// Normalize one plant's series and classify it against the shared peer table
pub fn analyze_plant(plant: &Plant, peers: &RegionalPeerTable) -> TrendAnalysis {
    let points = normalize_series(plant.nameplate_mw, &plant.samples);
    TrendClassifier::analyze(&points, peers.benchmark_for(plant), plant.fuel)
}
