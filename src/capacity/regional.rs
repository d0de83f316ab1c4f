//! Regional peer benchmark tables
//!
//! Rebuilt from the full plant snapshot on every refresh; never patched incrementally.

use crate::capacity::normalizer::capacity_factor;
use crate::models::generation::{FuelType, Plant, YearMonth};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Minimum factor for a month to count toward a peer average
pub const PEER_MIN_FACTOR: f64 = 0.02;

/// Month -> average observed capacity factor
pub type PeerSeries = BTreeMap<YearMonth, f64>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PeerKey {
    pub area: String,
    pub fuel: FuelType,
}

impl PeerKey {
    pub fn new(area: impl Into<String>, fuel: FuelType) -> Self {
        Self {
            area: area.into(),
            fuel,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegionalPeerTable {
    by_region: HashMap<PeerKey, PeerSeries>,
    by_subregion: HashMap<PeerKey, PeerSeries>,
}

type Buckets = HashMap<PeerKey, BTreeMap<YearMonth, (f64, usize)>>;

impl RegionalPeerTable {
    /// Build both tables from the whole population in one pass
    pub fn build(plants: &[Plant]) -> Self {
        let mut region_buckets: Buckets = HashMap::new();
        let mut subregion_buckets: Buckets = HashMap::new();

        for plant in plants {
            for sample in &plant.samples {
                let mwh = match sample.energy_mwh {
                    Some(v) if v != 0.0 => v,
                    _ => continue,
                };
                let factor = capacity_factor(mwh, plant.nameplate_mw, sample.month);
                if factor < PEER_MIN_FACTOR {
                    continue;
                }

                accumulate(
                    &mut region_buckets,
                    PeerKey::new(plant.region.clone(), plant.fuel),
                    sample.month,
                    factor,
                );
                if let Some(sub) = &plant.subregion {
                    accumulate(
                        &mut subregion_buckets,
                        PeerKey::new(sub.clone(), plant.fuel),
                        sample.month,
                        factor,
                    );
                }
            }
        }

        Self {
            by_region: finish(region_buckets),
            by_subregion: finish(subregion_buckets),
        }
    }

    pub fn region(&self, region: &str, fuel: FuelType) -> Option<&PeerSeries> {
        self.by_region.get(&PeerKey::new(region, fuel))
    }

    pub fn subregion(&self, subregion: &str, fuel: FuelType) -> Option<&PeerSeries> {
        self.by_subregion.get(&PeerKey::new(subregion, fuel))
    }

    /// Most specific benchmark available: subregion, then region
    pub fn benchmark_for(&self, plant: &Plant) -> Option<&PeerSeries> {
        plant
            .subregion
            .as_deref()
            .and_then(|sub| self.subregion(sub, plant.fuel))
            .or_else(|| self.region(&plant.region, plant.fuel))
    }

    pub fn is_empty(&self) -> bool {
        self.by_region.is_empty() && self.by_subregion.is_empty()
    }
}

fn accumulate(buckets: &mut Buckets, key: PeerKey, month: YearMonth, factor: f64) {
    let entry = buckets
        .entry(key)
        .or_default()
        .entry(month)
        .or_insert((0.0, 0));
    entry.0 += factor;
    entry.1 += 1;
}

fn finish(buckets: Buckets) -> HashMap<PeerKey, PeerSeries> {
    buckets
        .into_iter()
        .map(|(key, months)| {
            let series = months
                .into_iter()
                .filter(|(_, (_, count))| *count > 0)
                .map(|(month, (sum, count))| (month, sum / count as f64))
                .collect();
            (key, series)
        })
        .collect()
}
