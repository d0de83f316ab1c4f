//! In-process copy of the latest published cycles served by the API
//!
//! Readers clone an `Arc` and never observe a half-replaced snapshot.

use crate::models::risk::PlantRiskRating;
use crate::models::status::{ClassifiedPlant, FleetSummary};
use crate::services::store::{PlantStore, StoreError};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Default)]
pub struct DashboardSnapshot {
    pub plants: Vec<ClassifiedPlant>,
    /// Sorted by risk score, highest first
    pub ratings: Vec<PlantRiskRating>,
    pub summary: FleetSummary,
    pub published_at: Option<DateTime<Utc>>,
}

impl DashboardSnapshot {
    pub fn new(
        plants: Vec<ClassifiedPlant>,
        mut ratings: Vec<PlantRiskRating>,
        published_at: DateTime<Utc>,
    ) -> Self {
        ratings.sort_by(|a, b| {
            b.risk_score
                .partial_cmp(&a.risk_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.plant_code.cmp(&b.plant_code))
        });
        let summary = FleetSummary::from_plants(&plants);
        Self {
            plants,
            ratings,
            summary,
            published_at: Some(published_at),
        }
    }

    pub fn plant(&self, code: &str) -> Option<&ClassifiedPlant> {
        self.plants.iter().find(|p| p.code == code)
    }

    pub fn rating(&self, code: &str) -> Option<&PlantRiskRating> {
        self.ratings.iter().find(|r| r.plant_code == code)
    }
}

#[derive(Default)]
pub struct SnapshotStore {
    current: RwLock<Arc<DashboardSnapshot>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn current(&self) -> Arc<DashboardSnapshot> {
        self.current.read().await.clone()
    }

    pub async fn publish(&self, snapshot: DashboardSnapshot) {
        let mut current = self.current.write().await;
        *current = Arc::new(snapshot);
    }

    /// Reload both published cycles from storage and swap them in together
    pub async fn refresh_from(&self, store: &dyn PlantStore) -> Result<usize, StoreError> {
        let plants = store.load_published_statuses().await?;
        let ratings = store.load_published_ratings().await?;
        let count = plants.len();
        debug!(
            plants = count,
            ratings = ratings.len(),
            "Loaded published snapshot with {} plants and {} ratings",
            count,
            ratings.len()
        );
        self.publish(DashboardSnapshot::new(plants, ratings, Utc::now()))
            .await;
        Ok(count)
    }

    /// Keep refreshing on a fixed interval; failures keep the previous snapshot
    pub fn spawn_refresh(
        self: Arc<Self>,
        store: Arc<dyn PlantStore>,
        every: Duration,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
            loop {
                ticker.tick().await;
                match self.refresh_from(store.as_ref()).await {
                    Ok(count) => debug!(plants = count, "Snapshot refreshed"),
                    Err(e) => error!(error = %e, "Snapshot refresh failed, serving previous data"),
                }
            }
        })
    }

    pub async fn log_state(&self) {
        let snapshot = self.current().await;
        info!(
            plants = snapshot.plants.len(),
            ratings = snapshot.ratings.len(),
            "Serving snapshot with {} plants",
            snapshot.plants.len()
        );
    }
}
