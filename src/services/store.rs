//! Storage collaborator interface

use crate::models::generation::{Plant, PlantRow};
use crate::models::news::NewsArticle;
use crate::models::risk::PlantRiskRating;
use crate::models::status::ClassifiedPlant;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::warn;

pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Output family a cycle id is published for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleKind {
    Status,
    Risk,
}

impl CycleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleKind::Status => "status",
            CycleKind::Risk => "risk",
        }
    }
}

/// Rows written under a cycle id stay invisible to readers until `publish`
#[async_trait]
pub trait PlantStore: Send + Sync {
    async fn load_plants(&self) -> Result<Vec<Plant>, StoreError>;

    async fn store_statuses(&self, cycle_id: i64, batch: &[ClassifiedPlant]) -> Result<(), StoreError>;

    /// Upsert by article id
    async fn store_articles(&self, articles: &[NewsArticle]) -> Result<(), StoreError>;

    async fn load_articles_since(&self, since: DateTime<Utc>) -> Result<Vec<NewsArticle>, StoreError>;

    async fn store_ratings(&self, cycle_id: i64, batch: &[PlantRiskRating]) -> Result<(), StoreError>;

    /// Point readers at `cycle_id` and drop rows of older cycles of the same kind
    async fn publish(&self, kind: CycleKind, cycle_id: i64) -> Result<(), StoreError>;

    async fn load_published_statuses(&self) -> Result<Vec<ClassifiedPlant>, StoreError>;

    async fn load_published_ratings(&self) -> Result<Vec<PlantRiskRating>, StoreError>;
}

/// Convert storage rows into typed plants, skipping rows that fail validation
pub fn validate_rows(rows: Vec<PlantRow>) -> Vec<Plant> {
    let total = rows.len();
    let plants: Vec<Plant> = rows
        .into_iter()
        .filter_map(|row| {
            let code = row.code.clone();
            match Plant::try_from(row) {
                Ok(plant) => Some(plant),
                Err(e) => {
                    warn!(plant_code = %code, error = %e, "Skipping invalid plant row");
                    None
                }
            }
        })
        .collect();
    if plants.len() < total {
        warn!(
            skipped = total - plants.len(),
            total = total,
            "Skipped {} of {} plant rows",
            total - plants.len(),
            total
        );
    }
    plants
}
