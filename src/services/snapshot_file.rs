//! JSON snapshot files for offline runs

use crate::models::error::IngestError;
use crate::models::generation::{Plant, PlantRow};
use crate::models::news::RawArticle;
use crate::services::store::validate_rows;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Plants plus raw articles, as exported by the ingestion and news collaborators
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotFile {
    #[serde(default)]
    pub plants: Vec<PlantRow>,
    #[serde(default)]
    pub articles: Vec<RawArticle>,
}

pub struct LoadedSnapshot {
    pub plants: Vec<Plant>,
    pub articles: Vec<RawArticle>,
}

impl SnapshotFile {
    pub fn read(path: impl AsRef<Path>) -> Result<Self, IngestError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn into_validated(self) -> LoadedSnapshot {
        LoadedSnapshot {
            plants: validate_rows(self.plants),
            articles: self.articles,
        }
    }
}
