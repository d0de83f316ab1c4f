use serde::{Deserialize, Serialize};

/// Article tallies for one look-back window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowCounts {
    pub article_count: u32,
    pub negative_count: u32,
    pub outage_topic_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantRiskRating {
    pub plant_code: String,
    pub window_30d: WindowCounts,
    pub window_90d: WindowCounts,
    pub window_365d: WindowCounts,
    pub risk_score: f64,
    pub top_article_ids: Vec<String>,
}
