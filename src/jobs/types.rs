//! Job payloads stored in Redis
//!
//! Every job carries the cycle id its rows are written under; ids are UTC
//! timestamp millis taken when the scheduler ticked.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Load plants, classify the fleet, persist statuses and publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyFleetJob {
    pub cycle_id: i64,
}

/// Fetch and tag news for every plant, then chain an `AggregateRiskJob`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectNewsJob {
    pub cycle_id: i64,
}

/// Roll the trailing-year article corpus into risk ratings and publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateRiskJob {
    pub cycle_id: i64,
}

pub fn cycle_id_at(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub fn next_cycle_id() -> i64 {
    cycle_id_at(Utc::now())
}
