//! Job queue system for the nightly refresh cycles

pub mod context;
pub mod handlers;
pub mod types;

pub use context::JobContext;
pub use handlers::{run_aggregate_risk, run_classify_fleet, run_collect_news, CycleOutcome};
pub use types::{AggregateRiskJob, ClassifyFleetJob, CollectNewsJob};
