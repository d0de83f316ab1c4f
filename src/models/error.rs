//! Validation errors raised at the ingestion boundary

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonthParseError {
    #[error("expected YYYY-MM, got '{0}'")]
    Format(String),

    #[error("month {0} is outside 1..=12")]
    MonthOutOfRange(u32),
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("missing field: {0}")]
    MissingField(String),

    #[error("unknown fuel type: {0}")]
    UnknownFuel(String),

    #[error("plant {plant}: bad month: {source}")]
    BadMonth {
        plant: String,
        #[source]
        source: MonthParseError,
    },

    #[error("plant {plant}: duplicate sample for {month}")]
    DuplicateMonth { plant: String, month: String },

    #[error("snapshot could not be read: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
