//! Shared data models spanning the engine layers.

pub mod error;
pub mod generation;
pub mod news;
pub mod risk;
pub mod status;

pub use error::{IngestError, MonthParseError};
pub use generation::{
    CapacityFactorPoint, FuelType, GenerationSample, Plant, PlantRow, SampleRow, YearMonth,
};
pub use news::{NewsArticle, RawArticle, Sentiment, TopicTag};
pub use risk::{PlantRiskRating, WindowCounts};
pub use status::{ClassifiedPlant, DisplayState, FleetSummary, PlantStatus};
