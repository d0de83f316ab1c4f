//! News matching, tagging and risk aggregation

pub mod classifier;
pub mod keywords;
pub mod matcher;
pub mod risk;

pub use classifier::{classify_sentiment, classify_topics, ArticleClassifier};
pub use matcher::PlantDirectory;
pub use risk::{risk_score, RiskAggregator, RiskWeights};
