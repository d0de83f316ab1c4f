//! Semantic-search collaborator interface
//!
//! Embeddings live outside this crate; they join back to articles through
//! `NewsArticle::id`, which is stable across fetches.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedArticle {
    pub article_id: String,
    pub score: f32,
}

#[async_trait]
pub trait ArticleSearch: Send + Sync {
    async fn similar_articles(
        &self,
        plant_code: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<RankedArticle>, Box<dyn std::error::Error + Send + Sync>>;
}
