//! Per-plant article cache with an injected TTL

pub mod memory;
pub mod redis_store;

pub use memory::MemoryArticleCache;
pub use redis_store::RedisArticleCache;

use crate::models::news::RawArticle;
use async_trait::async_trait;

pub type CacheError = Box<dyn std::error::Error + Send + Sync>;

/// Cached news lookups keyed by plant code
#[async_trait]
pub trait ArticleCache: Send + Sync {
    /// `None` on a miss or when the entry has expired
    async fn get(&self, plant_code: &str) -> Result<Option<Vec<RawArticle>>, CacheError>;

    async fn put(&self, plant_code: &str, articles: &[RawArticle]) -> Result<(), CacheError>;
}
