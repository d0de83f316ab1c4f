use super::{ArticleCache, CacheError};
use crate::models::news::RawArticle;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

struct Entry {
    articles: Vec<RawArticle>,
    expires_at: Instant,
}

/// In-process cache; entries expire `ttl` after insertion
pub struct MemoryArticleCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryArticleCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Drop expired entries
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }
}

#[async_trait]
impl ArticleCache for MemoryArticleCache {
    async fn get(&self, plant_code: &str) -> Result<Option<Vec<RawArticle>>, CacheError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(plant_code)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.articles.clone()))
    }

    async fn put(&self, plant_code: &str, articles: &[RawArticle]) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        entries.insert(
            plant_code.to_string(),
            Entry {
                articles: articles.to_vec(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(())
    }
}
