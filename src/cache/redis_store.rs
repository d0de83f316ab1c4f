use super::{ArticleCache, CacheError};
use crate::models::news::RawArticle;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;

/// Redis-backed cache; JSON payloads stored under `news:{plant_code}` with SETEX
#[derive(Clone)]
pub struct RedisArticleCache {
    conn: ConnectionManager,
    ttl: Duration,
}

impl RedisArticleCache {
    pub async fn new(redis_url: &str, ttl: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url).map_err(|e| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid Redis URL: {}", e),
            )) as CacheError
        })?;
        let conn = ConnectionManager::new(client).await.map_err(|e| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                format!("Failed to connect to Redis: {}", e),
            )) as CacheError
        })?;
        Ok(Self { conn, ttl })
    }

    fn key(plant_code: &str) -> String {
        format!("news:{}", plant_code)
    }
}

#[async_trait]
impl ArticleCache for RedisArticleCache {
    async fn get(&self, plant_code: &str) -> Result<Option<Vec<RawArticle>>, CacheError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn.get(Self::key(plant_code)).await.map_err(|e| {
            Box::new(std::io::Error::other(format!("Redis GET failed: {}", e))) as CacheError
        })?;
        match payload {
            Some(json) => {
                let articles = serde_json::from_str(&json).map_err(|e| {
                    Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("Corrupt cache entry for {}: {}", plant_code, e),
                    )) as CacheError
                })?;
                Ok(Some(articles))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, plant_code: &str, articles: &[RawArticle]) -> Result<(), CacheError> {
        let ttl_secs = self.ttl.as_secs();
        if ttl_secs == 0 {
            return Ok(());
        }
        let json = serde_json::to_string(articles)?;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(Self::key(plant_code), json, ttl_secs)
            .await
            .map_err(|e| {
                Box::new(std::io::Error::other(format!("Redis SETEX failed: {}", e))) as CacheError
            })?;
        Ok(())
    }
}
