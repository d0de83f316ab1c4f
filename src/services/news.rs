//! News-fetch collaborator interface and adapters

use crate::cache::ArticleCache;
use crate::models::news::RawArticle;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

pub type NewsError = Box<dyn std::error::Error + Send + Sync>;

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Fetch articles for a free-text query
    ///
    /// `plant_code` marks a plant-targeted query; returned articles carry it as a hint.
    async fn fetch(&self, query: &str, plant_code: Option<&str>) -> Result<Vec<RawArticle>, NewsError>;
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    published_at: Option<DateTime<Utc>>,
}

/// Single-request client for a NewsAPI-compatible `/v2/everything` endpoint
pub struct NewsApiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl NewsApiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(base_url, api_key, reqwest::Client::new())
    }

    pub fn with_client(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn fetch(&self, query: &str, plant_code: Option<&str>) -> Result<Vec<RawArticle>, NewsError> {
        let url = format!("{}/v2/everything", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                Box::new(std::io::Error::other(format!("News request failed: {}", e))) as NewsError
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Box::new(std::io::Error::other(format!(
                "News API returned {} for query '{}'",
                status, query
            ))));
        }

        let body: NewsApiResponse = response.json().await.map_err(|e| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Invalid news payload: {}", e),
            )) as NewsError
        })?;

        let total = body.articles.len();
        let articles: Vec<RawArticle> = body
            .articles
            .into_iter()
            .filter_map(|a| {
                // Articles without a title or timestamp cannot be classified or windowed
                let title = a.title.filter(|t| !t.trim().is_empty())?;
                let published_at = a.published_at?;
                Some(RawArticle {
                    title,
                    description: a.description.unwrap_or_default(),
                    content: a.content,
                    url: a.url.unwrap_or_default(),
                    published_at,
                    plant_code: plant_code.map(str::to_string),
                })
            })
            .collect();

        if articles.len() < total {
            debug!(
                query = %query,
                dropped = total - articles.len(),
                "Dropped {} untitled or undated articles",
                total - articles.len()
            );
        }
        Ok(articles)
    }
}

/// Wraps a source with a per-plant cache; only plant-targeted queries are cached
pub struct CachedNewsSource {
    inner: Arc<dyn NewsSource>,
    cache: Arc<dyn ArticleCache>,
}

impl CachedNewsSource {
    pub fn new(inner: Arc<dyn NewsSource>, cache: Arc<dyn ArticleCache>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl NewsSource for CachedNewsSource {
    async fn fetch(&self, query: &str, plant_code: Option<&str>) -> Result<Vec<RawArticle>, NewsError> {
        let Some(code) = plant_code else {
            return self.inner.fetch(query, None).await;
        };

        match self.cache.get(code).await {
            Ok(Some(articles)) => {
                debug!(plant_code = %code, count = articles.len(), "News cache hit for {}", code);
                return Ok(articles);
            }
            Ok(None) => {}
            Err(e) => warn!(plant_code = %code, error = %e, "News cache read failed, fetching"),
        }

        let articles = self.inner.fetch(query, Some(code)).await?;
        if let Err(e) = self.cache.put(code, &articles).await {
            warn!(plant_code = %code, error = %e, "News cache write failed");
        }
        Ok(articles)
    }
}

/// Query used to look up news about one plant
pub fn plant_query(plant: &crate::models::generation::Plant) -> String {
    format!("\"{}\" {}", plant.name.trim(), plant.fuel.news_keyword())
}
