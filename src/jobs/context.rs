//! Job context for dependency injection

use crate::config::DEFAULT_NEWS_FETCH_CONCURRENCY;
use crate::config::DEFAULT_PERSIST_BATCH_SIZE;
use crate::metrics::Metrics;
use crate::services::news::NewsSource;
use crate::services::store::PlantStore;
use std::sync::Arc;

/// Shared by every worker through apalis `Data<Arc<JobContext>>`
///
/// `news` is `None` when no news API key is configured; collection is then
/// skipped and risk is re-aggregated from the stored corpus only.
pub struct JobContext {
    pub store: Arc<dyn PlantStore>,
    pub news: Option<Arc<dyn NewsSource>>,
    pub metrics: Option<Arc<Metrics>>,
    pub persist_batch_size: usize,
    pub news_concurrency: usize,
}

impl JobContext {
    pub fn new(store: Arc<dyn PlantStore>) -> Self {
        Self {
            store,
            news: None,
            metrics: None,
            persist_batch_size: DEFAULT_PERSIST_BATCH_SIZE,
            news_concurrency: DEFAULT_NEWS_FETCH_CONCURRENCY,
        }
    }

    pub fn with_news(mut self, news: Arc<dyn NewsSource>) -> Self {
        self.news = Some(news);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.persist_batch_size = size.max(1);
        self
    }

    pub fn with_news_concurrency(mut self, concurrency: usize) -> Self {
        self.news_concurrency = concurrency.max(1);
        self
    }
}
