//! Plantwatch Worker
//!
//! Runs the nightly classification and news-risk cycles from the Redis queue.
//! Pass `--run-now` to enqueue one cycle immediately on startup.

use dotenvy::dotenv;
use plantwatch::cache::{ArticleCache, MemoryArticleCache, RedisArticleCache};
use plantwatch::config::WorkerConfig;
use plantwatch::core::runtime::{JobQueues, RefreshRuntime};
use plantwatch::core::scheduler::JobScheduler;
use plantwatch::db::PostgresStore;
use plantwatch::jobs::context::JobContext;
use plantwatch::jobs::types::next_cycle_id;
use plantwatch::logging;
use plantwatch::metrics::Metrics;
use plantwatch::services::news::{CachedNewsSource, NewsApiClient, NewsSource};
use std::env;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    logging::init_logging();

    let config = WorkerConfig::from_env();
    let run_now = env::args().any(|a| a == "--run-now");

    let environment = plantwatch::config::get_environment();
    info!("Starting Plantwatch Worker");
    info!(environment = %environment, "Environment");
    info!(cron = %config.refresh_cron, batch_size = config.persist_batch_size, "Refresh schedule: {}", config.refresh_cron);

    let metrics = Arc::new(Metrics::new()?);

    info!("Initializing Postgres connection...");
    let store = match PostgresStore::connect(&config.database_url).await {
        Ok(db) => {
            info!("Postgres connected");
            metrics.database_connected.set(1.0);
            Arc::new(db)
        }
        Err(e) => {
            warn!(error = %e, "Worker requires Postgres - exiting");
            return Err(format!("Postgres connection required for worker: {}", e).into());
        }
    };

    let mut job_context = JobContext::new(store)
        .with_metrics(metrics.clone())
        .with_batch_size(config.persist_batch_size)
        .with_news_concurrency(config.news.fetch_concurrency);

    match config.news.api_key.clone() {
        Some(key) => {
            let cache: Arc<dyn ArticleCache> =
                match RedisArticleCache::new(&config.redis_url, config.news.cache_ttl).await {
                    Ok(c) => {
                        info!("Redis news cache connected");
                        metrics.cache_connected.set(1.0);
                        Arc::new(c)
                    }
                    Err(e) => {
                        warn!(error = %e, "Redis news cache unavailable, using in-process cache");
                        Arc::new(MemoryArticleCache::new(config.news.cache_ttl))
                    }
                };
            let client: Arc<dyn NewsSource> = Arc::new(NewsApiClient::new(config.news.api_url.clone(), key));
            job_context = job_context.with_news(Arc::new(CachedNewsSource::new(client, cache)));
            info!(url = %config.news.api_url, "News collection enabled");
        }
        None => warn!("NEWS_API_KEY not set - news collection disabled, risk uses stored articles"),
    }
    let job_context = Arc::new(job_context);

    info!("Initializing Apalis Redis storage...");
    let queues = JobQueues::connect(&config.redis_url).await?;
    info!("Apalis Redis storage initialized");

    info!("Starting Apalis workers...");
    let runtime = RefreshRuntime::new(job_context, queues.clone());
    let worker_handles = runtime
        .start_workers()
        .await
        .map_err(|e| format!("Failed to start workers: {}", e))?;

    info!("Starting job scheduler...");
    let scheduler = JobScheduler::new(queues.classify.clone(), queues.collect.clone(), &config.refresh_cron)
        .map_err(|e| format!("Failed to create scheduler: {}", e))?;
    scheduler
        .start()
        .await
        .map_err(|e| format!("Failed to start scheduler: {}", e))?;

    if run_now {
        let cycle_id = next_cycle_id();
        info!(cycle_id = cycle_id, "Enqueuing startup cycle {}", cycle_id);
        let mut classify = queues.classify.clone();
        let mut collect = queues.collect.clone();
        JobScheduler::enqueue_cycle(&mut classify, &mut collect, cycle_id).await;
    }

    info!("Worker started, waiting for shutdown signal...");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down worker...");
            scheduler.stop().await;
            for handle in worker_handles {
                handle.abort();
            }
            info!("Worker stopped");
        }
    }

    Ok(())
}
