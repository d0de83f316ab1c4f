//! Job handlers for the refresh workflow
//!
//! ClassifyFleetJob runs on its own; CollectNewsJob → AggregateRiskJob is a chain.
//! Each apalis handler is a thin shell over a `run_*` function that only needs
//! the `JobContext`, so the cycles can be driven without Redis.

use crate::jobs::context::JobContext;
use crate::jobs::types::{AggregateRiskJob, ClassifyFleetJob, CollectNewsJob};
use crate::models::news::NewsArticle;
use crate::news::risk::WINDOW_LONG_DAYS;
use crate::news::{PlantDirectory, RiskAggregator};
use crate::pipeline::{classify_fleet, collect_news, persist_in_batches, tag_articles, BatchReport};
use crate::services::store::CycleKind;
use apalis::prelude::*;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

type JobError = Box<dyn std::error::Error + Send + Sync>;

/// What one cycle produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    pub rows: usize,
    pub report: BatchReport,
    pub published: bool,
}

fn store_error(context: &str, e: impl std::fmt::Display) -> JobError {
    Box::new(std::io::Error::other(format!("{}: {}", context, e)))
}

/// Publishing a cycle whose rows all failed would blank the dashboard
fn should_publish(rows: usize, report: &BatchReport) -> bool {
    rows == 0 || report.rows_written > 0
}

fn record_cycle(ctx: &JobContext, report: &BatchReport, started: Instant) {
    if let Some(ref metrics) = ctx.metrics {
        metrics
            .persist_batches_failed_total
            .inc_by(report.batches_failed as u64);
        metrics
            .cycle_duration_seconds
            .observe(started.elapsed().as_secs_f64());
    }
}

/// Classify the whole fleet and publish the statuses under `cycle_id`
pub async fn run_classify_fleet(ctx: &JobContext, cycle_id: i64) -> Result<CycleOutcome, JobError> {
    let started = Instant::now();
    let plants = ctx
        .store
        .load_plants()
        .await
        .map_err(|e| store_error("Failed to load plants", e))?;

    let classified = classify_fleet(&plants);

    let store = ctx.store.clone();
    let report = persist_in_batches(&classified, ctx.persist_batch_size, |batch| {
        let store = store.clone();
        async move { store.store_statuses(cycle_id, &batch).await }
    })
    .await;

    let published = should_publish(classified.len(), &report);
    if published {
        ctx.store
            .publish(CycleKind::Status, cycle_id)
            .await
            .map_err(|e| store_error("Failed to publish status cycle", e))?;
    } else {
        error!(
            cycle_id = cycle_id,
            "ClassifyFleetJob: every status batch failed, cycle {} not published",
            cycle_id
        );
    }

    if let Some(ref metrics) = ctx.metrics {
        metrics.plants_classified_total.inc_by(classified.len() as u64);
        metrics.classification_cycles_total.inc();
    }
    record_cycle(ctx, &report, started);

    info!(
        cycle_id = cycle_id,
        plants = classified.len(),
        rows_written = report.rows_written,
        batches_failed = report.batches_failed,
        published = published,
        "ClassifyFleetJob: classified {} plants in cycle {}",
        classified.len(),
        cycle_id
    );

    Ok(CycleOutcome {
        rows: classified.len(),
        report,
        published,
    })
}

/// Fetch, tag and store news for every plant
///
/// Returns the number of unique articles stored. Without a news source this
/// is a no-op and risk is re-aggregated from what is already stored.
pub async fn run_collect_news(ctx: &JobContext, cycle_id: i64) -> Result<usize, JobError> {
    let Some(ref source) = ctx.news else {
        info!(cycle_id = cycle_id, "CollectNewsJob: no news source configured, skipping fetch");
        return Ok(0);
    };

    let plants = ctx
        .store
        .load_plants()
        .await
        .map_err(|e| store_error("Failed to load plants", e))?;
    let directory = PlantDirectory::from_plants(&plants);

    let raw = collect_news(&plants, source.clone(), ctx.news_concurrency).await;
    let fetched = raw.len();
    let articles = tag_articles(raw, &directory);

    let store = ctx.store.clone();
    let report = persist_in_batches(&articles, ctx.persist_batch_size, |batch: Vec<NewsArticle>| {
        let store = store.clone();
        async move { store.store_articles(&batch).await }
    })
    .await;

    if let Some(ref metrics) = ctx.metrics {
        metrics.articles_tagged_total.inc_by(articles.len() as u64);
        metrics
            .persist_batches_failed_total
            .inc_by(report.batches_failed as u64);
    }

    info!(
        cycle_id = cycle_id,
        fetched = fetched,
        unique = articles.len(),
        rows_written = report.rows_written,
        "CollectNewsJob: stored {} of {} unique articles",
        report.rows_written,
        articles.len()
    );
    Ok(report.rows_written)
}

/// Aggregate the trailing-year corpus into ratings and publish them
pub async fn run_aggregate_risk(
    ctx: &JobContext,
    cycle_id: i64,
    now: DateTime<Utc>,
) -> Result<CycleOutcome, JobError> {
    let started = Instant::now();
    let since = now - Duration::days(WINDOW_LONG_DAYS);
    let articles = ctx
        .store
        .load_articles_since(since)
        .await
        .map_err(|e| store_error("Failed to load articles", e))?;

    let ratings = RiskAggregator::aggregate(&articles, now);
    debug!(
        cycle_id = cycle_id,
        articles = articles.len(),
        ratings = ratings.len(),
        "AggregateRiskJob: aggregated {} articles into {} ratings",
        articles.len(),
        ratings.len()
    );

    let store = ctx.store.clone();
    let report = persist_in_batches(&ratings, ctx.persist_batch_size, |batch| {
        let store = store.clone();
        async move { store.store_ratings(cycle_id, &batch).await }
    })
    .await;

    let published = should_publish(ratings.len(), &report);
    if published {
        ctx.store
            .publish(CycleKind::Risk, cycle_id)
            .await
            .map_err(|e| store_error("Failed to publish risk cycle", e))?;
    } else {
        error!(
            cycle_id = cycle_id,
            "AggregateRiskJob: every rating batch failed, cycle {} not published",
            cycle_id
        );
    }

    if let Some(ref metrics) = ctx.metrics {
        metrics.risk_ratings_total.inc_by(ratings.len() as u64);
    }
    record_cycle(ctx, &report, started);

    info!(
        cycle_id = cycle_id,
        ratings = ratings.len(),
        batches_failed = report.batches_failed,
        published = published,
        "AggregateRiskJob: rated {} plants in cycle {}",
        ratings.len(),
        cycle_id
    );

    Ok(CycleOutcome {
        rows: ratings.len(),
        report,
        published,
    })
}

pub async fn handle_classify_fleet(
    job: ClassifyFleetJob,
    ctx: Data<Arc<JobContext>>,
) -> Result<(), JobError> {
    debug!(cycle_id = job.cycle_id, "ClassifyFleetJob: starting cycle {}", job.cycle_id);
    run_classify_fleet(&ctx, job.cycle_id).await?;
    Ok(())
}

/// Collects news, then enqueues the risk aggregation for the same cycle
pub async fn handle_collect_news(
    job: CollectNewsJob,
    ctx: Data<Arc<JobContext>>,
    risk_storage: Data<apalis_redis::RedisStorage<AggregateRiskJob>>,
) -> Result<(), JobError> {
    debug!(cycle_id = job.cycle_id, "CollectNewsJob: starting cycle {}", job.cycle_id);

    // A failed fetch round still leaves the stored corpus worth re-rating
    if let Err(e) = run_collect_news(&ctx, job.cycle_id).await {
        warn!(cycle_id = job.cycle_id, error = %e, "CollectNewsJob: collection failed, aggregating stored corpus");
    }

    let mut storage = (*risk_storage).clone();
    storage
        .push(AggregateRiskJob {
            cycle_id: job.cycle_id,
        })
        .await
        .map_err(|e| store_error("Failed to enqueue AggregateRiskJob", e))?;

    debug!(cycle_id = job.cycle_id, "CollectNewsJob: enqueued AggregateRiskJob for cycle {}", job.cycle_id);
    Ok(())
}

pub async fn handle_aggregate_risk(
    job: AggregateRiskJob,
    ctx: Data<Arc<JobContext>>,
) -> Result<(), JobError> {
    run_aggregate_risk(&ctx, job.cycle_id, Utc::now()).await?;
    Ok(())
}
