//! Apalis worker setup for the refresh jobs

use crate::jobs::context::JobContext;
use crate::jobs::handlers;
use crate::jobs::types::{AggregateRiskJob, ClassifyFleetJob, CollectNewsJob};
use apalis::prelude::*;
use apalis_redis::RedisStorage;
use std::sync::Arc;
use tracing::info;

/// Redis-backed queues, one per job type
#[derive(Clone)]
pub struct JobQueues {
    pub classify: RedisStorage<ClassifyFleetJob>,
    pub collect: RedisStorage<CollectNewsJob>,
    pub aggregate: RedisStorage<AggregateRiskJob>,
}

impl JobQueues {
    pub async fn connect(redis_url: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let conn = apalis_redis::connect(redis_url).await.map_err(|e| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                format!("Failed to connect to Redis job queue: {}", e),
            )) as Box<dyn std::error::Error + Send + Sync>
        })?;
        Ok(Self {
            classify: RedisStorage::new(conn.clone()),
            collect: RedisStorage::new(conn.clone()),
            aggregate: RedisStorage::new(conn),
        })
    }
}

/// Runs one worker per job type
pub struct RefreshRuntime {
    job_context: Arc<JobContext>,
    queues: JobQueues,
}

impl RefreshRuntime {
    pub fn new(job_context: Arc<JobContext>, queues: JobQueues) -> Self {
        Self {
            job_context,
            queues,
        }
    }

    /// Start all workers and return handles for graceful shutdown
    pub async fn start_workers(
        &self,
    ) -> Result<Vec<tokio::task::JoinHandle<()>>, Box<dyn std::error::Error + Send + Sync>> {
        let mut handles = Vec::new();

        let classify_storage = self.queues.classify.clone();
        let ctx = self.job_context.clone();
        handles.push(tokio::spawn(async move {
            let worker = WorkerBuilder::new("classify-fleet-worker")
                .data(ctx)
                .backend(classify_storage)
                .build_fn(handlers::handle_classify_fleet);

            info!("RefreshRuntime: ClassifyFleetJob worker started");
            worker.run().await;
        }));

        let collect_storage = self.queues.collect.clone();
        let aggregate_storage = self.queues.aggregate.clone();
        let ctx = self.job_context.clone();
        handles.push(tokio::spawn(async move {
            let worker = WorkerBuilder::new("collect-news-worker")
                .data(ctx)
                .data(aggregate_storage)
                .backend(collect_storage)
                .build_fn(handlers::handle_collect_news);

            info!("RefreshRuntime: CollectNewsJob worker started");
            worker.run().await;
        }));

        let aggregate_storage = self.queues.aggregate.clone();
        let ctx = self.job_context.clone();
        handles.push(tokio::spawn(async move {
            let worker = WorkerBuilder::new("aggregate-risk-worker")
                .data(ctx)
                .backend(aggregate_storage)
                .build_fn(handlers::handle_aggregate_risk);

            info!("RefreshRuntime: AggregateRiskJob worker started");
            worker.run().await;
        }));

        info!(workers = handles.len(), "RefreshRuntime: all workers started");
        Ok(handles)
    }
}
