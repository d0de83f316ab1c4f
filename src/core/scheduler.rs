//! Cron-based scheduler for the refresh cycles

use crate::jobs::types::{cycle_id_at, ClassifyFleetJob, CollectNewsJob};
use apalis::prelude::*;
use apalis_redis::RedisStorage;
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

pub fn parse_schedule(expr: &str) -> Result<Schedule, Box<dyn std::error::Error + Send + Sync>> {
    Schedule::from_str(expr).map_err(|e| {
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Invalid cron expression '{}': {}", expr, e),
        )) as Box<dyn std::error::Error + Send + Sync>
    })
}

/// On every tick enqueues one ClassifyFleetJob and one CollectNewsJob sharing a cycle id
pub struct JobScheduler {
    classify: RedisStorage<ClassifyFleetJob>,
    collect: RedisStorage<CollectNewsJob>,
    schedule: Schedule,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl JobScheduler {
    /// `cron_expr` uses the six-field form: sec min hour day month weekday
    pub fn new(
        classify: RedisStorage<ClassifyFleetJob>,
        collect: RedisStorage<CollectNewsJob>,
        cron_expr: &str,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let schedule = parse_schedule(cron_expr)?;
        info!(cron = %cron_expr, "JobScheduler: created with cron {}", cron_expr);

        Ok(Self {
            classify,
            collect,
            schedule,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    /// Push both cycle jobs right away
    pub async fn enqueue_cycle(
        classify: &mut RedisStorage<ClassifyFleetJob>,
        collect: &mut RedisStorage<CollectNewsJob>,
        cycle_id: i64,
    ) {
        match classify.push(ClassifyFleetJob { cycle_id }).await {
            Ok(_) => debug!(cycle_id = cycle_id, "JobScheduler: enqueued ClassifyFleetJob"),
            Err(e) => error!(
                cycle_id = cycle_id,
                error = %e,
                "JobScheduler: failed to enqueue ClassifyFleetJob for cycle {}",
                cycle_id
            ),
        }
        match collect.push(CollectNewsJob { cycle_id }).await {
            Ok(_) => debug!(cycle_id = cycle_id, "JobScheduler: enqueued CollectNewsJob"),
            Err(e) => error!(
                cycle_id = cycle_id,
                error = %e,
                "JobScheduler: failed to enqueue CollectNewsJob for cycle {}",
                cycle_id
            ),
        }
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut classify = self.classify.clone();
        let mut collect = self.collect.clone();
        let schedule = self.schedule.clone();

        let handle = tokio::spawn(async move {
            info!("JobScheduler: started, waiting for cron schedule...");

            loop {
                let Some(next_tick) = schedule.upcoming(chrono::Utc).next() else {
                    tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                    continue;
                };
                let now = chrono::Utc::now();
                if next_tick > now {
                    let duration = (next_tick - now).to_std().unwrap_or_default();
                    tokio::time::sleep(duration).await;
                }

                let cycle_id = cycle_id_at(next_tick);
                info!(cycle_id = cycle_id, "JobScheduler: cron tick, starting cycle {}", cycle_id);
                Self::enqueue_cycle(&mut classify, &mut collect, cycle_id).await;
            }
        });

        {
            let mut h = self.handle.write().await;
            *h = Some(handle);
        }

        info!("JobScheduler: started successfully");
        Ok(())
    }

    /// Stop the scheduler
    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!("JobScheduler: stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        let handle = self.handle.read().await;
        handle.is_some()
    }
}
