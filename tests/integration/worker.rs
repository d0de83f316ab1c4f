//! Integration tests for the Worker
//!
//! Drives the job cycles through `JobContext` with in-memory collaborators.


use crate::fixtures::{article, fixed_now, named_plant, plant};
use plantwatch::core::snapshot::SnapshotStore;
use plantwatch::jobs::{run_aggregate_risk, run_classify_fleet, run_collect_news, JobContext};
use plantwatch::metrics::Metrics;
use plantwatch::models::generation::FuelType;
use plantwatch::models::status::DisplayState;
use plantwatch::news::PlantDirectory;
use plantwatch::pipeline::tag_articles;
use plantwatch::services::news::NewsSource;
use plantwatch::services::store::{CycleKind, PlantStore};
use std::collections::HashMap;
use std::sync::Arc;

use test_utils::{FakeNews, MemoryStore};

fn wind_fleet() -> Vec<plantwatch::models::generation::Plant> {
    vec![
        plant("A", FuelType::Wind, 100.0, "SPP", &[Some(0.50); 12]),
        plant("B", FuelType::Wind, 100.0, "SPP", &[Some(0.20); 12]),
        plant("C", FuelType::Wind, 100.0, "SPP", &[Some(0.0); 12]),
    ]
}

fn news_fleet() -> Vec<plantwatch::models::generation::Plant> {
    vec![
        named_plant("100", "Prairie Winds Farm", "NextEra Energy", "IA"),
        named_plant("300", "Sandstone Wind", "Orsted Onshore", "TX"),
    ]
}

#[tokio::test]
async fn classify_cycle_writes_and_publishes_statuses() {
    let store = Arc::new(MemoryStore::with_plants(wind_fleet()));
    let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
    let ctx = JobContext::new(store.clone()).with_metrics(metrics.clone());

    let outcome = run_classify_fleet(&ctx, 42).await.expect("cycle should succeed");

    assert_eq!(outcome.rows, 3);
    assert!(outcome.published);
    assert!(outcome.report.is_clean());
    assert_eq!(store.published(CycleKind::Status), Some(42));
    assert_eq!(store.statuses_in(42).len(), 3);
    assert_eq!(metrics.plants_classified_total.get(), 3);
    assert_eq!(metrics.classification_cycles_total.get(), 1);
}

#[tokio::test]
async fn failed_batch_is_skipped_and_the_rest_publish() {
    let store = Arc::new(MemoryStore::with_plants(wind_fleet()).failing_on("B"));
    let ctx = JobContext::new(store.clone()).with_batch_size(1);

    let outcome = run_classify_fleet(&ctx, 7).await.expect("cycle should finish");

    assert_eq!(outcome.report.batches_failed, 1);
    assert_eq!(outcome.report.rows_written, 2);
    assert!(outcome.published);
    let codes: Vec<String> = store.statuses_in(7).into_iter().map(|p| p.code).collect();
    assert_eq!(codes, vec!["A", "C"]);
}

#[tokio::test]
async fn cycle_with_every_batch_failed_is_not_published() {
    let store = Arc::new(MemoryStore::with_plants(wind_fleet()).failing_on("A"));
    let ctx = JobContext::new(store.clone()).with_batch_size(10);

    let outcome = run_classify_fleet(&ctx, 9).await.expect("cycle should finish");

    assert!(!outcome.published);
    assert_eq!(store.published(CycleKind::Status), None);
}

#[tokio::test]
async fn publishing_a_cycle_drops_older_cycles() {
    let store = Arc::new(MemoryStore::with_plants(wind_fleet()));
    let ctx = JobContext::new(store.clone());

    run_classify_fleet(&ctx, 100).await.expect("first cycle");
    run_classify_fleet(&ctx, 200).await.expect("second cycle");

    assert_eq!(store.published(CycleKind::Status), Some(200));
    assert_eq!(store.stored_cycles(CycleKind::Status), vec![200]);
    assert!(store.statuses_in(100).is_empty());
    assert_eq!(store.load_published_statuses().await.unwrap().len(), 3);
}

#[tokio::test]
async fn unpublished_cycle_keeps_the_previous_rows() {
    let store = Arc::new(MemoryStore::with_plants(news_fleet()));
    let ctx = JobContext::new(store.clone());
    run_classify_fleet(&ctx, 5).await.expect("published cycle");

    store.publish(CycleKind::Risk, 6).await.unwrap();

    assert_eq!(store.stored_cycles(CycleKind::Status), vec![5]);
}

#[tokio::test]
async fn news_cycle_collects_tags_and_rates() {
    let store = Arc::new(MemoryStore::with_plants(news_fleet()));
    let mut by_plant = HashMap::new();
    by_plant.insert(
        "100".to_string(),
        vec![
            article("Prairie Winds Farm outage", "Turbines offline after ice storm", 5),
            article("NextEra Energy expands in Texas", "New contracts signed", 40),
        ],
    );
    let news = Arc::new(FakeNews {
        by_plant,
        fail_for: Some("300".to_string()),
        ..FakeNews::default()
    });
    let ctx = JobContext::new(store.clone())
        .with_news(news.clone())
        .with_news_concurrency(2);

    let stored = run_collect_news(&ctx, 11).await.expect("collection should succeed");
    assert_eq!(stored, 2);
    assert_eq!(news.call_count(), 2);

    let outcome = run_aggregate_risk(&ctx, 11, fixed_now()).await.expect("aggregation should succeed");
    assert!(outcome.published);
    assert_eq!(store.published(CycleKind::Risk), Some(11));

    let ratings = store.load_published_ratings().await.unwrap();
    let prairie = ratings.iter().find(|r| r.plant_code == "100").expect("rating for 100");
    assert_eq!(prairie.window_30d.outage_topic_count, 1);
    assert_eq!(prairie.window_90d.article_count, 2);
    // Owner plus "Texas" pulls in the TX plant as well
    assert!(ratings.iter().any(|r| r.plant_code == "300"));
}

#[tokio::test]
async fn without_a_news_source_risk_uses_the_stored_corpus() {
    let plants = news_fleet();
    let store = Arc::new(MemoryStore::with_plants(plants.clone()));
    let directory = PlantDirectory::from_plants(&plants);
    store.seed_articles(tag_articles(
        vec![article("Sandstone Wind shutdown ordered", "Regulator cites safety lapse", 3)],
        &directory,
    ));
    let ctx = JobContext::new(store.clone());

    assert_eq!(run_collect_news(&ctx, 1).await.unwrap(), 0);
    let outcome = run_aggregate_risk(&ctx, 1, fixed_now()).await.unwrap();

    assert_eq!(outcome.rows, 1);
    assert_eq!(store.article_count(), 1);
}

#[tokio::test]
async fn snapshot_store_serves_published_cycles() {
    let store = Arc::new(MemoryStore::with_plants(wind_fleet()));
    let ctx = JobContext::new(store.clone());
    run_classify_fleet(&ctx, 3).await.unwrap();

    let snapshot = SnapshotStore::new();
    let count = snapshot.refresh_from(store.as_ref()).await.unwrap();
    let current = snapshot.current().await;

    assert_eq!(count, 3);
    assert_eq!(current.summary.total, 3);
    assert_eq!(current.plant("B").unwrap().display_state, DisplayState::Curtailed);
    assert!(current.published_at.is_some());
}

#[tokio::test]
async fn fake_news_attaches_query_hint() {
    let mut by_plant = HashMap::new();
    by_plant.insert("100".to_string(), vec![article("Quiet week", "", 1)]);
    let news = FakeNews {
        by_plant,
        ..FakeNews::default()
    };

    let fetched = news.fetch("\"Prairie Winds Farm\" wind", Some("100")).await.unwrap();

    assert_eq!(fetched[0].plant_code.as_deref(), Some("100"));
}
