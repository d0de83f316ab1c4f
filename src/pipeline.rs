//! Batch orchestration around the pure engines

use crate::capacity::{analyze_plant, RegionalPeerTable};
use crate::models::generation::Plant;
use crate::models::news::{NewsArticle, RawArticle};
use crate::models::status::ClassifiedPlant;
use crate::news::{ArticleClassifier, PlantDirectory};
use crate::services::news::{plant_query, NewsSource};
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Classify every plant against peers built from the whole population
pub fn classify_fleet(plants: &[Plant]) -> Vec<ClassifiedPlant> {
    // Peers must see the full population before any single plant is classified
    let peers = RegionalPeerTable::build(plants);

    plants
        .iter()
        .map(|plant| {
            let analysis = analyze_plant(plant, &peers);
            let display_state = analysis.status.display_state();
            debug!(
                plant_code = %plant.code,
                fuel = plant.fuel.as_str(),
                state = display_state.as_str(),
                score = analysis.status.curtailment_score,
                benchmark = ?analysis.benchmark,
                active_months = analysis.active_months,
                "Classified {} as {}",
                plant.code,
                display_state.as_str()
            );
            ClassifiedPlant {
                code: plant.code.clone(),
                name: plant.name.clone(),
                owner: plant.owner.clone(),
                state: plant.state.clone(),
                region: plant.region.clone(),
                subregion: plant.subregion.clone(),
                fuel: plant.fuel,
                nameplate_mw: plant.nameplate_mw,
                display_state,
                status: analysis.status,
            }
        })
        .collect()
}

/// Match and classify raw articles, merging duplicates of the same story
///
/// Output order follows first appearance in `raw`.
pub fn tag_articles(raw: Vec<RawArticle>, directory: &PlantDirectory) -> Vec<NewsArticle> {
    let mut tagged: Vec<NewsArticle> = Vec::with_capacity(raw.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for article in &raw {
        let classified = ArticleClassifier::classify(article, directory);
        match index.get(&classified.id) {
            Some(&pos) => {
                tagged[pos]
                    .matched_plant_codes
                    .extend(classified.matched_plant_codes);
            }
            None => {
                if classified.matched_plant_codes.is_empty() {
                    debug!(article_id = %classified.id, "Article matched no plants");
                }
                index.insert(classified.id.clone(), tagged.len());
                tagged.push(classified);
            }
        }
    }

    if tagged.len() < raw.len() {
        debug!(
            fetched = raw.len(),
            unique = tagged.len(),
            "Merged {} duplicate articles",
            raw.len() - tagged.len()
        );
    }
    tagged
}

/// Outcome of a chunked persistence run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub batches_ok: usize,
    pub batches_failed: usize,
    pub rows_written: usize,
    pub rows_failed: usize,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.batches_failed == 0
    }
}

/// Write `items` in chunks of `batch_size`; a failed chunk is logged and skipped
///
/// Each chunk is handed to `writer` by value so the returned future can own it.
pub async fn persist_in_batches<T, F, Fut, E>(
    items: &[T],
    batch_size: usize,
    mut writer: F,
) -> BatchReport
where
    T: Clone,
    F: FnMut(Vec<T>) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    let mut report = BatchReport::default();
    for (batch_index, chunk) in items.chunks(batch_size.max(1)).enumerate() {
        match writer(chunk.to_vec()).await {
            Ok(()) => {
                report.batches_ok += 1;
                report.rows_written += chunk.len();
            }
            Err(e) => {
                error!(
                    batch = batch_index,
                    rows = chunk.len(),
                    error = %e,
                    "Failed to persist batch {} ({} rows), continuing",
                    batch_index,
                    chunk.len()
                );
                report.batches_failed += 1;
                report.rows_failed += chunk.len();
            }
        }
    }
    report
}

/// Run one plant-targeted news query per plant with bounded concurrency
///
/// A failing query is logged and contributes no articles.
pub async fn collect_news(
    plants: &[Plant],
    source: Arc<dyn NewsSource>,
    concurrency: usize,
) -> Vec<RawArticle> {
    let queries: Vec<(String, String)> = plants
        .iter()
        .map(|p| (p.code.clone(), plant_query(p)))
        .collect();

    let results: Vec<Vec<RawArticle>> = stream::iter(queries)
        .map(|(code, query)| {
            let source = source.clone();
            async move {
                match source.fetch(&query, Some(code.as_str())).await {
                    Ok(articles) => articles,
                    Err(e) => {
                        warn!(plant_code = %code, error = %e, "News fetch failed for {}", code);
                        Vec::new()
                    }
                }
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    results.into_iter().flatten().collect()
}
