//! Windowed news risk aggregation
//!
//! Ratings are recomputed wholesale from the trailing-year corpus on each run.

use crate::models::news::{NewsArticle, Sentiment, TopicTag};
use crate::models::risk::{PlantRiskRating, WindowCounts};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

pub const WINDOW_SHORT_DAYS: i64 = 30;
pub const WINDOW_MEDIUM_DAYS: i64 = 90;
pub const WINDOW_LONG_DAYS: i64 = 365;
pub const MAX_TOP_ARTICLES: usize = 5;
pub const MAX_RISK_SCORE: f64 = 100.0;

/// Score weights, heaviest on recent outages
pub struct RiskWeights;

impl RiskWeights {
    pub const OUTAGE_30: f64 = 12.0;
    pub const NEGATIVE_30: f64 = 4.0;
    pub const OUTAGE_90: f64 = 4.0;
    pub const NEGATIVE_90: f64 = 1.5;
    pub const OUTAGE_365: f64 = 1.0;
    pub const NEGATIVE_365: f64 = 0.5;
}

/// Composite score, rounded to two decimals and capped at 100
pub fn risk_score(w30: &WindowCounts, w90: &WindowCounts, w365: &WindowCounts) -> f64 {
    let raw = f64::from(w30.outage_topic_count) * RiskWeights::OUTAGE_30
        + f64::from(w30.negative_count) * RiskWeights::NEGATIVE_30
        + f64::from(w90.outage_topic_count) * RiskWeights::OUTAGE_90
        + f64::from(w90.negative_count) * RiskWeights::NEGATIVE_90
        + f64::from(w365.outage_topic_count) * RiskWeights::OUTAGE_365
        + f64::from(w365.negative_count) * RiskWeights::NEGATIVE_365;
    let rounded = (raw * 100.0).round() / 100.0;
    rounded.min(MAX_RISK_SCORE)
}

#[derive(Default)]
struct PlantAccumulator {
    w30: WindowCounts,
    w90: WindowCounts,
    w365: WindowCounts,
    impactful: Vec<(DateTime<Utc>, String)>,
}

fn bump(window: &mut WindowCounts, negative: bool, outage: bool) {
    window.article_count += 1;
    if negative {
        window.negative_count += 1;
    }
    if outage {
        window.outage_topic_count += 1;
    }
}

pub struct RiskAggregator;

impl RiskAggregator {
    /// One rating per plant code that appears in any article's match set
    ///
    /// Articles older than the long window contribute nothing beyond the
    /// rating's existence. Articles dated after `now` count as age zero.
    pub fn aggregate(articles: &[NewsArticle], now: DateTime<Utc>) -> Vec<PlantRiskRating> {
        let mut plants: BTreeMap<&str, PlantAccumulator> = BTreeMap::new();

        for article in articles {
            let age = (now - article.published_at).max(Duration::zero());
            let negative = article.sentiment == Sentiment::Negative;
            let outage = article.topics.contains(&TopicTag::Outage);

            for code in &article.matched_plant_codes {
                let acc = plants.entry(code.as_str()).or_default();
                if age > Duration::days(WINDOW_LONG_DAYS) {
                    continue;
                }
                bump(&mut acc.w365, negative, outage);
                if age <= Duration::days(WINDOW_MEDIUM_DAYS) {
                    bump(&mut acc.w90, negative, outage);
                }
                if age <= Duration::days(WINDOW_SHORT_DAYS) {
                    bump(&mut acc.w30, negative, outage);
                }
                if article.is_impactful() {
                    acc.impactful.push((article.published_at, article.id.clone()));
                }
            }
        }

        plants
            .into_iter()
            .map(|(code, mut acc)| {
                acc.impactful
                    .sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
                acc.impactful.dedup_by(|a, b| a.1 == b.1);
                let top_article_ids = acc
                    .impactful
                    .into_iter()
                    .take(MAX_TOP_ARTICLES)
                    .map(|(_, id)| id)
                    .collect();
                PlantRiskRating {
                    plant_code: code.to_string(),
                    risk_score: risk_score(&acc.w30, &acc.w90, &acc.w365),
                    window_30d: acc.w30,
                    window_90d: acc.w90,
                    window_365d: acc.w365,
                    top_article_ids,
                }
            })
            .collect()
    }
}
