//! PostgreSQL storage for plants, statuses, articles and risk ratings

use crate::models::generation::{FuelType, Plant, PlantRow, SampleRow};
use crate::models::news::{NewsArticle, Sentiment, TopicTag};
use crate::models::risk::{PlantRiskRating, WindowCounts};
use crate::models::status::{ClassifiedPlant, DisplayState, PlantStatus};
use crate::services::store::{validate_rows, CycleKind, PlantStore, StoreError};
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_postgres::{Client, NoTls, Row};
use tracing::{debug, warn};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS plants (
        code TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        owner TEXT NOT NULL,
        state TEXT,
        region TEXT NOT NULL,
        subregion TEXT,
        fuel TEXT NOT NULL,
        nameplate_mw DOUBLE PRECISION
    )",
    "CREATE TABLE IF NOT EXISTS generation (
        plant_code TEXT NOT NULL REFERENCES plants(code),
        month TEXT NOT NULL,
        energy_mwh DOUBLE PRECISION,
        PRIMARY KEY (plant_code, month)
    )",
    "CREATE TABLE IF NOT EXISTS plant_status (
        cycle_id BIGINT NOT NULL,
        plant_code TEXT NOT NULL,
        name TEXT NOT NULL,
        owner TEXT NOT NULL,
        state TEXT,
        region TEXT NOT NULL,
        subregion TEXT,
        fuel TEXT NOT NULL,
        nameplate_mw DOUBLE PRECISION NOT NULL,
        display_state TEXT NOT NULL,
        ttm_average DOUBLE PRECISION NOT NULL,
        is_likely_curtailed BOOLEAN NOT NULL,
        curtailment_score SMALLINT NOT NULL,
        has_no_recent_data BOOLEAN NOT NULL,
        is_maintenance_offline BOOLEAN NOT NULL,
        trailing_zero_run_length INTEGER NOT NULL,
        PRIMARY KEY (cycle_id, plant_code)
    )",
    "CREATE TABLE IF NOT EXISTS news_articles (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        url TEXT NOT NULL,
        published_at TIMESTAMPTZ NOT NULL,
        matched_plant_codes TEXT[] NOT NULL,
        topics TEXT[] NOT NULL,
        sentiment TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS news_articles_published_at ON news_articles (published_at)",
    "CREATE TABLE IF NOT EXISTS plant_risk (
        cycle_id BIGINT NOT NULL,
        plant_code TEXT NOT NULL,
        articles_30d INTEGER NOT NULL,
        negative_30d INTEGER NOT NULL,
        outage_30d INTEGER NOT NULL,
        articles_90d INTEGER NOT NULL,
        negative_90d INTEGER NOT NULL,
        outage_90d INTEGER NOT NULL,
        articles_365d INTEGER NOT NULL,
        negative_365d INTEGER NOT NULL,
        outage_365d INTEGER NOT NULL,
        risk_score DOUBLE PRECISION NOT NULL,
        top_article_ids TEXT[] NOT NULL,
        PRIMARY KEY (cycle_id, plant_code)
    )",
    "CREATE TABLE IF NOT EXISTS published_cycles (
        kind TEXT PRIMARY KEY,
        cycle_id BIGINT NOT NULL,
        published_at TIMESTAMPTZ NOT NULL
    )",
];

fn db_error(context: &str, e: impl std::fmt::Display) -> StoreError {
    Box::new(std::io::Error::other(format!("{}: {}", context, e)))
}

pub struct PostgresStore {
    client: Arc<RwLock<Client>>,
}

impl PostgresStore {
    /// Connect with exponential backoff and make sure the schema exists
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let (client, connection) = (|| async { tokio_postgres::connect(database_url, NoTls).await })
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(Duration::from_millis(500))
                    .with_max_times(5),
            )
            .notify(|err: &tokio_postgres::Error, delay: Duration| {
                warn!(error = %err, delay_ms = delay.as_millis() as u64, "Postgres connect failed, retrying");
            })
            .await
            .map_err(|e| {
                Box::new(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    format!("Failed to connect to Postgres: {}", e),
                )) as StoreError
            })?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "Postgres connection error");
            }
        });

        let store = Self {
            client: Arc::new(RwLock::new(client)),
        };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        let client = self.client.read().await;
        for statement in SCHEMA {
            client
                .execute(*statement, &[])
                .await
                .map_err(|e| db_error("Failed to initialize schema", e))?;
        }
        Ok(())
    }

    async fn published_cycle(&self, kind: CycleKind) -> Result<Option<i64>, StoreError> {
        let client = self.client.read().await;
        let row = client
            .query_opt(
                "SELECT cycle_id FROM published_cycles WHERE kind = $1",
                &[&kind.as_str()],
            )
            .await
            .map_err(|e| db_error("Failed to read published cycle", e))?;
        Ok(row.map(|r| r.get(0)))
    }
}

/// Table holding the per-cycle rows for `kind`
fn cycle_table(kind: CycleKind) -> &'static str {
    match kind {
        CycleKind::Status => "plant_status",
        CycleKind::Risk => "plant_risk",
    }
}

fn display_state_from_str(s: &str) -> DisplayState {
    match s {
        "MaintenanceOffline" => DisplayState::MaintenanceOffline,
        "NoRecentData" => DisplayState::NoRecentData,
        "Curtailed" => DisplayState::Curtailed,
        _ => DisplayState::Optimal,
    }
}

fn classified_from_row(row: &Row) -> Result<ClassifiedPlant, StoreError> {
    let fuel: String = row.get("fuel");
    let fuel: FuelType = fuel.parse().map_err(|e| db_error("Bad fuel in plant_status", e))?;
    let display: String = row.get("display_state");
    let score: i16 = row.get("curtailment_score");
    let run: i32 = row.get("trailing_zero_run_length");
    Ok(ClassifiedPlant {
        code: row.get("plant_code"),
        name: row.get("name"),
        owner: row.get("owner"),
        state: row.get("state"),
        region: row.get("region"),
        subregion: row.get("subregion"),
        fuel,
        nameplate_mw: row.get("nameplate_mw"),
        display_state: display_state_from_str(&display),
        status: PlantStatus {
            ttm_average: row.get("ttm_average"),
            is_likely_curtailed: row.get("is_likely_curtailed"),
            curtailment_score: score.clamp(0, 100) as u8,
            has_no_recent_data: row.get("has_no_recent_data"),
            is_maintenance_offline: row.get("is_maintenance_offline"),
            trailing_zero_run_length: run.max(0) as usize,
        },
    })
}

fn window(row: &Row, articles: &str, negative: &str, outage: &str) -> WindowCounts {
    let a: i32 = row.get(articles);
    let n: i32 = row.get(negative);
    let o: i32 = row.get(outage);
    WindowCounts {
        article_count: a.max(0) as u32,
        negative_count: n.max(0) as u32,
        outage_topic_count: o.max(0) as u32,
    }
}

fn article_from_row(row: &Row) -> NewsArticle {
    let codes: Vec<String> = row.get("matched_plant_codes");
    let topics: Vec<String> = row.get("topics");
    let sentiment: String = row.get("sentiment");
    NewsArticle {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        url: row.get("url"),
        published_at: row.get("published_at"),
        matched_plant_codes: codes.into_iter().collect(),
        topics: topics.iter().filter_map(|t| TopicTag::parse(t)).collect(),
        sentiment: Sentiment::parse(&sentiment),
    }
}

#[async_trait]
impl PlantStore for PostgresStore {
    async fn load_plants(&self) -> Result<Vec<Plant>, StoreError> {
        let client = self.client.read().await;
        let plant_rows = client
            .query(
                "SELECT code, name, owner, state, region, subregion, fuel, nameplate_mw FROM plants",
                &[],
            )
            .await
            .map_err(|e| db_error("Failed to query plants", e))?;

        let mut rows: BTreeMap<String, PlantRow> = plant_rows
            .iter()
            .map(|r| {
                let code: String = r.get("code");
                let row = PlantRow {
                    code: code.clone(),
                    name: r.get("name"),
                    owner: r.get("owner"),
                    state: r.get("state"),
                    region: r.get("region"),
                    subregion: r.get("subregion"),
                    fuel: r.get("fuel"),
                    nameplate_mw: r.get("nameplate_mw"),
                    samples: Vec::new(),
                };
                (code, row)
            })
            .collect();

        let sample_rows = client
            .query(
                "SELECT plant_code, month, energy_mwh FROM generation ORDER BY plant_code, month",
                &[],
            )
            .await
            .map_err(|e| db_error("Failed to query generation", e))?;

        for r in &sample_rows {
            let code: String = r.get("plant_code");
            if let Some(plant) = rows.get_mut(&code) {
                plant.samples.push(SampleRow {
                    month: r.get("month"),
                    energy_mwh: r.get("energy_mwh"),
                });
            }
        }

        debug!(
            plants = rows.len(),
            samples = sample_rows.len(),
            "Loaded {} plants with {} samples",
            rows.len(),
            sample_rows.len()
        );
        Ok(validate_rows(rows.into_values().collect()))
    }

    async fn store_statuses(&self, cycle_id: i64, batch: &[ClassifiedPlant]) -> Result<(), StoreError> {
        let mut client = self.client.write().await;
        let tx = client
            .transaction()
            .await
            .map_err(|e| db_error("Failed to open transaction", e))?;
        let stmt = tx
            .prepare(
                "INSERT INTO plant_status (cycle_id, plant_code, name, owner, state, region, subregion, fuel,
                    nameplate_mw, display_state, ttm_average, is_likely_curtailed, curtailment_score,
                    has_no_recent_data, is_maintenance_offline, trailing_zero_run_length)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
                 ON CONFLICT (cycle_id, plant_code) DO UPDATE SET
                    display_state = EXCLUDED.display_state,
                    ttm_average = EXCLUDED.ttm_average,
                    is_likely_curtailed = EXCLUDED.is_likely_curtailed,
                    curtailment_score = EXCLUDED.curtailment_score,
                    has_no_recent_data = EXCLUDED.has_no_recent_data,
                    is_maintenance_offline = EXCLUDED.is_maintenance_offline,
                    trailing_zero_run_length = EXCLUDED.trailing_zero_run_length",
            )
            .await
            .map_err(|e| db_error("Failed to prepare status insert", e))?;

        for plant in batch {
            let score = i16::from(plant.status.curtailment_score);
            let run = plant.status.trailing_zero_run_length as i32;
            tx.execute(
                &stmt,
                &[
                    &cycle_id,
                    &plant.code,
                    &plant.name,
                    &plant.owner,
                    &plant.state,
                    &plant.region,
                    &plant.subregion,
                    &plant.fuel.as_str(),
                    &plant.nameplate_mw,
                    &plant.display_state.as_str(),
                    &plant.status.ttm_average,
                    &plant.status.is_likely_curtailed,
                    &score,
                    &plant.status.has_no_recent_data,
                    &plant.status.is_maintenance_offline,
                    &run,
                ],
            )
            .await
            .map_err(|e| db_error(&format!("Failed to store status for {}", plant.code), e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit status batch", e))
    }

    async fn store_articles(&self, articles: &[NewsArticle]) -> Result<(), StoreError> {
        let mut client = self.client.write().await;
        let tx = client
            .transaction()
            .await
            .map_err(|e| db_error("Failed to open transaction", e))?;
        let stmt = tx
            .prepare(
                "INSERT INTO news_articles (id, title, description, url, published_at, matched_plant_codes, topics, sentiment)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                 ON CONFLICT (id) DO UPDATE SET
                    matched_plant_codes = (
                        SELECT ARRAY(SELECT DISTINCT unnest(news_articles.matched_plant_codes || EXCLUDED.matched_plant_codes))
                    )",
            )
            .await
            .map_err(|e| db_error("Failed to prepare article insert", e))?;

        for article in articles {
            let codes: Vec<String> = article.matched_plant_codes.iter().cloned().collect();
            let topics: Vec<String> = article.topics.iter().map(|t| t.as_str().to_string()).collect();
            tx.execute(
                &stmt,
                &[
                    &article.id,
                    &article.title,
                    &article.description,
                    &article.url,
                    &article.published_at,
                    &codes,
                    &topics,
                    &article.sentiment.as_str(),
                ],
            )
            .await
            .map_err(|e| db_error(&format!("Failed to store article {}", article.id), e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit article batch", e))
    }

    async fn load_articles_since(&self, since: DateTime<Utc>) -> Result<Vec<NewsArticle>, StoreError> {
        let client = self.client.read().await;
        let rows = client
            .query(
                "SELECT id, title, description, url, published_at, matched_plant_codes, topics, sentiment
                 FROM news_articles
                 WHERE published_at >= $1
                 ORDER BY published_at DESC",
                &[&since],
            )
            .await
            .map_err(|e| db_error("Failed to query articles", e))?;
        Ok(rows.iter().map(article_from_row).collect())
    }

    async fn store_ratings(&self, cycle_id: i64, batch: &[PlantRiskRating]) -> Result<(), StoreError> {
        let mut client = self.client.write().await;
        let tx = client
            .transaction()
            .await
            .map_err(|e| db_error("Failed to open transaction", e))?;
        let stmt = tx
            .prepare(
                "INSERT INTO plant_risk (cycle_id, plant_code,
                    articles_30d, negative_30d, outage_30d,
                    articles_90d, negative_90d, outage_90d,
                    articles_365d, negative_365d, outage_365d,
                    risk_score, top_article_ids)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                 ON CONFLICT (cycle_id, plant_code) DO NOTHING",
            )
            .await
            .map_err(|e| db_error("Failed to prepare rating insert", e))?;

        for rating in batch {
            let counts = |w: &WindowCounts| {
                (
                    w.article_count as i32,
                    w.negative_count as i32,
                    w.outage_topic_count as i32,
                )
            };
            let (a30, n30, o30) = counts(&rating.window_30d);
            let (a90, n90, o90) = counts(&rating.window_90d);
            let (a365, n365, o365) = counts(&rating.window_365d);
            tx.execute(
                &stmt,
                &[
                    &cycle_id,
                    &rating.plant_code,
                    &a30,
                    &n30,
                    &o30,
                    &a90,
                    &n90,
                    &o90,
                    &a365,
                    &n365,
                    &o365,
                    &rating.risk_score,
                    &rating.top_article_ids,
                ],
            )
            .await
            .map_err(|e| db_error(&format!("Failed to store rating for {}", rating.plant_code), e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit rating batch", e))
    }

    async fn publish(&self, kind: CycleKind, cycle_id: i64) -> Result<(), StoreError> {
        let mut client = self.client.write().await;
        let tx = client
            .transaction()
            .await
            .map_err(|e| db_error("Failed to open transaction", e))?;
        tx.execute(
            "INSERT INTO published_cycles (kind, cycle_id, published_at) VALUES ($1, $2, $3)
             ON CONFLICT (kind) DO UPDATE SET cycle_id = EXCLUDED.cycle_id, published_at = EXCLUDED.published_at",
            &[&kind.as_str(), &cycle_id, &Utc::now()],
        )
        .await
        .map_err(|e| db_error("Failed to publish cycle", e))?;

        let pruned = tx
            .execute(
                &format!("DELETE FROM {} WHERE cycle_id < $1", cycle_table(kind)),
                &[&cycle_id],
            )
            .await
            .map_err(|e| db_error("Failed to prune superseded cycles", e))?;
        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit publish", e))?;

        debug!(
            kind = kind.as_str(),
            cycle_id = cycle_id,
            pruned = pruned,
            "Published {} cycle {}, pruned {} superseded rows",
            kind.as_str(),
            cycle_id,
            pruned
        );
        Ok(())
    }

    async fn load_published_statuses(&self) -> Result<Vec<ClassifiedPlant>, StoreError> {
        let Some(cycle_id) = self.published_cycle(CycleKind::Status).await? else {
            return Ok(Vec::new());
        };
        let client = self.client.read().await;
        let rows = client
            .query(
                "SELECT * FROM plant_status WHERE cycle_id = $1 ORDER BY plant_code",
                &[&cycle_id],
            )
            .await
            .map_err(|e| db_error("Failed to query statuses", e))?;
        rows.iter().map(classified_from_row).collect()
    }

    async fn load_published_ratings(&self) -> Result<Vec<PlantRiskRating>, StoreError> {
        let Some(cycle_id) = self.published_cycle(CycleKind::Risk).await? else {
            return Ok(Vec::new());
        };
        let client = self.client.read().await;
        let rows = client
            .query(
                "SELECT * FROM plant_risk WHERE cycle_id = $1 ORDER BY risk_score DESC, plant_code",
                &[&cycle_id],
            )
            .await
            .map_err(|e| db_error("Failed to query ratings", e))?;
        Ok(rows
            .iter()
            .map(|row| PlantRiskRating {
                plant_code: row.get("plant_code"),
                window_30d: window(row, "articles_30d", "negative_30d", "outage_30d"),
                window_90d: window(row, "articles_90d", "negative_90d", "outage_90d"),
                window_365d: window(row, "articles_365d", "negative_365d", "outage_365d"),
                risk_score: row.get("risk_score"),
                top_article_ids: row.get("top_article_ids"),
            })
            .collect())
    }
}
