//! HTTP endpoint server using Axum

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

use crate::config::ApiConfig;
use crate::core::snapshot::SnapshotStore;
use crate::db::PostgresStore;
use crate::metrics::Metrics;
use crate::models::generation::FuelType;
use crate::models::risk::PlantRiskRating;
use crate::models::status::{ClassifiedPlant, FleetSummary};
use crate::services::store::PlantStore;

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub snapshot: Arc<SnapshotStore>,
}

impl AppState {
    pub fn new(metrics: Arc<Metrics>, snapshot: Arc<SnapshotStore>) -> Self {
        Self {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics,
            start_time: Arc::new(Instant::now()),
            snapshot,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": "plantwatch-api"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

#[derive(Debug, Default, Deserialize)]
pub struct PlantQuery {
    pub region: Option<String>,
    pub fuel: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RiskQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlantDetail<'a> {
    plant: &'a ClassifiedPlant,
    risk: Option<&'a PlantRiskRating>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResponse<'a> {
    #[serde(flatten)]
    summary: &'a FleetSummary,
    published_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Published statuses, optionally filtered by region, fuel and state
async fn list_plants(
    State(state): State<AppState>,
    Query(params): Query<PlantQuery>,
) -> Result<Json<Value>, StatusCode> {
    let fuel = match params.fuel.as_deref() {
        Some(raw) => Some(raw.parse::<FuelType>().map_err(|_| StatusCode::BAD_REQUEST)?),
        None => None,
    };
    let snapshot = state.snapshot.current().await;

    let plants: Vec<&ClassifiedPlant> = snapshot
        .plants
        .iter()
        .filter(|p| {
            params
                .region
                .as_deref()
                .map_or(true, |r| p.region.eq_ignore_ascii_case(r))
        })
        .filter(|p| fuel.map_or(true, |f| p.fuel == f))
        .filter(|p| {
            params.state.as_deref().map_or(true, |s| {
                p.state
                    .as_deref()
                    .is_some_and(|ps| ps.eq_ignore_ascii_case(s))
            })
        })
        .collect();

    Ok(Json(json!(plants)))
}

/// Status and risk rating for one plant
async fn get_plant(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let snapshot = state.snapshot.current().await;
    let plant = snapshot.plant(&code).ok_or(StatusCode::NOT_FOUND)?;
    let detail = PlantDetail {
        plant,
        risk: snapshot.rating(&code),
    };
    Ok(Json(json!(detail)))
}

/// Ratings, highest risk first
async fn list_risk(
    State(state): State<AppState>,
    Query(params): Query<RiskQuery>,
) -> Result<Json<Value>, StatusCode> {
    let snapshot = state.snapshot.current().await;
    let limit = params.limit.unwrap_or(snapshot.ratings.len());
    let ratings: Vec<&PlantRiskRating> = snapshot.ratings.iter().take(limit).collect();
    Ok(Json(json!(ratings)))
}

async fn fleet_summary(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let snapshot = state.snapshot.current().await;
    let response = SummaryResponse {
        summary: &snapshot.summary,
        published_at: snapshot.published_at,
    };
    Ok(Json(json!(response)))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/plants", get(list_plants))
        .route("/api/plants/{code}", get(get_plant))
        .route("/api/risk", get(list_risk))
        .route("/api/summary", get(fleet_summary))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(config: &ApiConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let metrics = Arc::new(Metrics::new()?);
    let snapshot = Arc::new(SnapshotStore::new());

    // The API still serves /health and an empty snapshot without a database
    match PostgresStore::connect(&config.database_url).await {
        Ok(db) => {
            info!("Postgres connected for API server");
            metrics.database_connected.set(1.0);
            let store: Arc<dyn PlantStore> = Arc::new(db);
            if let Err(e) = snapshot.refresh_from(store.as_ref()).await {
                warn!(error = %e, "Initial snapshot load failed");
            }
            snapshot.log_state().await;
            snapshot
                .clone()
                .spawn_refresh(store, config.snapshot_refresh);
        }
        Err(e) => {
            metrics.database_connected.set(0.0);
            warn!(error = %e, "Failed to connect to Postgres for API server - serving empty snapshot");
        }
    }

    let state = AppState::new(metrics, snapshot);
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    info!(port = config.port, "HTTP server listening on port {}", config.port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        config.port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
