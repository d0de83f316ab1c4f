//! Prometheus metrics shared by the API server and the worker

use prometheus::{Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,
    pub plants_classified_total: IntCounter,
    pub classification_cycles_total: IntCounter,
    pub articles_tagged_total: IntCounter,
    pub risk_ratings_total: IntCounter,
    pub persist_batches_failed_total: IntCounter,
    pub cycle_duration_seconds: Histogram,
    pub database_connected: Gauge,
    pub cache_connected: Gauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total HTTP requests served")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_in_flight =
            IntGauge::new("http_requests_in_flight", "HTTP requests currently being served")?;
        let plants_classified_total =
            IntCounter::new("plants_classified_total", "Plants classified across all cycles")?;
        let classification_cycles_total = IntCounter::new(
            "classification_cycles_total",
            "Completed fleet classification cycles",
        )?;
        let articles_tagged_total =
            IntCounter::new("articles_tagged_total", "News articles matched and tagged")?;
        let risk_ratings_total =
            IntCounter::new("risk_ratings_total", "Plant risk ratings computed")?;
        let persist_batches_failed_total = IntCounter::new(
            "persist_batches_failed_total",
            "Persistence batches that failed and were skipped",
        )?;
        let cycle_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("cycle_duration_seconds", "Batch cycle duration in seconds")
                .buckets(vec![0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0, 900.0]),
        )?;
        let database_connected =
            Gauge::new("database_connected", "1 when the database connection is up")?;
        let cache_connected = Gauge::new("cache_connected", "1 when the Redis cache is up")?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(plants_classified_total.clone()))?;
        registry.register(Box::new(classification_cycles_total.clone()))?;
        registry.register(Box::new(articles_tagged_total.clone()))?;
        registry.register(Box::new(risk_ratings_total.clone()))?;
        registry.register(Box::new(persist_batches_failed_total.clone()))?;
        registry.register(Box::new(cycle_duration_seconds.clone()))?;
        registry.register(Box::new(database_connected.clone()))?;
        registry.register(Box::new(cache_connected.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            plants_classified_total,
            classification_cycles_total,
            articles_tagged_total,
            risk_ratings_total,
            persist_batches_failed_total,
            cycle_duration_seconds,
            database_connected,
            cache_connected,
        })
    }

    /// Render all metrics in the Prometheus text format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
