//! Environment-driven configuration
//!
//! Values come from the process environment (a `.env` file is loaded by the
//! binaries through dotenvy). Unparseable numbers fall back to defaults.

use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "host=localhost user=postgres dbname=plantwatch";
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/";
pub const DEFAULT_NEWS_API_URL: &str = "https://newsapi.org";
/// Nightly at 03:00 UTC (sec min hour day month weekday)
pub const DEFAULT_REFRESH_CRON: &str = "0 0 3 * * *";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PERSIST_BATCH_SIZE: usize = 100;
pub const DEFAULT_NEWS_CACHE_TTL_SECONDS: u64 = 6 * 60 * 60;
pub const DEFAULT_NEWS_FETCH_CONCURRENCY: usize = 4;
pub const DEFAULT_SNAPSHOT_REFRESH_SECONDS: u64 = 300;

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

pub fn get_environment() -> String {
    var_or("APP_ENV", "sandbox").to_lowercase()
}

pub fn get_database_url() -> String {
    var_or("DATABASE_URL", DEFAULT_DATABASE_URL)
}

pub fn get_redis_url() -> String {
    var_or("REDIS_URL", DEFAULT_REDIS_URL)
}

pub fn get_port() -> u16 {
    parse_or("PORT", DEFAULT_PORT)
}

/// Settings for the news-fetch collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct NewsConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub cache_ttl: Duration,
    pub fetch_concurrency: usize,
}

impl NewsConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: var_or("NEWS_API_URL", DEFAULT_NEWS_API_URL),
            api_key: env::var("NEWS_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            cache_ttl: Duration::from_secs(parse_or(
                "NEWS_CACHE_TTL_SECONDS",
                DEFAULT_NEWS_CACHE_TTL_SECONDS,
            )),
            fetch_concurrency: parse_or("NEWS_FETCH_CONCURRENCY", DEFAULT_NEWS_FETCH_CONCURRENCY)
                .max(1),
        }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_NEWS_API_URL.to_string(),
            api_key: None,
            cache_ttl: Duration::from_secs(DEFAULT_NEWS_CACHE_TTL_SECONDS),
            fetch_concurrency: DEFAULT_NEWS_FETCH_CONCURRENCY,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    pub database_url: String,
    pub redis_url: String,
    pub refresh_cron: String,
    pub persist_batch_size: usize,
    pub news: NewsConfig,
}

impl WorkerConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: get_database_url(),
            redis_url: get_redis_url(),
            refresh_cron: var_or("REFRESH_CRON", DEFAULT_REFRESH_CRON),
            persist_batch_size: parse_or("PERSIST_BATCH_SIZE", DEFAULT_PERSIST_BATCH_SIZE).max(1),
            news: NewsConfig::from_env(),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            refresh_cron: DEFAULT_REFRESH_CRON.to_string(),
            persist_batch_size: DEFAULT_PERSIST_BATCH_SIZE,
            news: NewsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub port: u16,
    pub database_url: String,
    pub snapshot_refresh: Duration,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self {
            port: get_port(),
            database_url: get_database_url(),
            snapshot_refresh: Duration::from_secs(
                parse_or("SNAPSHOT_REFRESH_SECONDS", DEFAULT_SNAPSHOT_REFRESH_SECONDS).max(1),
            ),
        }
    }
}
