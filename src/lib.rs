//! Capacity-factor anomaly classification and news risk aggregation for US
//! wind, solar and nuclear plants.

pub mod cache;
pub mod capacity;
pub mod config;
pub mod core;
pub mod db;
pub mod jobs;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod news;
pub mod pipeline;
pub mod services;
