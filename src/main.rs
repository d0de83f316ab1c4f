//! One-shot run over a JSON snapshot file
//!
//! Usage: plantwatch <snapshot.json> [--now <RFC3339>]

use chrono::{DateTime, Utc};
use plantwatch::logging;
use plantwatch::models::status::FleetSummary;
use plantwatch::news::{PlantDirectory, RiskAggregator};
use plantwatch::pipeline::{classify_fleet, tag_articles};
use plantwatch::services::snapshot_file::SnapshotFile;
use serde_json::json;
use std::env;
use tracing::info;

fn parse_args(args: &[String]) -> Result<(String, DateTime<Utc>), Box<dyn std::error::Error>> {
    let mut path = None;
    let mut now = Utc::now();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--now" {
            let raw = iter.next().ok_or("--now needs an RFC3339 timestamp")?;
            now = DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc);
        } else if path.is_none() {
            path = Some(arg.clone());
        } else {
            return Err(format!("Unexpected argument '{}'", arg).into());
        }
    }
    let path = path.ok_or("Usage: plantwatch <snapshot.json> [--now <RFC3339>]")?;
    Ok((path, now))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_cli_logging();

    let args: Vec<String> = env::args().skip(1).collect();
    let (path, now) = parse_args(&args)?;

    let snapshot = SnapshotFile::read(&path)?.into_validated();
    info!(
        plants = snapshot.plants.len(),
        articles = snapshot.articles.len(),
        "Loaded snapshot {}",
        path
    );

    let statuses = classify_fleet(&snapshot.plants);
    let directory = PlantDirectory::from_plants(&snapshot.plants);
    let articles = tag_articles(snapshot.articles, &directory);
    let ratings = RiskAggregator::aggregate(&articles, now);

    let output = json!({
        "generatedAt": now,
        "summary": FleetSummary::from_plants(&statuses),
        "plants": statuses,
        "articles": articles,
        "ratings": ratings,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
