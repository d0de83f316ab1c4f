//! News collaborator against a mocked NewsAPI endpoint

use crate::fixtures::named_plant;
use plantwatch::cache::MemoryArticleCache;
use plantwatch::services::news::{plant_query, CachedNewsSource, NewsApiClient, NewsSource};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn everything_body() -> serde_json::Value {
    json!({
        "status": "ok",
        "totalResults": 3,
        "articles": [
            {
                "source": {"id": null, "name": "Grid Weekly"},
                "title": "Sandstone Wind returns after outage",
                "description": "Turbines back online",
                "content": null,
                "url": "https://gridweekly.example.com/sandstone",
                "publishedAt": "2025-05-20T08:30:00Z"
            },
            {
                "title": null,
                "description": "Untitled wire copy",
                "url": "https://wire.example.com/1",
                "publishedAt": "2025-05-21T08:30:00Z"
            },
            {
                "title": "Undated piece",
                "url": "https://wire.example.com/2",
                "publishedAt": null
            }
        ]
    })
}

#[tokio::test]
async fn client_maps_articles_and_drops_incomplete_ones() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("q", "\"Sandstone Wind\" wind farm"))
        .and(query_param("apiKey", "test-key"))
        .and(query_param("sortBy", "publishedAt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(everything_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = NewsApiClient::new(server.uri(), "test-key");
    let plant = named_plant("300", "Sandstone Wind", "Orsted Onshore", "TX");

    let articles = client
        .fetch(&plant_query(&plant), Some("300"))
        .await
        .expect("fetch should succeed");

    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].title, "Sandstone Wind returns after outage");
    assert_eq!(articles[0].plant_code.as_deref(), Some("300"));
    assert!(articles[0].content.is_none());
}

#[tokio::test]
async fn client_reports_upstream_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = NewsApiClient::new(server.uri(), "test-key");

    let result = client.fetch("solar curtailment", None).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn cached_source_fetches_each_plant_once_within_ttl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_json(everything_body()))
        .expect(1)
        .mount(&server)
        .await;

    let inner: Arc<dyn NewsSource> = Arc::new(NewsApiClient::new(server.uri(), "test-key"));
    let cache = Arc::new(MemoryArticleCache::new(Duration::from_secs(3600)));
    let source = CachedNewsSource::new(inner, cache);

    let first = source.fetch("\"Sandstone Wind\" wind farm", Some("300")).await.unwrap();
    let second = source.fetch("\"Sandstone Wind\" wind farm", Some("300")).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn untargeted_queries_bypass_the_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_json(everything_body()))
        .expect(2)
        .mount(&server)
        .await;

    let inner: Arc<dyn NewsSource> = Arc::new(NewsApiClient::new(server.uri(), "test-key"));
    let cache = Arc::new(MemoryArticleCache::new(Duration::from_secs(3600)));
    let source = CachedNewsSource::new(inner, cache);

    source.fetch("wind curtailment", None).await.unwrap();
    source.fetch("wind curtailment", None).await.unwrap();
}

#[tokio::test]
async fn expired_entries_are_refetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_json(everything_body()))
        .expect(2)
        .mount(&server)
        .await;

    let inner: Arc<dyn NewsSource> = Arc::new(NewsApiClient::new(server.uri(), "test-key"));
    let cache = Arc::new(MemoryArticleCache::new(Duration::ZERO));
    let source = CachedNewsSource::new(inner, cache);

    source.fetch("q", Some("300")).await.unwrap();
    source.fetch("q", Some("300")).await.unwrap();
}
