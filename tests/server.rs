//! HTTP API tests: a served dataset read back through `RemoteSource`.

use std::sync::Arc;
use std::time::Duration;

use pulseboard::config::parse_config;
use pulseboard::remote::RemoteSource;
use pulseboard::server::build_router;
use pulseboard_core::aggregate::aggregate;
use pulseboard_core::filter::{FilterField, FilterSet};
use pulseboard_core::models::{AggregateKind, Record};
use pulseboard_core::source::{AggregateSource, ResilientSource, StaticFallbackSource};

fn record(topic: &str, sector: &str, country: &str, end_year: Option<i32>, intensity: f64) -> Record {
    Record {
        topic: topic.to_string(),
        sector: sector.to_string(),
        country: country.to_string(),
        region: "World".to_string(),
        end_year,
        intensity: Some(intensity),
        likelihood: Some(3.0),
        relevance: Some(2.0),
        ..Default::default()
    }
}

fn records() -> Arc<Vec<Record>> {
    Arc::new(vec![
        record("oil", "Energy", "United States", Some(2027), 6.0),
        record("oil", "Energy", "Saudi Arabia", None, 12.0),
        record("gas", "Energy", "Russia", Some(2030), 6.0),
        record("market", "Retail", "India", Some(2027), 3.0),
    ])
}

/// Serve `records` on an ephemeral port; returns the API base URL.
async fn spawn_server(records: Arc<Vec<Record>>) -> String {
    let config = parse_config("[source]\nmode = \"static\"\n").unwrap();
    let app = build_router(records, &config);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_remote_source_matches_local_aggregation() {
    let data = records();
    let base = spawn_server(data.clone()).await;
    let remote = RemoteSource::new(&format!("{}/api", base), Duration::from_secs(5)).unwrap();

    let filters = FilterSet::new().with(FilterField::Sector, "Energy");
    for kind in AggregateKind::ALL {
        let fetched = remote.fetch(kind, &filters).await.unwrap();
        assert_eq!(fetched, aggregate(&data, &filters, kind), "{} differs", kind);
    }
}

#[tokio::test]
async fn test_etag_and_not_modified() {
    let base = spawn_server(records()).await;
    let client = reqwest::Client::new();
    let url = format!("{}/api/topic-distribution?topic=oil", base);

    let first = client.get(&url).send().await.unwrap();
    assert_eq!(first.status(), 200);
    let etag = first
        .headers()
        .get("etag")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let body: serde_json::Value = first.json().await.unwrap();
    assert_eq!(body, serde_json::json!([{ "name": "oil", "value": 2 }]));

    let second = client
        .get(&url)
        .header("If-None-Match", &etag)
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), 304);

    // A different filter set has a different tag.
    let other = client
        .get(format!("{}/api/topic-distribution?topic=gas", base))
        .header("If-None-Match", &etag)
        .send()
        .await
        .unwrap();
    assert_eq!(other.status(), 200);
}

#[tokio::test]
async fn test_etag_changes_with_served_dataset() {
    let client = reqwest::Client::new();

    let before = spawn_server(Arc::new(vec![record("oil", "Energy", "India", Some(2027), 6.0)])).await;
    let first = client
        .get(format!("{}/api/topic-distribution", before))
        .send()
        .await
        .unwrap();
    let etag = first.headers()["etag"].to_str().unwrap().to_string();

    // Same filters, edited data: the old tag must not validate.
    let after = spawn_server(Arc::new(vec![
        record("gas", "Energy", "India", Some(2027), 6.0),
        record("gas", "Energy", "India", Some(2027), 6.0),
    ]))
    .await;
    let resp = client
        .get(format!("{}/api/topic-distribution", after))
        .header("If-None-Match", &etag)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_ne!(resp.headers()["etag"].to_str().unwrap(), etag);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, serde_json::json!([{ "name": "gas", "value": 2 }]));
}

#[tokio::test]
async fn test_unknown_endpoint_is_not_found() {
    let base = spawn_server(records()).await;
    let resp = reqwest::get(format!("{}/api/pestle-distribution", base))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_stats_options_and_records() {
    let base = spawn_server(records()).await;

    let stats: serde_json::Value = reqwest::get(format!("{}/api/dashboard-stats?end_year=2027", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["totalRecords"], 2);

    let options: serde_json::Value = reqwest::get(format!("{}/api/filter-options", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(options["sector"], serde_json::json!(["Energy", "Retail"]));

    let rows: serde_json::Value = reqwest::get(format!("{}/api/filter?country=India", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["topic"], "market");
}

#[tokio::test]
async fn test_chart_endpoint_serves_svg() {
    let base = spawn_server(records()).await;
    let resp = reqwest::get(format!("{}/charts/sector.svg?topic=oil", base))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "image/svg+xml"
    );
    let svg = resp.text().await.unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Energy"));
}

#[tokio::test]
async fn test_resilient_source_falls_back_when_server_is_gone() {
    // Bind then drop a listener to get a port nothing is serving on.
    let dead = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let remote = RemoteSource::new(&format!("http://{}/api", dead), Duration::from_secs(2)).unwrap();
    let source = ResilientSource::new(Arc::new(remote), Arc::new(StaticFallbackSource::new()));
    assert_eq!(source.name(), "remote+static");

    let entries = source
        .fetch(AggregateKind::Country, &FilterSet::new())
        .await
        .unwrap();
    assert_eq!(entries.len(), 10);
    assert_eq!(entries[0].label(), "United States");
}
