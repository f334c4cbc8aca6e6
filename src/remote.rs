//! HTTP-backed [`AggregateSource`].
//!
//! Issues `GET {base_url}/{endpoint}?{filters}` and decodes the wire shape
//! for the requested kind. Transport errors, timeouts, non-2xx statuses
//! and malformed bodies are all errors; composing this source inside a
//! [`ResilientSource`](pulseboard_core::source::ResilientSource) turns them
//! into fallback data.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use pulseboard_core::filter::FilterSet;
use pulseboard_core::models::{AggregateEntry, AggregateKind};
use pulseboard_core::source::AggregateSource;
use pulseboard_core::wire;

/// Remote aggregate source speaking the dashboard wire format.
pub struct RemoteSource {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL for `kind`, without the query string.
    pub fn url_for(&self, kind: AggregateKind) -> String {
        format!("{}/{}", self.base_url, kind.endpoint())
    }
}

#[async_trait]
impl AggregateSource for RemoteSource {
    fn name(&self) -> &str {
        "remote"
    }

    async fn fetch(
        &self,
        kind: AggregateKind,
        filters: &FilterSet,
    ) -> Result<Vec<AggregateEntry>> {
        let url = self.url_for(kind);
        tracing::debug!(%url, filters = ?filters.to_query_pairs(), "fetching aggregate");

        let resp = self
            .client
            .get(&url)
            .query(&filters.to_query_pairs())
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("{} returned {}: {}", url, status, body);
        }

        let payload: serde_json::Value = resp
            .json()
            .await
            .with_context(|| format!("{} returned a non-JSON body", url))?;
        wire::decode(kind, payload)
    }
}
