//! Aggregate data sources.
//!
//! The [`AggregateSource`] trait is the boundary between the dashboard and
//! wherever aggregates come from. Strategies in this crate are I/O-free:
//!
//! | Strategy | Behaviour |
//! |----------|-----------|
//! | [`LocalSource`] | Aggregates an in-memory record set, cached per filter set |
//! | [`StaticFallbackSource`] | Fixed demo dataset with simulated filter damping |
//! | [`ResilientSource`] | Primary first, fallback on any error |
//!
//! The HTTP-backed source lives in the `pulseboard` crate.
//!
//! Implementations must be `Send + Sync` so the controller can fan out
//! fetches concurrently.

pub mod fallback;
pub mod local;
pub mod resilient;

pub use fallback::StaticFallbackSource;
pub use local::{LocalSource, DEFAULT_CACHE_CAPACITY};
pub use resilient::ResilientSource;

use anyhow::Result;
use async_trait::async_trait;

use crate::filter::FilterSet;
use crate::models::{AggregateEntry, AggregateKind};

/// Something that can answer "aggregate kind K under filters F".
#[async_trait]
pub trait AggregateSource: Send + Sync {
    /// Short name used in logs and the `sources` listing.
    fn name(&self) -> &str;

    /// Fetch the aggregate sequence for `kind` under `filters`.
    async fn fetch(&self, kind: AggregateKind, filters: &FilterSet)
        -> Result<Vec<AggregateEntry>>;
}
