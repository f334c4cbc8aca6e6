//! In-process [`AggregateSource`] over a loaded record set.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::Result;
use async_trait::async_trait;

use crate::aggregate::aggregate;
use crate::filter::FilterSet;
use crate::models::{AggregateEntry, AggregateKind, Record};

use super::AggregateSource;

type CacheKey = (AggregateKind, String);

/// Memoized aggregates kept by [`LocalSource::new`].
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Aggregates an immutable record set on demand.
///
/// Results are memoized by `(kind, filter fingerprint)`. Records never
/// change after construction, so cached entries never go stale. The
/// cache holds at most `capacity` entries; inserting into a full cache
/// drops everything memoized so far.
pub struct LocalSource {
    records: Arc<Vec<Record>>,
    capacity: usize,
    cache: RwLock<HashMap<CacheKey, Vec<AggregateEntry>>>,
}

impl LocalSource {
    pub fn new(records: Arc<Vec<Record>>) -> Self {
        Self::with_capacity(records, DEFAULT_CACHE_CAPACITY)
    }

    /// A source memoizing at most `capacity` aggregates (0 disables the
    /// cache).
    pub fn with_capacity(records: Arc<Vec<Record>>, capacity: usize) -> Self {
        Self {
            records,
            capacity,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn records(&self) -> &Arc<Vec<Record>> {
        &self.records
    }

    /// Number of memoized aggregates.
    pub fn cached(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Synchronous lookup-or-compute.
    pub fn aggregate(&self, kind: AggregateKind, filters: &FilterSet) -> Vec<AggregateEntry> {
        let key = (kind, filters.fingerprint());
        if let Some(hit) = self
            .cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
        {
            return hit.clone();
        }
        let entries = aggregate(&self.records, filters, kind);
        if self.capacity == 0 {
            return entries;
        }
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        if cache.len() >= self.capacity {
            tracing::debug!(entries = cache.len(), "aggregate cache full, clearing");
            cache.clear();
        }
        cache.insert(key, entries.clone());
        entries
    }
}

#[async_trait]
impl AggregateSource for LocalSource {
    fn name(&self) -> &str {
        "local"
    }

    async fn fetch(
        &self,
        kind: AggregateKind,
        filters: &FilterSet,
    ) -> Result<Vec<AggregateEntry>> {
        Ok(self.aggregate(kind, filters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterField;

    fn records() -> Arc<Vec<Record>> {
        Arc::new(vec![
            Record {
                topic: "oil".into(),
                sector: "Energy".into(),
                ..Default::default()
            },
            Record {
                topic: "gas".into(),
                sector: "Energy".into(),
                ..Default::default()
            },
            Record {
                topic: "oil".into(),
                sector: "Retail".into(),
                ..Default::default()
            },
        ])
    }

    #[tokio::test]
    async fn test_fetch_matches_aggregate() {
        let source = LocalSource::new(records());
        let filters = FilterSet::new().with(FilterField::Sector, "Energy");
        let entries = source.fetch(AggregateKind::Topic, &filters).await.unwrap();
        assert_eq!(
            entries,
            aggregate(source.records(), &filters, AggregateKind::Topic)
        );
    }

    #[tokio::test]
    async fn test_cache_keyed_by_kind_and_filters() {
        let source = LocalSource::new(records());
        let energy = FilterSet::new().with(FilterField::Sector, "Energy");
        source.fetch(AggregateKind::Topic, &energy).await.unwrap();
        source.fetch(AggregateKind::Topic, &energy).await.unwrap();
        assert_eq!(source.cached(), 1);
        source.fetch(AggregateKind::Sector, &energy).await.unwrap();
        source
            .fetch(AggregateKind::Topic, &FilterSet::new())
            .await
            .unwrap();
        assert_eq!(source.cached(), 3);
    }

    #[test]
    fn test_cache_never_exceeds_capacity() {
        let source = LocalSource::with_capacity(records(), 8);
        for i in 0..10_000 {
            let filters = FilterSet::new().with(FilterField::Topic, format!("junk{}", i));
            assert!(source.aggregate(AggregateKind::Topic, &filters).is_empty());
            assert!(source.cached() <= 8);
        }

        let energy = FilterSet::new().with(FilterField::Sector, "Energy");
        assert_eq!(
            source.aggregate(AggregateKind::Topic, &energy),
            aggregate(source.records(), &energy, AggregateKind::Topic)
        );
    }

    #[test]
    fn test_default_capacity_bounds_distinct_queries() {
        let source = LocalSource::new(records());
        for i in 0..(DEFAULT_CACHE_CAPACITY * 3) {
            let filters = FilterSet::new().with(FilterField::Country, format!("c{}", i));
            source.aggregate(AggregateKind::Country, &filters);
        }
        assert!(source.cached() <= DEFAULT_CACHE_CAPACITY);
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let source = LocalSource::with_capacity(records(), 0);
        source.aggregate(AggregateKind::Topic, &FilterSet::new());
        assert_eq!(source.cached(), 0);
    }
}
