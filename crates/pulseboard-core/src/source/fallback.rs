//! The built-in demo dataset.
//!
//! [`StaticFallbackSource`] serves a fixed set of aggregates so a dashboard
//! stays populated when its real source is unreachable. Filters are not
//! evaluated against records (there are none); instead the counts of
//! non-matching entries are damped so that applying a filter still visibly
//! changes the charts:
//!
//! | Active filter | Applies to | Non-matching entries scaled by |
//! |---------------|------------|--------------------------------|
//! | sector | topic, sector, region | 0.5 |
//! | country | country | 0.6 |
//! | topic | topic | 0.4 |
//! | region | region | 0.3 |
//!
//! Comparison is case-insensitive and scaled counts are floored.

use anyhow::Result;
use async_trait::async_trait;

use crate::filter::{FilterField, FilterSet};
use crate::models::{AggregateEntry, AggregateKind, YearTrend};

use super::AggregateSource;

const TOPICS: &[(&str, u64)] = &[
    ("oil", 25),
    ("gas", 18),
    ("market", 15),
    ("gdp", 12),
    ("war", 10),
    ("production", 8),
    ("export", 7),
    ("consumption", 6),
    ("climate", 5),
    ("economic growth", 4),
];

const INTENSITY: &[u64] = &[5, 12, 18, 24, 16, 11, 7, 4, 2, 1];

const LIKELIHOOD: &[u64] = &[7, 15, 25, 18];

const REGIONS: &[(&str, u64)] = &[
    ("Northern America", 35),
    ("Asia", 30),
    ("Western Europe", 25),
    ("Eastern Europe", 15),
    ("South America", 12),
    ("Africa", 10),
    ("Oceania", 8),
    ("Central America", 5),
    ("World", 10),
];

const SECTORS: &[(&str, u64)] = &[
    ("Energy", 30),
    ("Environment", 25),
    ("Government", 20),
    ("Manufacturing", 15),
    ("Retail", 10),
    ("Financial services", 8),
    ("Healthcare", 7),
];

const COUNTRIES: &[(&str, u64)] = &[
    ("United States", 28),
    ("China", 22),
    ("Russia", 17),
    ("India", 14),
    ("Germany", 12),
    ("United Kingdom", 11),
    ("Japan", 9),
    ("Brazil", 7),
    ("France", 6),
    ("Canada", 5),
];

/// `(year, intensity, likelihood, relevance)`
const YEARS: &[(i32, f64, f64, f64)] = &[
    (2016, 3.5, 2.1, 2.8),
    (2017, 4.2, 2.3, 3.0),
    (2018, 4.8, 2.5, 3.2),
    (2019, 5.1, 2.7, 3.4),
    (2020, 5.5, 2.9, 3.5),
    (2021, 5.8, 3.0, 3.6),
    (2022, 6.0, 3.1, 3.7),
    (2023, 6.2, 3.2, 3.8),
    (2024, 6.5, 3.3, 3.9),
];

fn categories(rows: &[(&str, u64)]) -> Vec<AggregateEntry> {
    rows.iter()
        .map(|&(name, value)| AggregateEntry::category(name, value))
        .collect()
}

fn buckets(counts: &[u64]) -> Vec<AggregateEntry> {
    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| AggregateEntry::bucket((i + 1) as f64, count))
        .collect()
}

/// Undamped demo data for `kind`.
pub fn demo_entries(kind: AggregateKind) -> Vec<AggregateEntry> {
    match kind {
        AggregateKind::Topic => categories(TOPICS),
        AggregateKind::Region => categories(REGIONS),
        AggregateKind::Sector => categories(SECTORS),
        AggregateKind::Country => COUNTRIES
            .iter()
            .map(|&(key, count)| AggregateEntry::named(key, count))
            .collect(),
        AggregateKind::Intensity => buckets(INTENSITY),
        AggregateKind::Likelihood => buckets(LIKELIHOOD),
        AggregateKind::YearTrend => YEARS
            .iter()
            .map(|&(year, i, l, r)| {
                AggregateEntry::YearTrend(YearTrend {
                    year,
                    avg_intensity: i,
                    avg_likelihood: l,
                    avg_relevance: r,
                })
            })
            .collect(),
    }
}

fn damp(entries: &mut [AggregateEntry], wanted: &str, factor: f64) {
    let wanted = wanted.to_lowercase();
    for entry in entries {
        let (label, count) = match entry {
            AggregateEntry::Category(c) => (&c.name, &mut c.value),
            AggregateEntry::Named(n) => (&n.key, &mut n.count),
            _ => continue,
        };
        if label.to_lowercase() != wanted {
            *count = (*count as f64 * factor).floor() as u64;
        }
    }
}

/// Demo data for `kind` with the filter damping applied.
pub fn damped_entries(kind: AggregateKind, filters: &FilterSet) -> Vec<AggregateEntry> {
    let mut entries = demo_entries(kind);
    let named = matches!(
        kind,
        AggregateKind::Topic | AggregateKind::Sector | AggregateKind::Region
    );
    if let (true, Some(sector)) = (named, filters.get(FilterField::Sector)) {
        damp(&mut entries, sector, 0.5);
    }
    if let (AggregateKind::Country, Some(country)) = (kind, filters.get(FilterField::Country)) {
        damp(&mut entries, country, 0.6);
    }
    if let (AggregateKind::Topic, Some(topic)) = (kind, filters.get(FilterField::Topic)) {
        damp(&mut entries, topic, 0.4);
    }
    if let (AggregateKind::Region, Some(region)) = (kind, filters.get(FilterField::Region)) {
        damp(&mut entries, region, 0.3);
    }
    entries
}

/// Serves [`damped_entries`]; never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticFallbackSource;

impl StaticFallbackSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AggregateSource for StaticFallbackSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(
        &self,
        kind: AggregateKind,
        filters: &FilterSet,
    ) -> Result<Vec<AggregateEntry>> {
        Ok(damped_entries(kind, filters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_of(entries: &[AggregateEntry], label: &str) -> u64 {
        entries
            .iter()
            .find(|e| e.label() == label)
            .and_then(AggregateEntry::count)
            .unwrap()
    }

    #[tokio::test]
    async fn test_every_kind_has_data() {
        let source = StaticFallbackSource::new();
        for kind in AggregateKind::ALL {
            let entries = source.fetch(kind, &FilterSet::new()).await.unwrap();
            assert!(!entries.is_empty(), "{} is empty", kind);
        }
    }

    #[test]
    fn test_sector_damps_name_shaped_kinds() {
        let filters = FilterSet::new().with(FilterField::Sector, "energy");
        let sectors = damped_entries(AggregateKind::Sector, &filters);
        assert_eq!(value_of(&sectors, "Energy"), 30);
        assert_eq!(value_of(&sectors, "Environment"), 12);
        assert_eq!(value_of(&sectors, "Healthcare"), 3);

        let topics = damped_entries(AggregateKind::Topic, &filters);
        assert_eq!(value_of(&topics, "oil"), 12);

        let countries = damped_entries(AggregateKind::Country, &filters);
        assert_eq!(value_of(&countries, "China"), 22);
    }

    #[test]
    fn test_topic_and_region_damping_stack_with_sector() {
        let filters = FilterSet::new()
            .with(FilterField::Topic, "oil")
            .with(FilterField::Sector, "Energy");
        let topics = damped_entries(AggregateKind::Topic, &filters);
        // oil: 25 * 0.5 = 12, then matches topic
        assert_eq!(value_of(&topics, "oil"), 12);
        // gas: floor(18 * 0.5) = 9, floor(9 * 0.4) = 3
        assert_eq!(value_of(&topics, "gas"), 3);

        let filters = FilterSet::new().with(FilterField::Region, "asia");
        let regions = damped_entries(AggregateKind::Region, &filters);
        assert_eq!(value_of(&regions, "Asia"), 30);
        assert_eq!(value_of(&regions, "Northern America"), 10);
    }

    #[test]
    fn test_country_damping() {
        let filters = FilterSet::new().with(FilterField::Country, "India");
        let countries = damped_entries(AggregateKind::Country, &filters);
        assert_eq!(value_of(&countries, "India"), 14);
        assert_eq!(value_of(&countries, "United States"), 16);
    }

    #[test]
    fn test_unrelated_kinds_untouched() {
        let filters = FilterSet::new().with(FilterField::Sector, "Energy");
        assert_eq!(
            damped_entries(AggregateKind::Intensity, &filters),
            demo_entries(AggregateKind::Intensity)
        );
        assert_eq!(
            damped_entries(AggregateKind::YearTrend, &filters),
            demo_entries(AggregateKind::YearTrend)
        );
    }
}
