//! Record aggregation.
//!
//! Every aggregate is computed the same way:
//!
//! 1. **Filter**: keep records the [`FilterSet`] matches.
//! 2. **Group**: partition by a kind-specific key (topic, sector, region,
//!    country, intensity, likelihood, end year).
//! 3. **Reduce**: count each group, or average the three metrics for the
//!    year trend.
//!
//! Results carry no ordering promise; charts sort them for display. Groups
//! with no records never appear (empty buckets and years are omitted), and
//! records lacking the grouping key (blank category, absent number) are
//! left out of that aggregate rather than counted under a placeholder.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::filter::{FilterField, FilterSet};
use crate::models::{
    AggregateEntry, AggregateKind, DashboardStats, Record, TopicRelevance, YearTrend,
};

/// A numeric grouping key with a total order.
#[derive(Debug, Clone, Copy)]
struct Bucket(f64);

impl PartialEq for Bucket {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Bucket {}

impl PartialOrd for Bucket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Bucket {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Records matching `filters`.
pub fn filtered<'a>(
    records: &'a [Record],
    filters: &'a FilterSet,
) -> impl Iterator<Item = &'a Record> + 'a {
    records.iter().filter(move |r| filters.matches(r))
}

/// Compute one aggregate over the records matching `filters`.
pub fn aggregate(
    records: &[Record],
    filters: &FilterSet,
    kind: AggregateKind,
) -> Vec<AggregateEntry> {
    let rows = filtered(records, filters);
    match kind {
        AggregateKind::Topic => category_counts(rows, |r| &r.topic),
        AggregateKind::Sector => category_counts(rows, |r| &r.sector),
        AggregateKind::Region => category_counts(rows, |r| &r.region),
        AggregateKind::Country => count_by(rows, |r| non_blank(&r.country))
            .into_iter()
            .map(|(key, count)| AggregateEntry::named(key, count))
            .collect(),
        AggregateKind::Intensity => bucket_counts(rows, |r| r.intensity),
        AggregateKind::Likelihood => bucket_counts(rows, |r| r.likelihood),
        AggregateKind::YearTrend => year_trends(rows)
            .into_iter()
            .map(AggregateEntry::YearTrend)
            .collect(),
    }
}

fn non_blank(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

fn count_by<'a, K, I, F>(rows: I, key: F) -> BTreeMap<K, u64>
where
    K: Ord,
    I: Iterator<Item = &'a Record>,
    F: Fn(&'a Record) -> Option<K>,
{
    let mut groups = BTreeMap::new();
    for row in rows {
        if let Some(k) = key(row) {
            *groups.entry(k).or_insert(0u64) += 1;
        }
    }
    groups
}

fn category_counts<'a, I, F>(rows: I, field: F) -> Vec<AggregateEntry>
where
    I: Iterator<Item = &'a Record>,
    F: Fn(&'a Record) -> &'a String,
{
    count_by(rows, |r| non_blank(field(r)))
        .into_iter()
        .map(|(name, value)| AggregateEntry::category(name, value))
        .collect()
}

fn bucket_counts<'a, I, F>(rows: I, field: F) -> Vec<AggregateEntry>
where
    I: Iterator<Item = &'a Record>,
    F: Fn(&'a Record) -> Option<f64>,
{
    count_by(rows, |r| field(r).filter(|v| v.is_finite()).map(Bucket))
        .into_iter()
        .map(|(bucket, count)| AggregateEntry::bucket(bucket.0, count))
        .collect()
}

/// Running sum and sample count for one metric.
#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    n: u64,
}

impl Mean {
    fn push(&mut self, v: Option<f64>) {
        if let Some(v) = v.filter(|v| v.is_finite()) {
            self.sum += v;
            self.n += 1;
        }
    }

    /// The mean, or `0.0` when no sample was present.
    fn value(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.sum / self.n as f64
        }
    }
}

fn year_trends<'a, I>(rows: I) -> Vec<YearTrend>
where
    I: Iterator<Item = &'a Record>,
{
    let mut years: BTreeMap<i32, [Mean; 3]> = BTreeMap::new();
    for row in rows {
        let Some(year) = row.end_year else { continue };
        let acc = years.entry(year).or_default();
        acc[0].push(row.intensity);
        acc[1].push(row.likelihood);
        acc[2].push(row.relevance);
    }
    years
        .into_iter()
        .map(|(year, [i, l, r])| YearTrend {
            year,
            avg_intensity: i.value(),
            avg_likelihood: l.value(),
            avg_relevance: r.value(),
        })
        .collect()
}

/// Headline statistics for the records matching `filters`.
pub fn dashboard_stats(records: &[Record], filters: &FilterSet) -> DashboardStats {
    let mut total = 0u64;
    let mut intensity = Mean::default();
    let mut top_likelihood: Option<f64> = None;
    let mut topics = BTreeSet::new();
    let mut countries = BTreeSet::new();

    for row in filtered(records, filters) {
        total += 1;
        intensity.push(row.intensity);
        if let Some(l) = row.likelihood.filter(|l| l.is_finite()) {
            top_likelihood = Some(top_likelihood.map_or(l, |t| t.max(l)));
        }
        if let Some(t) = non_blank(&row.topic) {
            topics.insert(t);
        }
        if let Some(c) = non_blank(&row.country) {
            countries.insert(c);
        }
    }

    DashboardStats {
        total_records: total,
        avg_intensity: intensity.value(),
        top_likelihood: top_likelihood.unwrap_or(0.0),
        topic_count: topics.len() as u64,
        country_count: countries.len() as u64,
    }
}

/// Mean relevance per topic, over records that carry a relevance value.
pub fn relevance_by_topic(records: &[Record], filters: &FilterSet) -> Vec<TopicRelevance> {
    let mut topics: BTreeMap<&str, Mean> = BTreeMap::new();
    for row in filtered(records, filters) {
        let Some(topic) = non_blank(&row.topic) else {
            continue;
        };
        if row.relevance.is_some() {
            topics.entry(topic).or_default().push(row.relevance);
        }
    }
    topics
        .into_iter()
        .map(|(topic, mean)| TopicRelevance {
            topic: topic.to_string(),
            avg_relevance: mean.value(),
        })
        .collect()
}

/// Selectable values per filter field.
pub type FilterOptions = BTreeMap<FilterField, Vec<String>>;

/// Distinct, sorted, non-empty values per filter field.
///
/// Option lists built this way are case-aligned with the records by
/// construction, so exact matching never misses.
pub fn filter_options(records: &[Record]) -> FilterOptions {
    let mut options: BTreeMap<FilterField, BTreeSet<String>> = FilterField::ALL
        .into_iter()
        .map(|f| (f, BTreeSet::new()))
        .collect();
    for row in records {
        for field in FilterField::ALL {
            let value = field.value_of(row);
            if !value.is_empty() {
                if let Some(set) = options.get_mut(&field) {
                    set.insert(value.into_owned());
                }
            }
        }
    }
    options
        .into_iter()
        .map(|(f, values)| (f, values.into_iter().collect()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryCount;

    fn rec(topic: &str, intensity: Option<f64>) -> Record {
        Record {
            topic: topic.to_string(),
            intensity,
            ..Default::default()
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            rec("oil", Some(5.0)),
            rec("oil", Some(7.0)),
            rec("gas", Some(3.0)),
        ]
    }

    fn sorted_categories(entries: Vec<AggregateEntry>) -> Vec<(String, u64)> {
        let mut out: Vec<(String, u64)> = entries
            .into_iter()
            .map(|e| match e {
                AggregateEntry::Category(CategoryCount { name, value }) => (name, value),
                other => panic!("unexpected entry {:?}", other),
            })
            .collect();
        out.sort();
        out
    }

    #[test]
    fn test_topic_counts() {
        let result = aggregate(&sample(), &FilterSet::new(), AggregateKind::Topic);
        assert_eq!(
            sorted_categories(result),
            vec![("gas".to_string(), 1), ("oil".to_string(), 2)]
        );
    }

    #[test]
    fn test_intensity_buckets() {
        let result = aggregate(&sample(), &FilterSet::new(), AggregateKind::Intensity);
        let mut buckets: Vec<(f64, u64)> = result
            .iter()
            .map(|e| (e.numeric_key().unwrap(), e.count().unwrap()))
            .collect();
        buckets.sort_by(|a, b| a.0.total_cmp(&b.0));
        assert_eq!(buckets, vec![(3.0, 1), (5.0, 1), (7.0, 1)]);
    }

    #[test]
    fn test_topic_filter_restricts() {
        let filters = FilterSet::new().with(FilterField::Topic, "oil");
        let result = aggregate(&sample(), &filters, AggregateKind::Topic);
        assert_eq!(sorted_categories(result), vec![("oil".to_string(), 2)]);
    }

    #[test]
    fn test_empty_filter_equals_unfiltered() {
        let records = sample();
        let mut blank = FilterSet::new();
        for field in FilterField::ALL {
            blank.set(field, "");
        }
        for kind in AggregateKind::ALL {
            assert_eq!(
                aggregate(&records, &blank, kind),
                aggregate(&records, &FilterSet::default(), kind)
            );
        }
    }

    #[test]
    fn test_deterministic() {
        let records = sample();
        let filters = FilterSet::new().with(FilterField::Topic, "gas");
        for kind in AggregateKind::ALL {
            assert_eq!(
                aggregate(&records, &filters, kind),
                aggregate(&records, &filters, kind)
            );
        }
    }

    #[test]
    fn test_topic_counts_sum_to_record_count() {
        let records = sample();
        let total: u64 = aggregate(&records, &FilterSet::new(), AggregateKind::Topic)
            .iter()
            .filter_map(AggregateEntry::count)
            .sum();
        assert_eq!(total, records.len() as u64);
    }

    #[test]
    fn test_empty_input() {
        for kind in AggregateKind::ALL {
            assert!(aggregate(&[], &FilterSet::new(), kind).is_empty());
        }
    }

    #[test]
    fn test_blank_and_missing_keys_are_excluded() {
        let records = vec![rec("", None), rec("oil", None)];
        let topics = aggregate(&records, &FilterSet::new(), AggregateKind::Topic);
        assert_eq!(topics.len(), 1);
        assert!(aggregate(&records, &FilterSet::new(), AggregateKind::Intensity).is_empty());
        assert!(aggregate(&records, &FilterSet::new(), AggregateKind::Country).is_empty());
    }

    #[test]
    fn test_year_trend_means() {
        let records = vec![
            Record {
                end_year: Some(2020),
                intensity: Some(2.0),
                likelihood: Some(1.0),
                relevance: Some(3.0),
                ..Default::default()
            },
            Record {
                end_year: Some(2020),
                intensity: Some(4.0),
                likelihood: Some(4.0),
                relevance: None,
                ..Default::default()
            },
            Record {
                end_year: Some(2020),
                intensity: Some(9.0),
                likelihood: Some(1.0),
                relevance: Some(5.0),
                ..Default::default()
            },
            Record {
                end_year: None,
                intensity: Some(100.0),
                ..Default::default()
            },
        ];
        let result = aggregate(&records, &FilterSet::new(), AggregateKind::YearTrend);
        assert_eq!(result.len(), 1);
        let AggregateEntry::YearTrend(t) = &result[0] else {
            panic!("expected year trend");
        };
        assert_eq!(t.year, 2020);
        assert!((t.avg_intensity - 5.0).abs() < 1e-9);
        assert!((t.avg_likelihood - 2.0).abs() < 1e-9);
        // Missing relevance is absent, not zero.
        assert!((t.avg_relevance - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_year_without_metric_uses_zero_sentinel() {
        let records = vec![Record {
            end_year: Some(2030),
            ..Default::default()
        }];
        let result = aggregate(&records, &FilterSet::new(), AggregateKind::YearTrend);
        let AggregateEntry::YearTrend(t) = &result[0] else {
            panic!("expected year trend");
        };
        assert_eq!(t.avg_intensity, 0.0);
        assert!(!t.avg_relevance.is_nan());
    }

    #[test]
    fn test_dashboard_stats() {
        let mut records = sample();
        records[0].country = "India".to_string();
        records[1].likelihood = Some(4.0);
        let stats = dashboard_stats(&records, &FilterSet::new());
        assert_eq!(stats.total_records, 3);
        assert!((stats.avg_intensity - 5.0).abs() < 1e-9);
        assert_eq!(stats.top_likelihood, 4.0);
        assert_eq!(stats.topic_count, 2);
        assert_eq!(stats.country_count, 1);

        let none = dashboard_stats(&[], &FilterSet::new());
        assert_eq!(none, DashboardStats::default());
    }

    #[test]
    fn test_relevance_by_topic() {
        let mut records = sample();
        records[0].relevance = Some(2.0);
        records[1].relevance = Some(4.0);
        let result = relevance_by_topic(&records, &FilterSet::new());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].topic, "oil");
        assert!((result[0].avg_relevance - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_filter_options() {
        let mut records = sample();
        records[2].end_year = Some(2025);
        let options = filter_options(&records);
        assert_eq!(options[&FilterField::Topic], vec!["gas", "oil"]);
        assert_eq!(options[&FilterField::EndYear], vec!["2025"]);
        assert!(options[&FilterField::Swot].is_empty());
    }
}
