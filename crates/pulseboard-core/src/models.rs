//! Core data models for Pulseboard.
//!
//! These types represent the raw records read from a dataset and the
//! aggregate entries derived from them. Records are immutable inputs: the
//! filter evaluator and aggregator only ever borrow them.

use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// A single row of the analytics dataset.
///
/// Text fields default to `""` when missing. Numeric fields are parsed
/// leniently: the datasets this tool reads routinely carry `""` or `null`
/// for unknown values, and those are kept as `None` so they never skew a
/// mean.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub pestle: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub swot: String,
    #[serde(default, alias = "endYear", deserialize_with = "lenient_year")]
    pub end_year: Option<i32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub intensity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub likelihood: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub relevance: Option<f64>,
}

/// Interpret a JSON value as a finite number.
///
/// Accepts numbers and numeric strings. Everything else (including `""`,
/// `null`, `NaN`) is absent.
pub fn number_from_json(value: &serde_json::Value) -> Option<f64> {
    let n = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(number_from_json(&value))
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(number_from_json(&value)
        .filter(|y| y.fract() == 0.0 && *y >= i32::MIN as f64 && *y <= i32::MAX as f64)
        .map(|y| y as i32))
}

/// Hex SHA-256 over the content of `records`, in order.
///
/// Two record sets share a digest only if every field of every record
/// is equal, so it can stand in for the dataset in cache keys and HTTP
/// validators.
pub fn dataset_digest(records: &[Record]) -> String {
    fn number(hasher: &mut Sha256, v: Option<f64>) {
        match v {
            Some(v) => hasher.update(v.to_bits().to_be_bytes()),
            None => hasher.update([0xff]),
        }
    }

    let mut hasher = Sha256::new();
    hasher.update((records.len() as u64).to_be_bytes());
    for r in records {
        for text in [
            &r.topic, &r.sector, &r.region, &r.country, &r.pestle, &r.source, &r.swot,
        ] {
            hasher.update((text.len() as u64).to_be_bytes());
            hasher.update(text.as_bytes());
        }
        number(&mut hasher, r.end_year.map(f64::from));
        number(&mut hasher, r.intensity);
        number(&mut hasher, r.likelihood);
        number(&mut hasher, r.relevance);
    }
    hex::encode(hasher.finalize())
}

// ═══════════════════════════════════════════════════════════════════════
// Aggregate kinds
// ═══════════════════════════════════════════════════════════════════════

/// The seven grouping/reduction operations a dashboard is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    Topic,
    Intensity,
    Likelihood,
    Region,
    Sector,
    Country,
    YearTrend,
}

impl AggregateKind {
    /// Every kind, in dashboard order.
    pub const ALL: [AggregateKind; 7] = [
        AggregateKind::Topic,
        AggregateKind::Intensity,
        AggregateKind::Likelihood,
        AggregateKind::Region,
        AggregateKind::Sector,
        AggregateKind::Country,
        AggregateKind::YearTrend,
    ];

    /// Endpoint segment used by the remote data source (`/api/<endpoint>`).
    pub fn endpoint(self) -> &'static str {
        match self {
            AggregateKind::Topic => "topic-distribution",
            AggregateKind::Intensity => "intensity-distribution",
            AggregateKind::Likelihood => "likelihood-distribution",
            AggregateKind::Region => "region-distribution",
            AggregateKind::Sector => "sector-distribution",
            AggregateKind::Country => "country-distribution",
            AggregateKind::YearTrend => "year-trend",
        }
    }

    /// Short CLI name.
    pub fn short_name(self) -> &'static str {
        match self {
            AggregateKind::Topic => "topic",
            AggregateKind::Intensity => "intensity",
            AggregateKind::Likelihood => "likelihood",
            AggregateKind::Region => "region",
            AggregateKind::Sector => "sector",
            AggregateKind::Country => "country",
            AggregateKind::YearTrend => "year",
        }
    }

    /// Chart title.
    pub fn title(self) -> &'static str {
        match self {
            AggregateKind::Topic => "Topic Distribution",
            AggregateKind::Intensity => "Intensity Distribution",
            AggregateKind::Likelihood => "Likelihood Distribution",
            AggregateKind::Region => "Regions",
            AggregateKind::Sector => "Sectors",
            AggregateKind::Country => "Country Distribution",
            AggregateKind::YearTrend => "Year Trends",
        }
    }
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for AggregateKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AggregateKind::ALL
            .into_iter()
            .find(|k| k.short_name() == s || k.endpoint() == s)
            .or(match s {
                "year_trend" | "years" => Some(AggregateKind::YearTrend),
                _ => None,
            })
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "unknown aggregate kind '{}'. Must be one of: topic, intensity, likelihood, region, sector, country, year",
                    s
                )
            })
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Aggregate entries
// ═══════════════════════════════════════════════════════════════════════

/// Count of records per category (topic, sector, region).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub value: u64,
}

/// Count of records per named key (country).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCount {
    pub key: String,
    pub count: u64,
}

/// Count of records per numeric bucket (intensity, likelihood).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketCount {
    pub bucket: f64,
    pub count: u64,
}

/// Per-year means of the three record metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearTrend {
    pub year: i32,
    pub avg_intensity: f64,
    pub avg_likelihood: f64,
    pub avg_relevance: f64,
}

/// One element of an aggregate sequence.
///
/// Every [`AggregateKind`] produces exactly one variant: topic, sector and
/// region produce [`Category`](AggregateEntry::Category), country produces
/// [`Named`](AggregateEntry::Named), intensity and likelihood produce
/// [`Bucket`](AggregateEntry::Bucket), year-trend produces
/// [`YearTrend`](AggregateEntry::YearTrend).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum AggregateEntry {
    Category(CategoryCount),
    Named(NamedCount),
    Bucket(BucketCount),
    YearTrend(YearTrend),
}

impl AggregateEntry {
    pub fn category(name: impl Into<String>, value: u64) -> Self {
        AggregateEntry::Category(CategoryCount {
            name: name.into(),
            value,
        })
    }

    pub fn named(key: impl Into<String>, count: u64) -> Self {
        AggregateEntry::Named(NamedCount {
            key: key.into(),
            count,
        })
    }

    pub fn bucket(bucket: f64, count: u64) -> Self {
        AggregateEntry::Bucket(BucketCount { bucket, count })
    }

    /// Display label: the category/key name, the bucket value, or the year.
    pub fn label(&self) -> String {
        match self {
            AggregateEntry::Category(c) => c.name.clone(),
            AggregateEntry::Named(n) => n.key.clone(),
            AggregateEntry::Bucket(b) => format_number(b.bucket),
            AggregateEntry::YearTrend(y) => y.year.to_string(),
        }
    }

    /// Record count, for count-shaped entries.
    pub fn count(&self) -> Option<u64> {
        match self {
            AggregateEntry::Category(c) => Some(c.value),
            AggregateEntry::Named(n) => Some(n.count),
            AggregateEntry::Bucket(b) => Some(b.count),
            AggregateEntry::YearTrend(_) => None,
        }
    }

    /// The value a chart sizes geometry from.
    ///
    /// Counts for count-shaped entries; the largest of the three means for
    /// a year trend.
    pub fn metric(&self) -> f64 {
        match self {
            AggregateEntry::YearTrend(y) => y
                .avg_intensity
                .max(y.avg_likelihood)
                .max(y.avg_relevance),
            other => other.count().unwrap_or(0) as f64,
        }
    }

    /// Numeric sort key: the bucket value or year, if the entry has one.
    pub fn numeric_key(&self) -> Option<f64> {
        match self {
            AggregateEntry::Bucket(b) => Some(b.bucket),
            AggregateEntry::YearTrend(y) => Some(y.year as f64),
            _ => None,
        }
    }
}

/// Format a number without a trailing `.0` for whole values.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Dashboard summaries
// ═══════════════════════════════════════════════════════════════════════

/// Headline numbers shown above the charts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_records: u64,
    /// Mean intensity over records that carry one (`0.0` when none do).
    pub avg_intensity: f64,
    /// Highest likelihood observed (`0.0` when none is present).
    pub top_likelihood: f64,
    pub topic_count: u64,
    pub country_count: u64,
}

/// Mean relevance of the records sharing a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicRelevance {
    pub topic: String,
    pub avg_relevance: f64,
}
