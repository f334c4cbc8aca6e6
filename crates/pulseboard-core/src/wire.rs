//! JSON wire shapes for aggregate arrays.
//!
//! The remote data source speaks one JSON shape per aggregate kind:
//!
//! | Kind | Element shape |
//! |------|---------------|
//! | topic, sector, region | `{ "name": "oil", "value": 25 }` |
//! | country | `{ "country": "India", "count": 14 }` |
//! | intensity | `{ "intensity": 6, "count": 11 }` |
//! | likelihood | `{ "likelihood": 3, "count": 25 }` |
//! | year-trend | `{ "year": 2020, "avgIntensity": 5.5, "avgLikelihood": 2.9, "avgRelevance": 3.5 }` |
//!
//! Bucket values may arrive as numbers or numeric strings. These helpers
//! translate between those shapes and [`AggregateEntry`].

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::{
    number_from_json, AggregateEntry, AggregateKind, BucketCount, CategoryCount, NamedCount,
    YearTrend,
};

#[derive(Deserialize)]
struct WireCountry {
    country: String,
    count: u64,
}

#[derive(Deserialize)]
struct WireBucket {
    #[serde(alias = "intensity", alias = "likelihood")]
    bucket: Value,
    count: u64,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireYearTrend {
    year: i32,
    avg_intensity: f64,
    avg_likelihood: f64,
    avg_relevance: f64,
}

/// Encode entries in the wire shape for `kind`.
///
/// Entries whose variant does not belong to `kind` are an error.
pub fn encode(kind: AggregateKind, entries: &[AggregateEntry]) -> Result<Value> {
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let item = match (kind, entry) {
            (
                AggregateKind::Topic | AggregateKind::Sector | AggregateKind::Region,
                AggregateEntry::Category(c),
            ) => json!({ "name": c.name, "value": c.value }),
            (AggregateKind::Country, AggregateEntry::Named(n)) => {
                json!({ "country": n.key, "count": n.count })
            }
            (AggregateKind::Intensity, AggregateEntry::Bucket(b)) => {
                json!({ "intensity": b.bucket, "count": b.count })
            }
            (AggregateKind::Likelihood, AggregateEntry::Bucket(b)) => {
                json!({ "likelihood": b.bucket, "count": b.count })
            }
            (AggregateKind::YearTrend, AggregateEntry::YearTrend(t)) => {
                serde_json::to_value(WireYearTrend {
                    year: t.year,
                    avg_intensity: t.avg_intensity,
                    avg_likelihood: t.avg_likelihood,
                    avg_relevance: t.avg_relevance,
                })?
            }
            (kind, other) => bail!("{:?} entry does not belong to the {} aggregate", other, kind),
        };
        out.push(item);
    }
    Ok(Value::Array(out))
}

/// Decode a wire payload for `kind`.
pub fn decode(kind: AggregateKind, payload: Value) -> Result<Vec<AggregateEntry>> {
    if !payload.is_array() {
        bail!("{} payload is not a JSON array", kind.endpoint());
    }
    let entries = match kind {
        AggregateKind::Topic | AggregateKind::Sector | AggregateKind::Region => {
            let items: Vec<CategoryCount> = serde_json::from_value(payload)
                .with_context(|| format!("malformed {} payload", kind.endpoint()))?;
            items.into_iter().map(AggregateEntry::Category).collect()
        }
        AggregateKind::Country => {
            let items: Vec<WireCountry> = serde_json::from_value(payload)
                .with_context(|| format!("malformed {} payload", kind.endpoint()))?;
            items
                .into_iter()
                .map(|c| {
                    AggregateEntry::Named(NamedCount {
                        key: c.country,
                        count: c.count,
                    })
                })
                .collect()
        }
        AggregateKind::Intensity | AggregateKind::Likelihood => {
            let items: Vec<WireBucket> = serde_json::from_value(payload)
                .with_context(|| format!("malformed {} payload", kind.endpoint()))?;
            let mut entries = Vec::with_capacity(items.len());
            for item in items {
                let bucket = number_from_json(&item.bucket).with_context(|| {
                    format!("non-numeric {} bucket: {}", kind.short_name(), item.bucket)
                })?;
                entries.push(AggregateEntry::Bucket(BucketCount {
                    bucket,
                    count: item.count,
                }));
            }
            entries
        }
        AggregateKind::YearTrend => {
            let items: Vec<WireYearTrend> = serde_json::from_value(payload)
                .with_context(|| format!("malformed {} payload", kind.endpoint()))?;
            items
                .into_iter()
                .map(|t| {
                    AggregateEntry::YearTrend(YearTrend {
                        year: t.year,
                        avg_intensity: t.avg_intensity,
                        avg_likelihood: t.avg_likelihood,
                        avg_relevance: t.avg_relevance,
                    })
                })
                .collect()
        }
    };
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_country_shape() {
        let payload = json!([{ "country": "India", "count": 14 }]);
        let entries = decode(AggregateKind::Country, payload).unwrap();
        assert_eq!(entries, vec![AggregateEntry::named("India", 14)]);
    }

    #[test]
    fn test_decode_string_bucket() {
        let payload = json!([{ "intensity": "6", "count": 11 }, { "intensity": 7, "count": 2 }]);
        let entries = decode(AggregateKind::Intensity, payload).unwrap();
        assert_eq!(
            entries,
            vec![AggregateEntry::bucket(6.0, 11), AggregateEntry::bucket(7.0, 2)]
        );
    }

    #[test]
    fn test_decode_rejects_bad_payloads() {
        assert!(decode(AggregateKind::Topic, json!({ "name": "oil" })).is_err());
        assert!(decode(AggregateKind::Topic, json!([{ "label": "oil" }])).is_err());
        assert!(decode(
            AggregateKind::Likelihood,
            json!([{ "likelihood": "", "count": 1 }])
        )
        .is_err());
    }

    #[test]
    fn test_year_trend_camel_case() {
        let entries = vec![AggregateEntry::YearTrend(YearTrend {
            year: 2016,
            avg_intensity: 3.5,
            avg_likelihood: 2.1,
            avg_relevance: 2.8,
        })];
        let value = encode(AggregateKind::YearTrend, &entries).unwrap();
        assert_eq!(value[0]["avgIntensity"], json!(3.5));
        assert_eq!(decode(AggregateKind::YearTrend, value).unwrap(), entries);
    }

    #[test]
    fn test_encode_rejects_mismatched_shape() {
        let entries = vec![AggregateEntry::named("India", 1)];
        assert!(encode(AggregateKind::Topic, &entries).is_err());
    }
}
