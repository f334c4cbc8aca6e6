//! Record dataset loading.
//!
//! A dataset is a JSON array of record objects. Rows that are not objects
//! are skipped with a warning; missing or non-numeric fields inside a row
//! are tolerated by the [`Record`] deserializer.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use pulseboard_core::models::Record;

use crate::config::Config;

/// Parse records from JSON text.
///
/// Accepts a bare array, or an object wrapping the array under `data` or
/// `records`.
pub fn parse_records(content: &str) -> Result<Vec<Record>> {
    let value: Value = serde_json::from_str(content).context("dataset is not valid JSON")?;
    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(mut obj) => match obj.remove("data").or_else(|| obj.remove("records")) {
            Some(Value::Array(rows)) => rows,
            _ => bail!("dataset object has no `data` or `records` array"),
        },
        _ => bail!("dataset must be a JSON array of records"),
    };

    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;
    for (i, row) in rows.into_iter().enumerate() {
        if !row.is_object() {
            skipped += 1;
            tracing::warn!(row = i, "skipping dataset row that is not an object");
            continue;
        }
        match serde_json::from_value::<Record>(row) {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                tracing::warn!(row = i, error = %e, "skipping malformed dataset row");
            }
        }
    }
    if skipped > 0 {
        tracing::info!(loaded = records.len(), skipped, "dataset loaded with skipped rows");
    }
    Ok(records)
}

/// Load records from a JSON file.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset: {}", path.display()))?;
    parse_records(&content).with_context(|| format!("Failed to load dataset: {}", path.display()))
}

/// Load the configured dataset, if one is configured.
pub fn load_configured(config: &Config) -> Result<Option<Arc<Vec<Record>>>> {
    match &config.dataset.path {
        Some(path) => Ok(Some(Arc::new(load_records(path)?))),
        None => Ok(None),
    }
}

/// Load the configured dataset, failing if none is configured.
pub fn require_records(config: &Config) -> Result<Arc<Vec<Record>>> {
    load_configured(config)?.context("dataset.path is not set in the config file")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_array() {
        let records = parse_records(
            r#"[{"topic":"oil","intensity":"6"},{"topic":"gas","end_year":2020}]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].intensity, Some(6.0));
        assert_eq!(records[1].end_year, Some(2020));
    }

    #[test]
    fn test_parse_wrapped_and_skips_non_objects() {
        let records = parse_records(r#"{"data":[{"topic":"oil"}, 42, "x"]}"#).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(parse_records(r#""records""#).is_err());
        assert!(parse_records(r#"{"rows":[]}"#).is_err());
        assert!(parse_records("not json").is_err());
    }
}
