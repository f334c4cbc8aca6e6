//! The `pulse aggregate` command.

use anyhow::{bail, Result};

use pulseboard_core::chart::{encoding_for, sort_entries};
use pulseboard_core::filter::{FilterField, FilterSet};
use pulseboard_core::models::{AggregateEntry, AggregateKind};
use pulseboard_core::wire;

use crate::config::Config;
use crate::sources::source_from_config;

/// Combine the configured initial filters with `--filter key=value` pairs.
///
/// Command-line pairs override configured values; an empty value removes
/// a configured constraint. Unknown field names are an error here (unlike
/// query strings, where they are ignored).
pub fn resolve_filters(config: &Config, pairs: &[(String, String)]) -> Result<FilterSet> {
    let mut filters = config.filters.initial_set();
    for (name, value) in pairs {
        let Some(field) = FilterField::parse(name) else {
            bail!(
                "Unknown filter field: '{}'. Must be one of: end_year, topic, sector, region, pestle, source, swot, country.",
                name
            );
        };
        filters.set(field, value.as_str());
    }
    Ok(filters)
}

/// Print one aggregate as a table, or as wire-shaped JSON.
pub async fn run_aggregate(
    config: &Config,
    kind: &str,
    filters: &FilterSet,
    json: bool,
) -> Result<()> {
    let kind: AggregateKind = kind.parse()?;
    let source = source_from_config(config)?;
    let entries = source.fetch(kind, filters).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&wire::encode(kind, &entries)?)?);
        return Ok(());
    }

    println!("{} ({} source)", kind.title(), source.name());
    let labels = filters.active_labels();
    if !labels.is_empty() {
        println!("Filters: {}", labels.join(", "));
    }
    println!();

    if entries.is_empty() {
        println!("No data for current filters");
        return Ok(());
    }

    let sorted = sort_entries(&entries, encoding_for(kind).sort);
    for line in format_table(&sorted) {
        println!("{}", line);
    }
    Ok(())
}

fn format_table(entries: &[AggregateEntry]) -> Vec<String> {
    let mut lines = Vec::with_capacity(entries.len() + 2);
    match entries.first() {
        Some(AggregateEntry::YearTrend(_)) => {
            lines.push(format!(
                "  {:<8} {:>10} {:>10} {:>10}",
                "YEAR", "INTENSITY", "LIKELIHOOD", "RELEVANCE"
            ));
            lines.push(format!("  {}", "-".repeat(41)));
            for entry in entries {
                if let AggregateEntry::YearTrend(t) = entry {
                    lines.push(format!(
                        "  {:<8} {:>10.2} {:>10.2} {:>10.2}",
                        t.year, t.avg_intensity, t.avg_likelihood, t.avg_relevance
                    ));
                }
            }
        }
        _ => {
            let total: u64 = entries.iter().filter_map(AggregateEntry::count).sum();
            lines.push(format!("  {:<28} {:>8} {:>7}", "KEY", "COUNT", "SHARE"));
            lines.push(format!("  {}", "-".repeat(45)));
            for entry in entries {
                let count = entry.count().unwrap_or(0);
                let share = if total > 0 {
                    count as f64 / total as f64 * 100.0
                } else {
                    0.0
                };
                lines.push(format!(
                    "  {:<28} {:>8} {:>6.1}%",
                    entry.label(),
                    count,
                    share
                ));
            }
        }
    }
    lines
}
