//! Dataset statistics and filter options.
//!
//! `pulse stats` prints the headline numbers shown above the dashboard
//! charts plus the mean relevance per topic; `pulse options` lists the
//! values each filter field can take.

use anyhow::Result;

use pulseboard_core::aggregate::{dashboard_stats, filter_options, relevance_by_topic};
use pulseboard_core::filter::FilterSet;

use crate::config::Config;
use crate::dataset;

/// Run the stats command over the configured dataset.
pub fn run_stats(config: &Config, filters: &FilterSet) -> Result<()> {
    let records = dataset::require_records(config)?;
    let stats = dashboard_stats(&records, filters);
    let size = config
        .dataset
        .path
        .as_ref()
        .and_then(|p| std::fs::metadata(p).ok())
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Pulseboard: Dataset Stats");
    println!("=========================");
    println!();
    if let Some(path) = &config.dataset.path {
        println!("  Dataset:        {}", path.display());
    }
    println!("  Size:           {}", format_bytes(size));
    let labels = filters.active_labels();
    if !labels.is_empty() {
        println!("  Filters:        {}", labels.join(", "));
    }
    println!();
    println!("  Records:        {} / {}", stats.total_records, records.len());
    println!("  Avg intensity:  {:.2}", stats.avg_intensity);
    println!("  Top likelihood: {}", stats.top_likelihood);
    println!("  Topics:         {}", stats.topic_count);
    println!("  Countries:      {}", stats.country_count);

    let mut relevance = relevance_by_topic(&records, filters);
    if !relevance.is_empty() {
        relevance.sort_by(|a, b| {
            b.avg_relevance
                .total_cmp(&a.avg_relevance)
                .then_with(|| a.topic.cmp(&b.topic))
        });
        println!();
        println!("  Relevance by topic:");
        println!("  {:<28} {:>9}", "TOPIC", "RELEVANCE");
        println!("  {}", "-".repeat(38));
        for r in relevance.iter().take(15) {
            println!("  {:<28} {:>9.2}", r.topic, r.avg_relevance);
        }
        if relevance.len() > 15 {
            println!("  … {} more", relevance.len() - 15);
        }
    }
    println!();
    Ok(())
}

/// Print the selectable values per filter field.
pub fn run_options(config: &Config, json: bool) -> Result<()> {
    let records = dataset::require_records(config)?;
    let options = filter_options(&records);

    if json {
        println!("{}", serde_json::to_string_pretty(&options)?);
        return Ok(());
    }

    for (field, values) in &options {
        println!("{} ({}):", field.label(), values.len());
        if values.is_empty() {
            println!("  (none)");
        }
        for v in values {
            println!("  {}", v);
        }
    }
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
