//! Aggregate source construction and health listing.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use pulseboard_core::filter::FilterSet;
use pulseboard_core::models::{AggregateKind, Record};
use pulseboard_core::source::{
    AggregateSource, LocalSource, ResilientSource, StaticFallbackSource,
};

use crate::config::{Config, FallbackMode, SourceMode};
use crate::dataset;
use crate::remote::RemoteSource;

/// Build the configured source strategy.
///
/// `records` is required when the strategy aggregates locally (either as
/// the primary source or as the resilient fallback).
pub fn build_source(
    config: &Config,
    records: Option<Arc<Vec<Record>>>,
) -> Result<Arc<dyn AggregateSource>> {
    let local = |records: Option<Arc<Vec<Record>>>| -> Result<Arc<dyn AggregateSource>> {
        let records = records.context("the local source needs dataset.path")?;
        Ok(Arc::new(LocalSource::new(records)))
    };
    let remote = || -> Result<Arc<dyn AggregateSource>> {
        Ok(Arc::new(RemoteSource::new(
            &config.source.base_url,
            Duration::from_secs(config.source.timeout_secs),
        )?))
    };

    let source: Arc<dyn AggregateSource> = match config.source.mode {
        SourceMode::Static => Arc::new(StaticFallbackSource::new()),
        SourceMode::Local => local(records)?,
        SourceMode::Remote => remote()?,
        SourceMode::Resilient => {
            let fallback: Arc<dyn AggregateSource> = match config.source.fallback {
                FallbackMode::Static => Arc::new(StaticFallbackSource::new()),
                FallbackMode::Local => local(records)?,
            };
            Arc::new(ResilientSource::new(remote()?, fallback))
        }
    };
    tracing::debug!(source = source.name(), "aggregate source ready");
    Ok(source)
}

/// Load the dataset if the configuration needs it and build the source.
pub fn source_from_config(config: &Config) -> Result<Arc<dyn AggregateSource>> {
    let records = if config.needs_dataset() {
        Some(dataset::require_records(config)?)
    } else {
        None
    };
    build_source(config, records)
}

/// Print every source strategy with its status and a live health check.
pub async fn list_sources(config: &Config) -> Result<()> {
    let unfiltered = FilterSet::new();

    let dataset_status = match &config.dataset.path {
        Some(path) => match dataset::load_records(path) {
            Ok(records) => (format!("OK ({} records)", records.len()), true),
            Err(_) => ("UNREADABLE".to_string(), false),
        },
        None => ("NOT CONFIGURED".to_string(), false),
    };

    let remote_status = match RemoteSource::new(
        &config.source.base_url,
        Duration::from_secs(config.source.timeout_secs),
    ) {
        Ok(remote) => match remote.fetch(AggregateKind::Topic, &unfiltered).await {
            Ok(_) => (format!("OK ({})", remote.base_url()), true),
            Err(e) => {
                tracing::debug!(error = %format!("{:#}", e), "remote health check failed");
                (format!("UNREACHABLE ({})", remote.base_url()), false)
            }
        },
        Err(_) => ("INVALID".to_string(), false),
    };

    let active = |mode: SourceMode| if config.source.mode == mode { "*" } else { "" };

    println!("{:<12} {:<44} HEALTHY", "SOURCE", "STATUS");
    println!(
        "{:<12} {:<44} {}",
        format!("remote{}", active(SourceMode::Remote)),
        remote_status.0,
        remote_status.1
    );
    println!(
        "{:<12} {:<44} {}",
        format!("local{}", active(SourceMode::Local)),
        dataset_status.0,
        dataset_status.1
    );
    println!(
        "{:<12} {:<44} {}",
        format!("static{}", active(SourceMode::Static)),
        "OK (built-in demo data)",
        true
    );
    let fallback = match config.source.fallback {
        FallbackMode::Static => "static",
        FallbackMode::Local => "local",
    };
    println!(
        "{:<12} {:<44} {}",
        format!("resilient{}", active(SourceMode::Resilient)),
        format!("remote, falling back to {}", fallback),
        match config.source.fallback {
            FallbackMode::Static => true,
            FallbackMode::Local => dataset_status.1,
        }
    );
    println!();
    println!("* active strategy");

    Ok(())
}
