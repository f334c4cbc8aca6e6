//! Configuration parsing and validation.
//!
//! Pulseboard is configured via a TOML file (default: `config/pulse.toml`).
//! The configuration defines where records come from, which aggregate
//! source strategy the dashboard uses, how filters match, chart output
//! size, and the HTTP server bind address.
//!
//! # Example Configuration
//!
//! ```toml
//! [dataset]
//! path = "./data/records.json"
//!
//! [source]
//! mode = "resilient"              # remote | static | local | resilient
//! base_url = "http://localhost:5000/api"
//! timeout_secs = 10
//! fallback = "static"             # static | local
//!
//! [filters]
//! case_insensitive = false
//!
//! [filters.initial]
//! sector = "Energy"
//!
//! [render]
//! width = 640
//! height = 300
//! legend_top_n = 6
//! out_dir = "./dashboard"
//!
//! [server]
//! bind = "127.0.0.1:5000"
//! ```
//!
//! `PULSEBOARD_BASE_URL`, when set, overrides `source.base_url`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use pulseboard_core::chart::Viewport;
use pulseboard_core::filter::{FilterSet, MatchMode};

/// Environment variable overriding `source.base_url`.
pub const BASE_URL_ENV: &str = "PULSEBOARD_BASE_URL";

/// Top-level configuration structure.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Record dataset location.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatasetConfig {
    /// JSON array of records. Required by the `local` source and the server.
    pub path: Option<PathBuf>,
}

/// Aggregate source strategy.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// HTTP data source only; failures surface as empty charts.
    Remote,
    /// Built-in demo data.
    Static,
    /// Aggregate the configured dataset in-process.
    Local,
    /// Remote first, fallback on error.
    Resilient,
}

/// Data answered when the remote source fails in `resilient` mode.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FallbackMode {
    Static,
    Local,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_mode")]
    pub mode: SourceMode,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_fallback")]
    pub fallback: FallbackMode,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            fallback: default_fallback(),
        }
    }
}

fn default_mode() -> SourceMode {
    SourceMode::Resilient
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_fallback() -> FallbackMode {
    FallbackMode::Static
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FiltersConfig {
    /// Opt-in case-insensitive matching. Off by default.
    #[serde(default)]
    pub case_insensitive: bool,
    /// Filters applied when the dashboard starts, by field name.
    #[serde(default)]
    pub initial: BTreeMap<String, String>,
}

impl FiltersConfig {
    pub fn match_mode(&self) -> MatchMode {
        if self.case_insensitive {
            MatchMode::CaseInsensitive
        } else {
            MatchMode::Exact
        }
    }

    /// The starting filter set: `initial` values in the configured mode.
    pub fn initial_set(&self) -> FilterSet {
        FilterSet::from_pairs(self.initial.iter()).with_mode(self.match_mode())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default = "default_legend_top_n")]
    pub legend_top_n: usize,
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            legend_top_n: default_legend_top_n(),
            out_dir: default_out_dir(),
        }
    }
}

impl RenderConfig {
    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.width,
            height: self.height,
        }
    }
}

fn default_width() -> f64 {
    640.0
}

fn default_height() -> f64 {
    300.0
}

fn default_legend_top_n() -> usize {
    6
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("./dashboard")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

impl Config {
    /// Configuration used when no config file exists: demo data only.
    pub fn minimal() -> Self {
        Config {
            source: SourceConfig {
                mode: SourceMode::Static,
                ..SourceConfig::default()
            },
            ..Config::default()
        }
    }

    /// Whether the configured strategy needs `dataset.path`.
    pub fn needs_dataset(&self) -> bool {
        self.source.mode == SourceMode::Local
            || (self.source.mode == SourceMode::Resilient
                && self.source.fallback == FallbackMode::Local)
    }
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<Config> {
    let mut config: Config =
        toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if let Ok(url) = std::env::var(BASE_URL_ENV) {
        if !url.trim().is_empty() {
            config.source.base_url = url;
        }
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    // Validate source
    if config.source.timeout_secs == 0 {
        anyhow::bail!("source.timeout_secs must be > 0");
    }
    let base = config.source.base_url.as_str();
    if matches!(config.source.mode, SourceMode::Remote | SourceMode::Resilient)
        && !(base.starts_with("http://") || base.starts_with("https://"))
    {
        anyhow::bail!(
            "source.base_url must be an http(s) URL, got '{}'",
            config.source.base_url
        );
    }
    if config.needs_dataset() && config.dataset.path.is_none() {
        anyhow::bail!("dataset.path must be set when the local source is used");
    }

    // Validate filters
    for name in config.filters.initial.keys() {
        if pulseboard_core::filter::FilterField::parse(name).is_none() {
            anyhow::bail!(
                "Unknown filter field in filters.initial: '{}'. Must be one of: end_year, topic, sector, region, pestle, source, swot, country.",
                name
            );
        }
    }

    // Validate render
    if !(config.render.width > 0.0 && config.render.height > 0.0) {
        anyhow::bail!("render.width and render.height must be > 0");
    }
    if config.render.legend_top_n == 0 {
        anyhow::bail!("render.legend_top_n must be >= 1");
    }
    Ok(())
}

/// Load and validate the configuration file at `path`.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let mut config = parse_config(&content)?;

    // Relative dataset paths are relative to the config file.
    if let (Some(dataset), Some(dir)) = (&config.dataset.path, path.parent()) {
        if dataset.is_relative() && !dir.as_os_str().is_empty() {
            config.dataset.path = Some(dir.join(dataset));
        }
    }
    Ok(config)
}
