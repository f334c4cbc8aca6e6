//! # Pulseboard CLI (`pulse`)
//!
//! ## Usage
//!
//! ```bash
//! pulse --config ./config/pulse.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pulse serve` | Serve the configured dataset over the dashboard API |
//! | `pulse aggregate <kind>` | Print one aggregate (table or `--json`) |
//! | `pulse render` | Write all seven charts as SVG plus an `index.html` |
//! | `pulse stats` | Headline statistics and relevance by topic |
//! | `pulse options` | Selectable values per filter field |
//! | `pulse sources` | List source strategies and their health |
//! | `pulse completions <shell>` | Print a shell completion script |
//!
//! Every command accepts repeated `--filter key=value` pairs, e.g.
//! `--filter sector=Energy --filter end_year=2027`.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use pulseboard::config::{self, Config};
use pulseboard::{query, report, server, sources, stats};

const DEFAULT_CONFIG: &str = "./config/pulse.toml";

/// Pulseboard CLI: a filterable analytics dashboard.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/pulse.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "pulse",
    about = "Pulseboard: a filterable analytics dashboard",
    version,
    long_about = "Pulseboard aggregates a record dataset seven ways under a shared filter set, \
    fetches those aggregates from a remote, local or built-in source with graceful fallback, \
    and renders them as animated SVG charts."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// When the default path does not exist, Pulseboard runs on its
    /// built-in demo data.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Filter constraint as `key=value` (repeatable). Keys: end_year,
    /// topic, sector, region, pestle, source, swot, country.
    #[arg(long = "filter", global = true, value_parser = parse_key_val)]
    filters: Vec<(String, String)>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Serve the configured dataset over HTTP.
    ///
    /// Binds to `[server].bind` and exposes the seven aggregate endpoints,
    /// dashboard stats, relevance, filtered records, filter options and
    /// rendered charts under `/api` and `/charts`.
    Serve,

    /// Print one aggregate.
    Aggregate {
        /// Aggregate kind: topic, intensity, likelihood, region, sector,
        /// country, year (or its endpoint name, e.g. `year-trend`).
        kind: String,

        /// Print the wire-format JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Render the dashboard to a directory of SVG files.
    Render {
        /// Output directory (defaults to `[render].out_dir`).
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Show dataset statistics.
    Stats,

    /// List the selectable values of each filter field.
    Options {
        /// Print JSON instead of a listing.
        #[arg(long)]
        json: bool,
    },

    /// List source strategies and check their health.
    Sources,

    /// Print a shell completion script.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

/// Parse a `key=value` pair for `--filter` arguments.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    Ok((s[..pos].trim().to_string(), s[pos + 1..].to_string()))
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pulseboard=info,pulseboard_core=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the config file; a missing default file means demo mode.
fn load(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() && path == Path::new(DEFAULT_CONFIG) {
        tracing::info!(
            "no config at {}, using built-in demo data",
            path.display()
        );
        return Ok(Config::minimal());
    }
    config::load_config(path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    // Commands that don't require config
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "pulse", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = load(&cli.config)?;
    let filters = query::resolve_filters(&cfg, &cli.filters)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Aggregate { kind, json } => {
            query::run_aggregate(&cfg, &kind, &filters, json).await?;
        }
        Commands::Render { out } => {
            report::run_render(&cfg, filters, out).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg, &filters)?;
        }
        Commands::Options { json } => {
            stats::run_options(&cfg, json)?;
        }
        Commands::Sources => {
            sources::list_sources(&cfg).await?;
        }
        Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
