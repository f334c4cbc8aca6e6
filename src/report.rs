//! The `pulse render` command: a static dashboard on disk.
//!
//! Runs one controller refresh and writes each chart as `<kind>.svg` plus
//! an `index.html` laying them out with the active filters and any load
//! failures.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pulseboard_core::filter::FilterSet;
use pulseboard_core::models::AggregateKind;
use pulseboard_core::surface::{ChartSurface, Overlay};
use pulseboard_core::svg::escape;

use crate::config::Config;
use crate::controller::{Dashboard, LogNotifier, RefreshOutcome};
use crate::sources::source_from_config;

/// What `run_render` wrote.
#[derive(Debug)]
pub struct RenderReport {
    pub out_dir: PathBuf,
    pub charts: Vec<PathBuf>,
    pub failed: Vec<AggregateKind>,
}

/// Refresh a dashboard with `filters` and write it to `out` (or
/// `[render].out_dir`).
pub async fn run_render(
    config: &Config,
    filters: FilterSet,
    out: Option<PathBuf>,
) -> Result<RenderReport> {
    let out_dir = out.unwrap_or_else(|| config.render.out_dir.clone());
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let source = source_from_config(config)?;
    let dashboard = Dashboard::new(source, Arc::new(LogNotifier)).with_filters(filters);
    let failed = match dashboard.refresh().await {
        RefreshOutcome::Applied { failed } => failed,
        RefreshOutcome::Superseded => Vec::new(),
    };

    let overlay = Overlay::new();
    let charts = write_charts(&dashboard, &overlay, config, &out_dir)?;
    tracing::debug!(slots = overlay.len(), "chart surfaces released");

    let index = out_dir.join("index.html");
    std::fs::write(
        &index,
        index_html(&dashboard.filters(), &failed, &dashboard.source_name()),
    )
    .with_context(|| format!("Failed to write {}", index.display()))?;

    println!(
        "Rendered {} charts to {}",
        charts.len(),
        out_dir.display()
    );
    for kind in &failed {
        println!("  {:<12} failed to load (drawn empty)", kind.short_name());
    }

    Ok(RenderReport {
        out_dir,
        charts,
        failed,
    })
}

/// Mount one surface per chart on `overlay`, draw the dashboard's scene
/// into it and write the SVG. The surfaces unmount on return.
fn write_charts(
    dashboard: &Dashboard,
    overlay: &Overlay,
    config: &Config,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let viewport = config.render.viewport();
    let mut surfaces = Vec::with_capacity(AggregateKind::ALL.len());
    let mut charts = Vec::with_capacity(AggregateKind::ALL.len());
    for kind in AggregateKind::ALL {
        let mut surface = ChartSurface::mount(overlay);
        surface.draw(dashboard.scene(kind, viewport, config.render.legend_top_n));
        let path = out_dir.join(format!("{}.svg", kind.short_name()));
        std::fs::write(&path, surface.svg())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        charts.push(path);
        surfaces.push(surface);
    }
    debug_assert_eq!(overlay.len(), surfaces.len());
    Ok(charts)
}

fn index_html(filters: &FilterSet, failed: &[AggregateKind], source: &str) -> String {
    let generated = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    let mut html = String::new();
    html.push_str(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Pulseboard</title>\n<style>\n\
         body{font-family:sans-serif;margin:2rem;color:#212529}\n\
         .grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(660px,1fr));gap:1.5rem}\n\
         figure{margin:0;border:1px solid #dee2e6;border-radius:8px;padding:1rem}\n\
         .chip{display:inline-block;background:#e7f5ff;border-radius:12px;padding:2px 10px;margin-right:6px}\n\
         .error{color:#c92a2a}\n</style>\n</head>\n<body>\n<h1>Pulseboard</h1>\n",
    );

    let _ = writeln!(
        html,
        "<p>Source: {} &middot; generated {}</p>",
        escape(source),
        generated
    );
    let labels = filters.active_labels();
    if labels.is_empty() {
        html.push_str("<p>No filters applied</p>\n");
    } else {
        html.push_str("<p>");
        for label in &labels {
            let _ = write!(html, "<span class=\"chip\">{}</span>", escape(label));
        }
        html.push_str("</p>\n");
    }
    for kind in failed {
        let _ = writeln!(
            html,
            "<p class=\"error\">Failed to load {} data</p>",
            kind.endpoint()
        );
    }

    html.push_str("<div class=\"grid\">\n");
    for kind in AggregateKind::ALL {
        let _ = writeln!(
            html,
            "<figure><figcaption>{}</figcaption><object type=\"image/svg+xml\" data=\"{}.svg\"></object></figure>",
            kind.title(),
            kind.short_name()
        );
    }
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

/// Paths `run_render` writes into `dir`.
pub fn expected_outputs(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = AggregateKind::ALL
        .iter()
        .map(|k| dir.join(format!("{}.svg", k.short_name())))
        .collect();
    paths.push(dir.join("index.html"));
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use pulseboard_core::filter::FilterField;

    #[test]
    fn test_index_lists_filters_and_failures() {
        let filters = FilterSet::new().with(FilterField::Pestle, "Economic");
        let html = index_html(&filters, &[AggregateKind::Country], "remote+static");
        assert!(html.contains("PESTLE: Economic"));
        assert!(html.contains("Failed to load country-distribution data"));
        assert!(html.contains("data=\"year.svg\""));
    }

    #[tokio::test]
    async fn test_render_static_dashboard() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = parse_config("[source]\nmode = \"static\"\n").unwrap();
        let report = run_render(&config, FilterSet::new(), Some(tmp.path().to_path_buf()))
            .await
            .unwrap();
        assert!(report.failed.is_empty());
        for path in expected_outputs(tmp.path()) {
            assert!(path.exists(), "{} missing", path.display());
        }
        let topic = std::fs::read_to_string(tmp.path().join("topic.svg")).unwrap();
        assert!(topic.contains("economic growth"));
    }

    #[tokio::test]
    async fn test_charts_unmount_after_writing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = parse_config("[source]\nmode = \"static\"\n").unwrap();
        let dashboard = Dashboard::new(source_from_config(&config).unwrap(), Arc::new(LogNotifier));
        dashboard.refresh().await;

        let overlay = Overlay::new();
        let charts = write_charts(&dashboard, &overlay, &config, tmp.path()).unwrap();
        assert_eq!(charts.len(), AggregateKind::ALL.len());
        assert!(overlay.is_empty());
        assert!(overlay.visible().is_empty());

        let region = std::fs::read_to_string(tmp.path().join("region.svg")).unwrap();
        assert!(region.starts_with("<svg"));
    }
}
