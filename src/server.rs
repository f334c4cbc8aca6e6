//! HTTP data-source server.
//!
//! Serves a loaded record dataset over the same JSON API the dashboard's
//! remote source consumes, so one `pulse` process can act as the data
//! source for another.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/{endpoint}` | One of the seven aggregates, in its wire shape |
//! | `GET` | `/api/dashboard-stats` | Headline statistics |
//! | `GET` | `/api/relevance-chart` | Mean relevance per topic |
//! | `GET` | `/api/filter` | The matching records |
//! | `GET` | `/api/filter-options` | Selectable values per filter field |
//! | `GET` | `/charts/{kind}` | A rendered chart as SVG |
//! | `GET` | `/health` | Health check (returns version) |
//!
//! Every data route accepts the filter vocabulary as query parameters
//! (`?sector=Energy&end_year=2027`). Aggregate responses carry an `ETag`
//! derived from the dataset digest and the filter fingerprint, and honour
//! `If-None-Match`.
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "unknown aggregate kind 'pestle'" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser dashboards
//! can call the API directly.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use pulseboard_core::aggregate::{dashboard_stats, filter_options, filtered, relevance_by_topic};
use pulseboard_core::chart::{encoding_for, render};
use pulseboard_core::filter::{FilterSet, MatchMode};
use pulseboard_core::models::{dataset_digest, AggregateKind, Record};
use pulseboard_core::source::LocalSource;
use pulseboard_core::svg::to_svg;
use pulseboard_core::wire;

use crate::config::{Config, RenderConfig};
use crate::dataset;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    /// Cached aggregation over the loaded records.
    local: Arc<LocalSource>,
    /// Digest of the served records; part of every ETag.
    digest: Arc<str>,
    mode: MatchMode,
    render: Arc<RenderConfig>,
}

impl AppState {
    fn records(&self) -> &[Record] {
        self.local.records()
    }

    fn filters(&self, params: Vec<(String, String)>) -> FilterSet {
        FilterSet::from_pairs(params).with_mode(self.mode)
    }
}

/// Build the router over `records`. Used by [`run_server`] and by tests
/// that bind their own listener.
pub fn build_router(records: Arc<Vec<Record>>, config: &Config) -> Router {
    let digest: Arc<str> = dataset_digest(&records).into();
    let state = AppState {
        local: Arc::new(LocalSource::new(records)),
        digest,
        mode: config.filters.match_mode(),
        render: Arc::new(config.render.clone()),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/dashboard-stats", get(handle_stats))
        .route("/api/relevance-chart", get(handle_relevance))
        .route("/api/filter", get(handle_filter))
        .route("/api/filter-options", get(handle_filter_options))
        .route("/api/{endpoint}", get(handle_aggregate))
        .route("/charts/{kind}", get(handle_chart))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

/// Start the server on `[server].bind`, serving `[dataset].path`.
///
/// Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let records = dataset::require_records(config)?;
    let count = records.len();
    let app = build_router(records, config);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(bind = %config.server.bind, records = count, "data source listening");
    println!("Pulseboard API listening on http://{}/api", config.server.bind);

    axum::serve(listener, app).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found",
        message: message.into(),
    }
}

fn internal(err: anyhow::Error) -> AppError {
    tracing::error!(error = %format!("{:#}", err), "request failed");
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal",
        message: err.to_string(),
    }
}

fn parse_kind(name: &str) -> Result<AggregateKind, AppError> {
    name.parse::<AggregateKind>()
        .map_err(|e| not_found(e.to_string()))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /api/{endpoint} ============

/// Aggregate in its wire shape. Answers `304` when `If-None-Match`
/// carries the current ETag.
async fn handle_aggregate(
    State(state): State<AppState>,
    Path(endpoint): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let kind = parse_kind(&endpoint)?;
    let filters = state.filters(params);
    let etag = format!("\"{}-{}\"", &state.digest[..16], filters.fingerprint());

    let fresh = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.split(',').any(|t| t.trim() == etag));
    let etag_value = HeaderValue::from_str(&etag).map_err(|e| internal(e.into()))?;
    if fresh {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag_value)]).into_response());
    }

    let entries = state.local.aggregate(kind, &filters);
    let body = wire::encode(kind, &entries).map_err(internal)?;
    Ok(([(header::ETAG, etag_value)], Json(body)).into_response())
}

// ============ GET /api/dashboard-stats ============

async fn handle_stats(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let filters = state.filters(params);
    Json(dashboard_stats(state.records(), &filters)).into_response()
}

// ============ GET /api/relevance-chart ============

async fn handle_relevance(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let filters = state.filters(params);
    Json(relevance_by_topic(state.records(), &filters)).into_response()
}

// ============ GET /api/filter ============

async fn handle_filter(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let filters = state.filters(params);
    let records: Vec<&Record> = filtered(state.records(), &filters).collect();
    Json(records).into_response()
}

// ============ GET /api/filter-options ============

async fn handle_filter_options(State(state): State<AppState>) -> Response {
    Json(filter_options(state.records())).into_response()
}

// ============ GET /charts/{kind} ============

async fn handle_chart(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let kind_name = kind.trim_end_matches(".svg");
    let kind = parse_kind(kind_name)?;
    let filters = state.filters(params);
    let entries = state.local.aggregate(kind, &filters);
    let encoding = encoding_for(kind).with_legend_top_n(state.render.legend_top_n);
    let svg = to_svg(&render(&entries, &encoding, state.render.viewport()));
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}
