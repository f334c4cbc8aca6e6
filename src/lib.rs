//! # Pulseboard
//!
//! A filterable analytics dashboard over a dataset of geopolitical and
//! economic records.
//!
//! Pulseboard aggregates records seven ways (topic, intensity, likelihood,
//! region, sector, country, year trend) under a shared filter set, fetches
//! those aggregates from a pluggable data source with graceful fallback,
//! and renders them as animated, interactive SVG charts.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Data source  │──▶│  Dashboard   │──▶│   Renderer   │
//! │ remote/local │   │  controller  │   │ scene + SVG  │
//! │ static/resil.│   │ (7 fetches)  │   │              │
//! └──────┬───────┘   └──────┬───────┘   └──────────────┘
//!        │                  │
//!        ▼                  ▼
//!   ┌──────────┐      ┌──────────┐
//!   │   HTTP   │      │   CLI    │
//!   │  (axum)  │      │ (pulse)  │
//!   └──────────┘      └──────────┘
//! ```
//!
//! The pure logic (models, filters, aggregation, chart rendering, source
//! strategies) lives in the `pulseboard-core` crate; this crate adds
//! configuration, dataset I/O, the HTTP source and server, the controller
//! and the commands.
//!
//! ## Quick Start
//!
//! ```bash
//! pulse serve                                # serve the dataset as an API
//! pulse aggregate topic --filter sector=Energy
//! pulse render --out ./dashboard             # write seven SVGs + index.html
//! pulse stats
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`dataset`] | Record dataset loading |
//! | [`remote`] | HTTP aggregate source |
//! | [`sources`] | Source strategy construction and health listing |
//! | [`controller`] | Dashboard state, refresh batches, notifications |
//! | [`server`] | HTTP data-source server |
//! | [`query`] | `pulse aggregate` |
//! | [`stats`] | `pulse stats` / `pulse options` |
//! | [`report`] | `pulse render` |

pub mod config;
pub mod controller;
pub mod dataset;
pub mod query;
pub mod remote;
pub mod report;
pub mod server;
pub mod sources;
pub mod stats;
