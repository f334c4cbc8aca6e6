//! # Pulseboard Core
//!
//! Shared, I/O-free logic for Pulseboard: the record model, filter
//! evaluation, aggregation, scales and colour ramps, the generalized chart
//! renderer with its SVG serializer, drawing surfaces, and the
//! [`AggregateSource`](source::AggregateSource) abstraction with its
//! in-process strategies.
//!
//! This crate performs no network or filesystem access and owns no async
//! runtime; the `pulseboard` crate supplies those.

pub mod aggregate;
pub mod chart;
pub mod color;
pub mod filter;
pub mod models;
pub mod scale;
pub mod source;
pub mod surface;
pub mod svg;
pub mod wire;
