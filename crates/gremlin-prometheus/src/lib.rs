//! Prometheus metrics backend for the load coordinator.
//!
//! [`PrometheusMetrics`] implements [`gremlin_load::LoadMetrics`] on a private [`Registry`].
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use gremlin_load::LoadCoordinator;
//! use gremlin_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let coordinator = LoadCoordinator::with_metrics(Arc::new(metrics.clone()));
//!
//! // Serve the text exposition format from your own `/metrics` route.
//! let body = metrics.render()?;
//! # let _ = (coordinator, body);
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `gremlin_load_tasks_started_total{kind}` - Counter
//! - `gremlin_load_runs_total{kind, outcome}` - Counter
//! - `gremlin_load_duration_seconds{kind}` - Histogram
//!
//! This crate does NOT serve HTTP; mount [`PrometheusMetrics::render`] in the application router.

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
