//! Lightweight in-process metrics (dependency-free).
//!
//! Counts access decisions, evaluation errors and policy writes, and records
//! evaluation latency. Rendered in Prometheus text format by whoever embeds
//! the engine.

pub mod metrics;

pub use metrics::AclMetrics;
