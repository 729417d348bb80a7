//! In-process metrics.
//!
//! Request counters, latency histograms and the in-flight gauge are stored as
//! atomics keyed by label sets and rendered by the `/metrics` handler in the
//! Prometheus text exposition format.

pub mod metrics;

pub use metrics::{RequestObservation, ServiceMetrics, DURATION_BUCKETS_MICROS, NAMESPACE};
