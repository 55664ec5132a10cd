//! # queuebatch-observability
//!
//! OpenTelemetry-based observability for QueueBatch.
//!
//! ## Built-in metrics
//! - `queuebatch.messages_succeeded`  — counter, tagged with source
//! - `queuebatch.messages_failed`     — counter, tagged with source + kind
//! - `queuebatch.batch_size`          — histogram
//! - `queuebatch.handler_latency_ms`  — histogram, tagged with handler
//!
//! ## Structured logging
//! JSON-structured logs compatible with ELK, Loki, CloudWatch.
//! Log levels configurable per component.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::DispatchMetrics;
pub use tracing_setup::{build_filter, init_tracing, LogConfig};
