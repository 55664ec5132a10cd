//! # queuebatch-dispatch
//!
//! Turns one queue-trigger batch into independently processed messages and
//! reports back only the ones that must be retried.
//!
//! ## Features
//! - Per-message isolation: decode errors, handler errors, panics and
//!   timeouts each fail only their own message
//! - Sequential by default, bounded concurrency on request
//! - Per-message timeout and invocation-deadline awareness: envelopes that
//!   cannot start in time are reported as failed, never dropped
//! - Optional OpenTelemetry metrics
//!
//! ## Architecture
//! ```text
//! Batch ──► BatchDispatcher ──► for each envelope (in order):
//!                                   MessageCodec::decode
//!                                         │
//!                                         ▼
//!                                   MessageHandler::process
//!                                         │
//!                                         ▼
//!                                   MessageOutcome
//!            BatchReport ◄── assemble (envelope order)
//!                 │
//!                 ▼
//!            BatchResult { batchItemFailures }
//! ```

pub mod config;
pub mod dispatcher;
pub mod report;

pub use config::DispatchConfig;
pub use dispatcher::BatchDispatcher;
pub use report::{BatchReport, MessageOutcome, MessageStatus};
