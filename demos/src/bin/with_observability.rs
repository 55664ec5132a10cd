//! # with_observability
//!
//! Demonstrates dispatcher metrics and structured logging via
//! `queuebatch-observability`, including a per-message timeout and a
//! handler panic being contained to their own messages.
//!
//! Run with:
//! ```sh
//! cargo run --bin with_observability
//!
//! # With JSON logging:
//! LOG_JSON=1 cargo run --bin with_observability
//! ```

use anyhow::Result;
use async_trait::async_trait;
use opentelemetry::global;
use queuebatch_core::{Batch, HandlerError, InvocationContext, MessageEnvelope, MessageHandler};
use queuebatch_dispatch::{BatchDispatcher, DispatchConfig};
use queuebatch_observability::{init_tracing, DispatchMetrics, LogConfig};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Deserialize)]
struct Job {
    kind: String,
    #[serde(default)]
    work_ms: u64,
}

struct JobRunner;

#[async_trait]
impl MessageHandler for JobRunner {
    type Payload = Job;

    async fn process(&self, job: Job, _ctx: &InvocationContext) -> Result<(), HandlerError> {
        match job.kind.as_str() {
            "sleep" => {
                tokio::time::sleep(Duration::from_millis(job.work_ms)).await;
                Ok(())
            }
            "panic" => panic!("job runner hit an unrecoverable state"),
            other => Err(HandlerError::msg(format!("unknown job kind {other:?}"))),
        }
    }

    fn name(&self) -> &str {
        "JobRunner"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Initialise structured logging ──────────────────────────────────────
    let log_config = LogConfig {
        level: "info".into(),
        components: [("queuebatch_dispatch".into(), "debug".into())].into(),
        json: std::env::var("LOG_JSON").is_ok(),
    };
    init_tracing(&log_config);

    // ── 2. Metrics on the global meter (no-op without a provider) ────────────
    let metrics = DispatchMetrics::new(&global::meter("queuebatch-demo"));
    println!("QueueBatch — Observability Demo");
    println!("  metrics: queuebatch.messages_succeeded, queuebatch.messages_failed,");
    println!("           queuebatch.batch_size, queuebatch.handler_latency_ms");

    // ── 3. Dispatch a batch with a slow job, a panicking job and a bad kind ──
    let batch = Batch::new(vec![
        MessageEnvelope::new("job-1", r#"{"kind":"sleep","work_ms":10}"#, "aws:sqs"),
        MessageEnvelope::new("job-2", r#"{"kind":"sleep","work_ms":500}"#, "aws:sqs"),
        MessageEnvelope::new("job-3", r#"{"kind":"panic"}"#, "aws:sqs"),
        MessageEnvelope::new("job-4", r#"{"kind":"mystery"}"#, "aws:sqs"),
        MessageEnvelope::new("job-5", r#"{"kind":"sleep","work_ms":20}"#, "aws:sqs"),
    ]);

    let dispatcher = BatchDispatcher::new(std::sync::Arc::new(JobRunner))
        .with_config(DispatchConfig::concurrent(4).message_timeout(Duration::from_millis(100)))
        .with_metrics(metrics);

    let ctx = InvocationContext::new("demo-request").with_time_budget(Duration::from_secs(5));
    let report = dispatcher.handle_with_report(&batch, &ctx).await?;

    println!("\n─── Outcomes ────────────────────────────────────────");
    for outcome in report.outcomes() {
        println!(
            "  {:<6} {:<14} {}",
            outcome.identifier,
            outcome.status.to_string(),
            outcome.error.as_ref().map(|e| e.to_string()).unwrap_or_default()
        );
    }

    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "demo batch complete"
    );
    println!("\n  response: {}", serde_json::to_string(&report.result())?);
    Ok(())
}
