//! `BatchDispatcher` — runs one batch through a codec and a handler,
//! isolating each envelope's failure from its siblings.

use crate::config::DispatchConfig;
use crate::report::{BatchReport, MessageOutcome};
use futures::{stream, FutureExt, StreamExt};
use queuebatch_core::{
    Batch, BatchResult, DispatchError, InvocationContext, JsonCodec, MessageCodec,
    MessageEnvelope, MessageError, MessageHandler,
};
use queuebatch_observability::DispatchMetrics;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Dispatches every envelope of a batch to a [`MessageHandler`] and reports
/// which identifiers must be redelivered.
///
/// The dispatcher holds no per-batch state, so one instance can serve many
/// concurrent invocations.
///
/// # Usage
/// ```no_run
/// # use std::sync::Arc;
/// # use queuebatch_core::{Batch, InvocationContext, MessageHandler};
/// # use queuebatch_dispatch::BatchDispatcher;
/// # async fn example<H: MessageHandler>(handler: Arc<H>, batch: Batch)
/// # where H::Payload: serde::de::DeserializeOwned {
/// let dispatcher = BatchDispatcher::new(handler);
/// let ctx = InvocationContext::new("request-id");
/// let result = dispatcher.handle(&batch, &ctx).await.unwrap();
/// # }
/// ```
pub struct BatchDispatcher<H, C = JsonCodec> {
    handler: Arc<H>,
    codec: C,
    config: DispatchConfig,
    metrics: Option<DispatchMetrics>,
}

impl<H: MessageHandler> BatchDispatcher<H, JsonCodec> {
    /// Create a sequential dispatcher that decodes bodies as JSON.
    pub fn new(handler: Arc<H>) -> Self {
        Self {
            handler,
            codec: JsonCodec,
            config: DispatchConfig::default(),
            metrics: None,
        }
    }
}

impl<H, C> BatchDispatcher<H, C>
where
    H: MessageHandler,
    C: MessageCodec<H::Payload>,
{
    /// Replace the body codec.
    pub fn with_codec<C2: MessageCodec<H::Payload>>(self, codec: C2) -> BatchDispatcher<H, C2> {
        BatchDispatcher {
            handler: self.handler,
            codec,
            config: self.config,
            metrics: self.metrics,
        }
    }

    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_metrics(mut self, metrics: DispatchMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }

    /// Process a batch and return the partial batch response.
    ///
    /// Per-message failures never produce an `Err`; they are listed in
    /// [`BatchResult::failures`]. `Err` means the result itself could not be
    /// assembled and the whole batch should be redelivered.
    pub async fn handle(
        &self,
        batch: &Batch,
        ctx: &InvocationContext,
    ) -> Result<BatchResult, DispatchError> {
        Ok(self.handle_with_report(batch, ctx).await?.into_result())
    }

    /// Like [`handle`](Self::handle), but keeps every envelope's outcome.
    pub async fn handle_with_report(
        &self,
        batch: &Batch,
        ctx: &InvocationContext,
    ) -> Result<BatchReport, DispatchError> {
        let started = Instant::now();
        let concurrency = self.config.concurrency();

        info!(
            request_id = %ctx.request_id,
            handler = self.handler.name(),
            messages = batch.len(),
            concurrency,
            "BatchDispatcher: dispatching batch"
        );

        for id in batch.duplicate_identifiers() {
            warn!(identifier = id, "duplicate message identifier in batch");
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_batch(batch.len());
        }

        // buffer_unordered(1) runs envelopes strictly one after another;
        // with more slots, completion order is arbitrary so outcomes are
        // put back into envelope order before assembly.
        let mut outcomes: Vec<MessageOutcome> = stream::iter(batch.iter().enumerate())
            .map(|(index, envelope)| self.dispatch_one(index, envelope, ctx))
            .buffer_unordered(concurrency)
            .collect()
            .await;
        outcomes.sort_by_key(|o| o.index);

        let report = BatchReport::assemble(batch, outcomes).map_err(|e| {
            error!(request_id = %ctx.request_id, error = %e, "batch result assembly failed");
            e
        })?;

        info!(
            request_id = %ctx.request_id,
            succeeded = report.succeeded(),
            failed = report.failed(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "BatchDispatcher: complete"
        );

        Ok(report)
    }

    async fn dispatch_one(
        &self,
        index: usize,
        envelope: &MessageEnvelope,
        ctx: &InvocationContext,
    ) -> MessageOutcome {
        let span = info_span!(
            "message",
            identifier = %envelope.identifier,
            source = %envelope.source,
            index
        );

        async move {
            let started = Instant::now();
            debug!("processing message");

            let result = self.process_envelope(envelope, ctx).await;
            let elapsed = started.elapsed();

            match &result {
                Ok(()) => {
                    debug!(elapsed_ms = elapsed.as_millis() as u64, "message processed");
                    if let Some(metrics) = &self.metrics {
                        metrics.record_success(&envelope.source);
                    }
                }
                Err(e) => {
                    error!(
                        kind = e.kind(),
                        error = %e,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "message failed; marking for redelivery"
                    );
                    if let Some(metrics) = &self.metrics {
                        metrics.record_failure(&envelope.source, e);
                    }
                }
            }
            if let Some(metrics) = &self.metrics {
                metrics.record_latency(elapsed.as_secs_f64() * 1000.0, self.handler.name());
            }

            MessageOutcome::new(index, envelope.identifier.clone(), result, elapsed)
        }
        .instrument(span)
        .await
    }

    /// Decode → process for a single envelope. Every failure path returns
    /// `Err`; nothing escapes to sibling envelopes.
    async fn process_envelope(
        &self,
        envelope: &MessageEnvelope,
        ctx: &InvocationContext,
    ) -> Result<(), MessageError> {
        let until_deadline = self.until_deadline(ctx);
        if until_deadline == Some(Duration::ZERO) {
            return Err(MessageError::DeadlineExhausted);
        }
        let budget = self.time_budget(until_deadline);

        let payload = std::panic::catch_unwind(AssertUnwindSafe(|| {
            self.codec.decode(&envelope.body)
        }))
        .map_err(|panic| MessageError::Panicked {
            reason: format!("codec panicked: {}", panic_message(panic.as_ref())),
        })??;

        let call = AssertUnwindSafe(self.handler.process(payload, ctx)).catch_unwind();
        let outcome = match budget {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| MessageError::TimedOut {
                    ms: limit.as_millis() as u64,
                })?,
            None => call.await,
        };

        match outcome {
            Ok(result) => result.map_err(MessageError::from),
            Err(panic) => Err(MessageError::Panicked {
                reason: panic_message(panic.as_ref()),
            }),
        }
    }

    /// Time left before `deadline - margin`, or `None` for an unbounded invocation.
    fn until_deadline(&self, ctx: &InvocationContext) -> Option<Duration> {
        ctx.remaining()
            .map(|left| left.saturating_sub(self.config.deadline_margin_duration()))
    }

    /// How long the next `process` call may run: the smaller of the
    /// per-message timeout and the time left before the deadline.
    fn time_budget(&self, until_deadline: Option<Duration>) -> Option<Duration> {
        match (self.config.message_timeout_duration(), until_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
