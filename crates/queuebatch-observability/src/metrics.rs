//! QueueBatch metrics definitions.
//!
//! All metrics use OpenTelemetry conventions.
//! They can be exported via OTLP to Prometheus, Grafana, Datadog, etc.

use opentelemetry::{
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};
use queuebatch_core::MessageError;

/// Central metrics handle for the dispatcher.
#[derive(Clone)]
pub struct DispatchMetrics {
    pub messages_succeeded: Counter<u64>,
    pub messages_failed: Counter<u64>,
    pub batch_size: Histogram<u64>,
    pub handler_latency_ms: Histogram<f64>,
}

impl DispatchMetrics {
    pub fn new(meter: &Meter) -> Self {
        Self {
            messages_succeeded: meter
                .u64_counter("queuebatch.messages_succeeded")
                .with_description("Messages whose handler completed successfully")
                .build(),
            messages_failed: meter
                .u64_counter("queuebatch.messages_failed")
                .with_description("Messages reported back to the queue for redelivery")
                .build(),
            batch_size: meter
                .u64_histogram("queuebatch.batch_size")
                .with_description("Number of envelopes in a dispatched batch")
                .build(),
            handler_latency_ms: meter
                .f64_histogram("queuebatch.handler_latency_ms")
                .with_description("Time spent decoding and processing one message in milliseconds")
                .build(),
        }
    }

    /// Metrics bound to the process-wide global meter provider.
    pub fn global() -> Self {
        Self::new(&opentelemetry::global::meter("queuebatch"))
    }

    pub fn record_success(&self, source: &str) {
        self.messages_succeeded
            .add(1, &[KeyValue::new("source", source.to_string())]);
    }

    pub fn record_failure(&self, source: &str, err: &MessageError) {
        self.messages_failed.add(
            1,
            &[
                KeyValue::new("source", source.to_string()),
                KeyValue::new("kind", err.kind()),
            ],
        );
    }

    pub fn record_batch(&self, size: usize) {
        self.batch_size.record(size as u64, &[]);
    }

    pub fn record_latency(&self, ms: f64, handler: &str) {
        self.handler_latency_ms
            .record(ms, &[KeyValue::new("handler", handler.to_string())]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use queuebatch_core::DecodeError;

    #[test]
    fn recording_against_noop_provider_is_harmless() {
        let metrics = DispatchMetrics::new(&opentelemetry::global::meter("queuebatch-test"));
        metrics.record_batch(3);
        metrics.record_success("aws:sqs");
        metrics.record_failure("aws:sqs", &MessageError::Decode(DecodeError::EmptyBody { body_len: 0 }));
        metrics.record_latency(1.5, "EmployeeHandler");
    }
}
