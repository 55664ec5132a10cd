//! Per-envelope outcomes and the batch report built from them.

use queuebatch_core::{Batch, BatchResult, DispatchError, FailureRecord, MessageError};
use std::time::Duration;

/// Terminal state of one envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStatus {
    /// Decoded and the handler returned `Ok`.
    Succeeded,
    /// The handler returned an error, or the codec or handler panicked.
    Failed,
    /// The body could not be decoded; the handler was never called.
    DecodeFailed,
    /// The handler did not finish within its time budget.
    TimedOut,
    /// The invocation deadline had passed before this envelope started.
    Skipped,
}

impl MessageStatus {
    /// Every status except `Succeeded` needs redelivery.
    pub fn needs_retry(self) -> bool {
        !matches!(self, Self::Succeeded)
    }

    fn from_error(err: &MessageError) -> Self {
        match err {
            MessageError::Decode(_) => Self::DecodeFailed,
            MessageError::Handler(_) | MessageError::Panicked { .. } => Self::Failed,
            MessageError::TimedOut { .. } => Self::TimedOut,
            MessageError::DeadlineExhausted => Self::Skipped,
        }
    }
}

impl std::fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::DecodeFailed => write!(f, "decode-failed"),
            Self::TimedOut => write!(f, "timed-out"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// What happened to one envelope.
#[derive(Debug)]
pub struct MessageOutcome {
    /// Position of the envelope in the input batch
    pub index: usize,
    pub identifier: String,
    pub status: MessageStatus,
    /// Set for every status except `Succeeded`
    pub error: Option<MessageError>,
    pub elapsed: Duration,
}

impl MessageOutcome {
    pub(crate) fn new(
        index: usize,
        identifier: String,
        result: Result<(), MessageError>,
        elapsed: Duration,
    ) -> Self {
        let (status, error) = match result {
            Ok(()) => (MessageStatus::Succeeded, None),
            Err(e) => (MessageStatus::from_error(&e), Some(e)),
        };
        Self {
            index,
            identifier,
            status,
            error,
            elapsed,
        }
    }
}

/// Ordered outcomes for a whole batch, one per input envelope.
#[derive(Debug)]
pub struct BatchReport {
    outcomes: Vec<MessageOutcome>,
}

impl BatchReport {
    /// Check outcomes against the input batch and wrap them.
    ///
    /// `outcomes` must already be in envelope order. A count or identity
    /// mismatch is an internal invariant violation and fails the batch.
    pub(crate) fn assemble(
        batch: &Batch,
        outcomes: Vec<MessageOutcome>,
    ) -> Result<Self, DispatchError> {
        if outcomes.len() != batch.len() {
            return Err(DispatchError::Assembly {
                reason: format!(
                    "{} outcomes recorded for {} envelopes",
                    outcomes.len(),
                    batch.len()
                ),
            });
        }

        for (position, (outcome, envelope)) in outcomes.iter().zip(batch.iter()).enumerate() {
            if outcome.index != position || outcome.identifier != envelope.identifier {
                return Err(DispatchError::Assembly {
                    reason: format!(
                        "outcome for '{}' (index {}) does not match envelope '{}' at index {}",
                        outcome.identifier, outcome.index, envelope.identifier, position
                    ),
                });
            }
        }

        Ok(Self { outcomes })
    }

    pub fn outcomes(&self) -> &[MessageOutcome] {
        &self.outcomes
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == MessageStatus::Succeeded)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// Outcomes that need redelivery, in envelope order.
    pub fn failures(&self) -> impl Iterator<Item = &MessageOutcome> {
        self.outcomes.iter().filter(|o| o.status.needs_retry())
    }

    /// The partial batch response for the invocation runtime.
    pub fn result(&self) -> BatchResult {
        BatchResult::new(
            self.failures()
                .map(|o| FailureRecord::new(o.identifier.clone()))
                .collect(),
        )
    }

    pub fn into_result(self) -> BatchResult {
        self.result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use queuebatch_core::{DecodeError, HandlerError, MessageEnvelope};

    fn batch(ids: &[&str]) -> Batch {
        Batch::new(
            ids.iter()
                .map(|id| MessageEnvelope::new(*id, "{}", "test"))
                .collect(),
        )
    }

    fn outcome(index: usize, id: &str, result: Result<(), MessageError>) -> MessageOutcome {
        MessageOutcome::new(index, id.to_string(), result, Duration::from_millis(1))
    }

    #[test]
    fn statuses_follow_error_kind() {
        let decode = outcome(0, "a", Err(DecodeError::EmptyBody { body_len: 0 }.into()));
        let handler = outcome(1, "b", Err(HandlerError::msg("no").into()));
        let timeout = outcome(2, "c", Err(MessageError::TimedOut { ms: 5 }));
        let skipped = outcome(3, "d", Err(MessageError::DeadlineExhausted));
        let ok = outcome(4, "e", Ok(()));

        assert_eq!(decode.status, MessageStatus::DecodeFailed);
        assert_eq!(handler.status, MessageStatus::Failed);
        assert_eq!(timeout.status, MessageStatus::TimedOut);
        assert_eq!(skipped.status, MessageStatus::Skipped);
        assert_eq!(ok.status, MessageStatus::Succeeded);
        assert!(ok.error.is_none());
        assert!(skipped.status.needs_retry());
    }

    #[test]
    fn report_lists_failures_in_order() {
        let input = batch(&["1", "2", "3"]);
        let report = BatchReport::assemble(
            &input,
            vec![
                outcome(0, "1", Err(HandlerError::msg("x").into())),
                outcome(1, "2", Ok(())),
                outcome(2, "3", Err(DecodeError::EmptyBody { body_len: 0 }.into())),
            ],
        )
        .unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 2);
        let ids: Vec<_> = report.result().failed_identifiers().map(String::from).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn count_mismatch_is_fatal() {
        let input = batch(&["1", "2"]);
        let err = BatchReport::assemble(&input, vec![outcome(0, "1", Ok(()))]).unwrap_err();
        assert!(err.to_string().contains("1 outcomes recorded for 2 envelopes"));
    }

    #[test]
    fn identity_mismatch_is_fatal() {
        let input = batch(&["1", "2"]);
        let result = BatchReport::assemble(
            &input,
            vec![outcome(1, "2", Ok(())), outcome(0, "1", Ok(()))],
        );
        assert!(matches!(result, Err(DispatchError::Assembly { .. })));
    }

    #[test]
    fn status_display() {
        assert_eq!(MessageStatus::DecodeFailed.to_string(), "decode-failed");
        assert_eq!(MessageStatus::Skipped.to_string(), "skipped");
    }
}
