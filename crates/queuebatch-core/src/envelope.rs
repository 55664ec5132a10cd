//! Batch and envelope types as delivered by a queue trigger.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One queue entry: the delivery wrapper around a raw message body.
///
/// Serde names follow the queue-trigger record format (`messageId`,
/// `body`, `eventSource`); unknown record keys such as `receiptHandle`
/// or `attributes` are ignored on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    /// Unique within the batch; the value reported back for redelivery
    #[serde(rename = "messageId")]
    pub identifier: String,
    /// Raw message text, typically JSON
    #[serde(default)]
    pub body: String,
    /// Origin tag used for diagnostics, e.g. "aws:sqs"
    #[serde(rename = "eventSource", default)]
    pub source: String,
}

impl MessageEnvelope {
    pub fn new(
        identifier: impl Into<String>,
        body: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            body: body.into(),
            source: source.into(),
        }
    }
}

/// An ordered, read-only set of envelopes handled by one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    #[serde(rename = "Records", default)]
    records: Vec<MessageEnvelope>,
}

impl Batch {
    pub fn new(records: Vec<MessageEnvelope>) -> Self {
        Self { records }
    }

    /// Parse a queue-trigger event (`{"Records": [...]}`).
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn records(&self) -> &[MessageEnvelope] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MessageEnvelope> {
        self.records.iter()
    }

    /// Returns `true` if `identifier` belongs to an envelope of this batch.
    pub fn contains(&self, identifier: &str) -> bool {
        self.records.iter().any(|r| r.identifier == identifier)
    }

    /// Identifiers that appear more than once, in first-repeat order.
    pub fn duplicate_identifiers(&self) -> Vec<&str> {
        let mut seen = HashSet::with_capacity(self.records.len());
        let mut dupes = Vec::new();
        for record in &self.records {
            let id = record.identifier.as_str();
            if !seen.insert(id) && !dupes.contains(&id) {
                dupes.push(id);
            }
        }
        dupes
    }
}

impl From<Vec<MessageEnvelope>> for Batch {
    fn from(records: Vec<MessageEnvelope>) -> Self {
        Self::new(records)
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a MessageEnvelope;
    type IntoIter = std::slice::Iter<'a, MessageEnvelope>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
