//! Partial batch response types.

use serde::{Deserialize, Serialize};

/// Identifies one envelope the queue must redeliver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FailureRecord {
    #[serde(rename = "itemIdentifier")]
    pub identifier: String,
}

impl FailureRecord {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }
}

/// The value returned to the invocation runtime for one batch.
///
/// `failures` is always serialized, as an empty array when every message
/// succeeded, so the runtime treats the whole batch as consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    #[serde(rename = "batchItemFailures", default)]
    pub failures: Vec<FailureRecord>,
}

impl BatchResult {
    pub fn new(failures: Vec<FailureRecord>) -> Self {
        Self { failures }
    }

    /// Returns `true` if nothing needs to be retried.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failed identifiers in the order their failures were recorded.
    pub fn failed_identifiers(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|f| f.identifier.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_failures_are_serialized() {
        let json = serde_json::to_string(&BatchResult::default()).unwrap();
        assert_eq!(json, r#"{"batchItemFailures":[]}"#);
    }

    #[test]
    fn failure_wire_shape() {
        let result = BatchResult::new(vec![FailureRecord::new("2")]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "batchItemFailures": [{ "itemIdentifier": "2" }] })
        );
        assert!(!result.is_success());
        assert_eq!(result.failed_identifiers().collect::<Vec<_>>(), vec!["2"]);
    }
}
