//! Payload validation handler used by `queuebatch dispatch`.
//!
//! Lets operators replay a captured event and see which messages would be
//! reported for redelivery, without running the real business logic.

use async_trait::async_trait;
use queuebatch_core::{HandlerError, InvocationContext, MessageHandler};
use serde_json::Value;
use tracing::debug;

/// Accepts any JSON object that carries every required top-level field
/// with a non-null value.
pub struct RequiredFields {
    fields: Vec<String>,
}

impl RequiredFields {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }
}

#[async_trait]
impl MessageHandler for RequiredFields {
    type Payload = Value;

    async fn process(&self, payload: Value, _ctx: &InvocationContext) -> Result<(), HandlerError> {
        if self.fields.is_empty() {
            return Ok(());
        }

        let object = payload
            .as_object()
            .ok_or_else(|| HandlerError::msg("payload is not a JSON object"))?;

        let missing: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| object.get(f.as_str()).map_or(true, Value::is_null))
            .map(String::as_str)
            .collect();

        if !missing.is_empty() {
            return Err(HandlerError::msg(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )));
        }

        debug!(fields = self.fields.len(), "payload has all required fields");
        Ok(())
    }

    fn name(&self) -> &str {
        "RequiredFields"
    }
}
