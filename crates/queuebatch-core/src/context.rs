//! Request-scoped invocation metadata passed to every handler call.

use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Metadata for one invocation of the batch handler.
///
/// The dispatcher passes the same context, unmodified, to every
/// [`MessageHandler::process`](crate::MessageHandler::process) call in a batch.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    /// Runtime-assigned id of this invocation
    pub request_id: String,
    /// Name of the deployed function, when the runtime provides one
    pub function_name: Option<String>,
    /// Point in time after which the runtime abandons the invocation
    pub deadline: Option<Instant>,
    /// Free-form metadata forwarded from the runtime
    pub attributes: HashMap<String, String>,
}

impl InvocationContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            function_name: None,
            deadline: None,
            attributes: HashMap::new(),
        }
    }

    pub fn with_function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = Some(name.into());
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set the deadline relative to now.
    pub fn with_time_budget(self, budget: Duration) -> Self {
        self.with_deadline(Instant::now() + budget)
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Time left before the deadline. `None` when the invocation is unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}
