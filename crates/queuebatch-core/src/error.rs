//! Error types for the QueueBatch dispatch pipeline.

use thiserror::Error;

/// Boxed error type accepted as the source of a [`HandlerError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while decoding a single message body.
///
/// Every variant carries the body length so failures can be diagnosed from
/// logs without echoing the (possibly sensitive) body itself.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Message body is empty ({body_len} bytes of whitespace)")]
    EmptyBody { body_len: usize },

    #[error("Malformed body ({body_len} bytes) at line {line}, column {column}: {reason}")]
    Syntax {
        body_len: usize,
        line: usize,
        column: usize,
        reason: String,
    },

    #[error("Body ({body_len} bytes) does not match the payload schema: {reason}")]
    Schema { body_len: usize, reason: String },

    #[error("Body truncated after {body_len} bytes: {reason}")]
    Truncated { body_len: usize, reason: String },
}

impl DecodeError {
    /// Map a `serde_json` failure onto the decode taxonomy.
    pub fn from_json(body: &str, err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        let body_len = body.len();
        if body.trim().is_empty() {
            return Self::EmptyBody { body_len };
        }
        match err.classify() {
            Category::Syntax | Category::Io => Self::Syntax {
                body_len,
                line: err.line(),
                column: err.column(),
                reason: err.to_string(),
            },
            Category::Data => Self::Schema {
                body_len,
                reason: err.to_string(),
            },
            Category::Eof => Self::Truncated {
                body_len,
                reason: err.to_string(),
            },
        }
    }

    /// Length of the offending body in bytes.
    pub fn body_len(&self) -> usize {
        match self {
            Self::EmptyBody { body_len }
            | Self::Syntax { body_len, .. }
            | Self::Schema { body_len, .. }
            | Self::Truncated { body_len, .. } => *body_len,
        }
    }
}

/// Failure signalled by a user-supplied [`MessageHandler`](crate::MessageHandler).
///
/// The dispatcher never inspects the cause; it only logs it.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl HandlerError {
    /// A handler failure described by a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap any error raised by the handler's own dependencies.
    pub fn new<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Wrap an error, prefixing it with what the handler was doing.
    pub fn with_context<E>(context: impl Into<String>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: format!("{}: {}", context.into(), err),
            source: Some(Box::new(err)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<BoxError> for HandlerError {
    fn from(err: BoxError) -> Self {
        Self {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err)
    }
}

/// Why one envelope ended up in the failure list.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Handler failed: {0}")]
    Handler(#[from] HandlerError),

    #[error("Handler panicked: {reason}")]
    Panicked { reason: String },

    #[error("Handler timed out after {ms}ms")]
    TimedOut { ms: u64 },

    #[error("Invocation deadline exhausted before processing started")]
    DeadlineExhausted,
}

impl MessageError {
    /// Stable label used as a log field and metric tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::Handler(_) => "handler",
            Self::Panicked { .. } => "panic",
            Self::TimedOut { .. } => "timeout",
            Self::DeadlineExhausted => "deadline",
        }
    }
}

/// Errors that abort a whole batch.
///
/// Per-message failures never surface here; this only signals that the
/// aggregated result could not be assembled, in which case the queue
/// redelivers the entire batch.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Batch result assembly failed: {reason}")]
    Assembly { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Named {
        name: String,
    }

    fn decode_err(body: &str) -> DecodeError {
        let err = serde_json::from_str::<Named>(body).unwrap_err();
        DecodeError::from_json(body, err)
    }

    #[test]
    fn syntax_error_keeps_position() {
        match decode_err("not-json") {
            DecodeError::Syntax {
                body_len, line, ..
            } => {
                assert_eq!(body_len, 8);
                assert_eq!(line, 1);
            }
            other => panic!("expected Syntax, got {other:?}"),
        }
    }

    #[test]
    fn schema_mismatch_is_classified() {
        let err = decode_err(r#"{"name": 42}"#);
        assert!(matches!(err, DecodeError::Schema { .. }));
        assert_eq!(err.body_len(), 12);
    }

    #[test]
    fn missing_field_is_schema_error() {
        assert!(matches!(decode_err(r#"{"x":1}"#), DecodeError::Schema { .. }));
    }

    #[test]
    fn truncated_and_empty_bodies() {
        assert!(matches!(decode_err(r#"{"name": "A""#), DecodeError::Truncated { .. }));
        assert!(matches!(decode_err(""), DecodeError::EmptyBody { body_len: 0 }));
    }

    #[test]
    fn whitespace_body_keeps_its_length() {
        let err = decode_err(" \n\t");
        assert!(matches!(err, DecodeError::EmptyBody { body_len: 3 }));
        assert_eq!(err.body_len(), 3);
    }

    #[test]
    fn message_error_kinds() {
        assert_eq!(MessageError::from(DecodeError::EmptyBody { body_len: 0 }).kind(), "decode");
        assert_eq!(MessageError::from(HandlerError::msg("boom")).kind(), "handler");
        assert_eq!(MessageError::TimedOut { ms: 10 }.kind(), "timeout");
        assert_eq!(MessageError::DeadlineExhausted.kind(), "deadline");
        assert_eq!(
            MessageError::Panicked { reason: "x".into() }.kind(),
            "panic"
        );
    }

    #[test]
    fn handler_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "connection reset");
        let err = HandlerError::with_context("saving employee", io);
        assert_eq!(err.message(), "saving employee: connection reset");
        assert!(std::error::Error::source(&err).is_some());
        assert!(std::error::Error::source(&HandlerError::msg("plain")).is_none());
    }
}
