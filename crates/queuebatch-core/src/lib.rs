//! # queuebatch-core
//!
//! Core types and traits shared across all QueueBatch crates.
//! A queue trigger delivers a [`Batch`] of [`MessageEnvelope`]s; each body is
//! turned into a typed payload by a [`MessageCodec`] and handed to a
//! user-supplied [`MessageHandler`]. Failures are reported back as a
//! [`BatchResult`] listing only the identifiers the queue must redeliver.

pub mod codec;
pub mod context;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod result;

pub use codec::{JsonCodec, MessageCodec};
pub use context::InvocationContext;
pub use envelope::{Batch, MessageEnvelope};
pub use error::{DecodeError, DispatchError, HandlerError, MessageError};
pub use handler::MessageHandler;
pub use result::{BatchResult, FailureRecord};
