//! The `MessageCodec` trait: raw message body → typed payload.
//!
//! Codecs are pure: no I/O, no state carried between calls. A body that only
//! partially matches the payload type is a decode failure; missing fields
//! are filled only where the payload type opts into serde defaults.

use crate::error::DecodeError;
use serde::de::DeserializeOwned;

/// Converts one envelope body into the payload type a handler expects.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so a single codec can serve
/// concurrently processed envelopes.
pub trait MessageCodec<P>: Send + Sync {
    fn decode(&self, body: &str) -> Result<P, DecodeError>;
}

/// JSON codec backed by `serde_json`. Works for any `DeserializeOwned` payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<P: DeserializeOwned> MessageCodec<P> for JsonCodec {
    fn decode(&self, body: &str) -> Result<P, DecodeError> {
        serde_json::from_str(body).map_err(|e| DecodeError::from_json(body, e))
    }
}
