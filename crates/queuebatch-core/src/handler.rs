//! The per-message handler capability.

use async_trait::async_trait;
use std::sync::Arc;

use crate::context::InvocationContext;
use crate::error::HandlerError;

/// Business logic for exactly one message.
///
/// Implement this for your payload type and hand it to the dispatcher.
/// Any `Err` (or panic) marks only the current message for redelivery; the
/// rest of the batch is still processed.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// The decoded form of a message body.
    type Payload: Send + 'static;

    /// Process one decoded payload.
    async fn process(
        &self,
        payload: Self::Payload,
        ctx: &InvocationContext,
    ) -> Result<(), HandlerError>;

    /// A name for the handler, used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

#[async_trait]
impl<H: MessageHandler + ?Sized> MessageHandler for Arc<H> {
    type Payload = H::Payload;

    async fn process(
        &self,
        payload: Self::Payload,
        ctx: &InvocationContext,
    ) -> Result<(), HandlerError> {
        (**self).process(payload, ctx).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Counter(AtomicU32);

    #[async_trait]
    impl MessageHandler for Counter {
        type Payload = u32;

        async fn process(&self, payload: u32, _ctx: &InvocationContext) -> Result<(), HandlerError> {
            if payload == 0 {
                return Err(HandlerError::msg("zero is not allowed"));
            }
            self.0.fetch_add(payload, Ordering::Relaxed);
            Ok(())
        }
    }

    #[tokio::test]
    async fn shared_handler_delegates() {
        let handler = Arc::new(Counter(AtomicU32::new(0)));
        let ctx = InvocationContext::new("req");

        handler.process(2, &ctx).await.unwrap();
        handler.process(3, &ctx).await.unwrap();
        assert!(handler.process(0, &ctx).await.is_err());

        assert_eq!(handler.0.load(Ordering::Relaxed), 5);
        assert!(handler.name().ends_with("Counter"));
    }
}
