//! Fan-out of decorated blocks to every open subscriber.
//!
//! The block serializes once; each subscriber gets the same string pushed
//! onto its bounded outbound queue with `try_send`, so publishing never
//! waits on a slow peer. A full queue means the subscriber cannot keep up
//! with the chain and is pruned on the spot, exactly like a closed one.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::error::TrySendError;

use chainfeed_core::{BlockSink, DecoratedBlock};

use crate::message::BlockMessage;
use crate::registry::SubscriberRegistry;

/// Publishes blocks to the subscriber registry. Send failures remove the
/// offending subscriber and never surface to the poll loop.
pub struct Broadcaster {
    registry: Arc<SubscriberRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<SubscriberRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl BlockSink for Broadcaster {
    async fn publish(&self, block: &DecoratedBlock) {
        let text = match serde_json::to_string(&BlockMessage::from(block)) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(block = block.number, error = %e, "failed to serialize block message");
                return;
            }
        };

        let mut sent = 0usize;
        for (id, sender) in self.registry.senders() {
            match sender.try_send(text.clone()) {
                Ok(()) => sent += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(subscriber = id, "subscriber queue full, pruning slow consumer");
                    self.registry.remove(id);
                }
                Err(TrySendError::Closed(_)) => {
                    self.registry.remove(id);
                }
            }
        }

        tracing::debug!(block = block.number, sent, "block published");
    }
}
