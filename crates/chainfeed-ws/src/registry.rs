//! The set of open subscriber connections.
//!
//! All mutation funnels through this registry's mutex; the broadcaster
//! iterates over a snapshot of handles, so sends never hold the lock. Both
//! the connection task and the broadcaster may remove the same subscriber;
//! removal is idempotent by design.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use chainfeed_core::FeedStatus;

/// Opaque handle identifying one subscriber connection.
pub type SubscriberId = u64;

/// Registry of open subscribers, keyed by id. Each entry holds the sending
/// half of that connection's bounded outbound queue.
pub struct SubscriberRegistry {
    inner: Mutex<HashMap<SubscriberId, mpsc::Sender<String>>>,
    next_id: AtomicU64,
    status: Arc<FeedStatus>,
}

impl SubscriberRegistry {
    pub fn new(status: Arc<FeedStatus>) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            status,
        }
    }

    /// Register a new subscriber's outbound queue; returns its id.
    pub fn add(&self, sender: mpsc::Sender<String>) -> SubscriberId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let count = {
            let mut inner = self.inner.lock().expect("registry lock poisoned");
            inner.insert(id, sender);
            inner.len()
        };
        self.status.set_subscribers(count);
        tracing::info!(subscriber = id, total = count, "subscriber connected");
        id
    }

    /// Remove a subscriber. Safe to call any number of times; returns whether
    /// this call removed it.
    pub fn remove(&self, id: SubscriberId) -> bool {
        let (removed, count) = {
            let mut inner = self.inner.lock().expect("registry lock poisoned");
            let removed = inner.remove(&id).is_some();
            (removed, inner.len())
        };
        if removed {
            self.status.set_subscribers(count);
            tracing::info!(subscriber = id, total = count, "subscriber removed");
        }
        removed
    }

    /// Snapshot of all open subscriber queues.
    pub fn senders(&self) -> Vec<(SubscriberId, mpsc::Sender<String>)> {
        self.inner
            .lock()
            .expect("registry lock poisoned")
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect()
    }

    /// Number of open subscribers.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
