//! Process-wide feed status: a cheap, lock-light read for health surfaces.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::RwLock;

use serde::Serialize;

/// Shared status written by the poller and the subscriber registry.
///
/// Number and subscriber count are atomics; only the hash takes a short
/// read/write lock.
#[derive(Debug, Default)]
pub struct FeedStatus {
    block_number: AtomicU64,
    block_hash: RwLock<String>,
    subscribers: AtomicUsize,
}

/// A point-in-time copy of the feed status.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusSnapshot {
    #[serde(rename = "connectedClients")]
    pub connected_clients: usize,
    #[serde(rename = "lastBlockNumber")]
    pub last_block_number: String,
    #[serde(rename = "lastBlockHash")]
    pub last_block_hash: String,
}

impl FeedStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the last processed block. Called by the poller only.
    pub fn set_marker(&self, number: u64, hash: &str) {
        self.block_number.store(number, Ordering::Relaxed);
        *self.block_hash.write().expect("status hash lock poisoned") = hash.to_string();
    }

    /// Record the current subscriber count. Called by the registry only.
    pub fn set_subscribers(&self, count: usize) {
        self.subscribers.store(count, Ordering::Relaxed);
    }

    pub fn subscribers(&self) -> usize {
        self.subscribers.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            connected_clients: self.subscribers.load(Ordering::Relaxed),
            last_block_number: self.block_number.load(Ordering::Relaxed).to_string(),
            last_block_hash: self.block_hash.read().expect("status hash lock poisoned").clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_writes() {
        let status = FeedStatus::new();
        status.set_marker(1234, "0xabc");
        status.set_subscribers(3);

        let snap = status.snapshot();
        assert_eq!(snap.connected_clients, 3);
        assert_eq!(snap.last_block_number, "1234");
        assert_eq!(snap.last_block_hash, "0xabc");
    }

    #[test]
    fn snapshot_serializes_with_wire_keys() {
        let status = FeedStatus::new();
        status.set_marker(7, "0x7");
        let json = serde_json::to_value(status.snapshot()).unwrap();
        assert_eq!(json["connectedClients"], 0);
        assert_eq!(json["lastBlockNumber"], "7");
        assert_eq!(json["lastBlockHash"], "0x7");
    }
}
