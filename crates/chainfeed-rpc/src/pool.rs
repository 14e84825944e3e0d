//! Round-robin endpoint pool.
//!
//! Every outbound chain call obtains its endpoint from the pool immediately
//! before the request, so consecutive calls (including retries issued by the
//! poll loop) spread load and fate across all configured upstreams: a failing
//! endpoint is never retried in-place.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Fixed, ordered set of upstream RPC endpoint URLs with a rotating cursor.
///
/// Rotation is strictly cyclic: N consecutive calls to [`next`](Self::next)
/// visit each of N endpoints exactly once. There is no health tracking here;
/// failure handling belongs to the caller's retry policy.
pub struct EndpointPool {
    urls: Vec<String>,
    cursor: AtomicUsize,
}

impl EndpointPool {
    /// Build a pool from a list of endpoint URLs.
    ///
    /// The list must be non-empty; an empty upstream set is a fatal startup
    /// condition the bootstrap layer rejects before constructing the pool.
    pub fn new(urls: Vec<String>) -> Self {
        assert!(!urls.is_empty(), "endpoint pool requires at least one URL");
        Self {
            urls,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Returns the next endpoint in round-robin order and advances the cursor.
    ///
    /// Never blocks, never fails; the cursor wraps modulo the pool size.
    pub fn next(&self) -> &str {
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % self.urls.len();
        &self.urls[idx]
    }

    /// Number of endpoints in the pool.
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Returns `true` if the pool has no endpoints. Unreachable after
    /// construction, kept for API completeness.
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// The configured endpoint URLs, in rotation order.
    pub fn urls(&self) -> &[String] {
        &self.urls
    }
}
