//! Error types for the ingestion pipeline.

use thiserror::Error;

use chainfeed_rpc::RpcError;

/// Errors that can occur while fetching and assembling blocks.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The upstream RPC call failed.
    #[error("upstream error: {0}")]
    Upstream(#[from] RpcError),
}

impl FeedError {
    /// Returns `true` if retrying (within the same poll tick) may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Upstream(e) => e.is_transient(),
        }
    }
}
