//! Transport-level error types.

use thiserror::Error;

use crate::request::JsonRpcError;

/// Errors that can occur while talking to an upstream RPC endpoint.
#[derive(Debug, Error)]
pub enum RpcError {
    /// HTTP request failed (connection refused, DNS, non-2xx response).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// Response could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

impl RpcError {
    /// Returns `true` if this error is transient and the caller may retry
    /// (on a different endpoint, via the pool's rotation).
    ///
    /// Node-side execution errors are not transient: the same request will
    /// fail the same way everywhere.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transience_classification() {
        assert!(RpcError::Http("connection refused".into()).is_transient());
        assert!(RpcError::Timeout { ms: 5000 }.is_transient());
        assert!(!RpcError::Rpc(JsonRpcError {
            code: -32000,
            message: "header not found".into(),
            data: None,
        })
        .is_transient());
    }
}
