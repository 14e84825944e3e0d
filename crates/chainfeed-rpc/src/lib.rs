//! chainfeed-rpc — upstream access layer for the Chainfeed pipeline.
//!
//! # Overview
//!
//! Everything the pipeline needs to talk to an EVM chain lives here:
//!
//! - [`EndpointPool`] — rotating set of upstream RPC URLs
//! - [`ChainRpc`] — the async trait the rest of the pipeline programs against
//! - [`HttpChainClient`] — reqwest-backed implementation, one endpoint
//!   rotation per call
//! - [`RpcError`] — structured transport error with a transience predicate
//!
//! The client performs no retries of its own; retry policy belongs to the
//! poll loop that drives it.

pub mod client;
pub mod error;
pub mod pool;
pub mod request;
pub mod types;

pub use client::{ChainRpc, HttpChainClient, HttpClientConfig};
pub use error::RpcError;
pub use pool::EndpointPool;
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use types::{BlockTransactions, RpcBlock, RpcTransaction};
