//! HTTP JSON-RPC chain client backed by `reqwest`.
//!
//! Every call selects its endpoint via [`EndpointPool::next`] immediately
//! before the request goes out. The client itself never retries: a transient
//! failure surfaces to the poll loop, and the loop's retry lands on the next
//! endpoint in rotation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::RpcError;
use crate::pool::EndpointPool;
use crate::request::{JsonRpcRequest, JsonRpcResponse};
use crate::types::{parse_hex_u64, RpcBlock, RpcTransaction};

/// The chain access trait the pipeline programs against.
///
/// `Option::None` return values mean the requested block or transaction does
/// not exist (yet) upstream. Not-found is not an error.
#[async_trait]
pub trait ChainRpc: Send + Sync + 'static {
    /// Current chain head height (`eth_blockNumber`).
    async fn latest_height(&self) -> Result<u64, RpcError>;

    /// Fetch a block by number (`eth_getBlockByNumber`).
    ///
    /// With `full_transactions` the node is asked to inline transaction
    /// bodies; whether it actually did is visible in the returned block's
    /// transaction shape.
    async fn block_by_number(
        &self,
        number: u64,
        full_transactions: bool,
    ) -> Result<Option<RpcBlock>, RpcError>;

    /// Fetch a single transaction by hash (`eth_getTransactionByHash`).
    async fn transaction_by_hash(&self, hash: &str)
        -> Result<Option<RpcTransaction>, RpcError>;
}

/// Configuration for [`HttpChainClient`].
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Timeout per individual request.
    pub request_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// reqwest-backed [`ChainRpc`] implementation over an [`EndpointPool`].
pub struct HttpChainClient {
    pool: Arc<EndpointPool>,
    http: reqwest::Client,
    request_timeout: Duration,
    req_id: AtomicU64,
}

impl HttpChainClient {
    pub fn new(pool: Arc<EndpointPool>, config: HttpClientConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("failed to build reqwest client");
        Self {
            pool,
            http,
            request_timeout: config.request_timeout,
            req_id: AtomicU64::new(1),
        }
    }

    pub fn default_for(pool: Arc<EndpointPool>) -> Self {
        Self::new(pool, HttpClientConfig::default())
    }

    /// Issue one JSON-RPC call against the next endpoint in rotation and
    /// deserialize the result. `null` results deserialize into `Option::None`
    /// for the methods that allow absence.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, RpcError> {
        let url = self.pool.next();
        let req = JsonRpcRequest::new(self.req_id.fetch_add(1, Ordering::Relaxed), method, params);

        tracing::debug!(method, url, "rpc call");

        let resp = self
            .http
            .post(url)
            .json(&req)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(RpcError::Http(format!("HTTP {status}: {body}")));
        }

        let resp: JsonRpcResponse = resp
            .json()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;
        let result = resp.into_result().map_err(RpcError::Rpc)?;
        serde_json::from_value(result).map_err(RpcError::Deserialization)
    }

    fn map_reqwest_error(&self, e: reqwest::Error) -> RpcError {
        if e.is_timeout() {
            RpcError::Timeout {
                ms: self.request_timeout.as_millis() as u64,
            }
        } else {
            RpcError::Http(e.to_string())
        }
    }
}

#[async_trait]
impl ChainRpc for HttpChainClient {
    async fn latest_height(&self) -> Result<u64, RpcError> {
        let height: String = self.call("eth_blockNumber", vec![]).await?;
        Ok(parse_hex_u64(&height))
    }

    async fn block_by_number(
        &self,
        number: u64,
        full_transactions: bool,
    ) -> Result<Option<RpcBlock>, RpcError> {
        self.call(
            "eth_getBlockByNumber",
            vec![json!(format!("0x{number:x}")), json!(full_transactions)],
        )
        .await
    }

    async fn transaction_by_hash(
        &self,
        hash: &str,
    ) -> Result<Option<RpcTransaction>, RpcError> {
        self.call("eth_getTransactionByHash", vec![json!(hash)]).await
    }
}
