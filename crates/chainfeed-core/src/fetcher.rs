//! Block fetching and decoration.
//!
//! A fetch asks the node for the block with full transaction bodies; nodes
//! that answer with bare hashes get each transaction hydrated individually.
//! Hydration runs concurrently but order-preserving, and a transaction that
//! fails to hydrate is dropped with a warning rather than failing the block.
//! Stats are folded in a single pass after hydration joins.

use std::sync::Arc;

use futures::{stream, StreamExt};

use chainfeed_rpc::{BlockTransactions, ChainRpc, RpcBlock, RpcTransaction};

use crate::classify::classify;
use crate::error::FeedError;
use crate::types::{CategoryStats, DecoratedBlock, Transaction};

/// Upper bound on in-flight hydration requests per block.
const HYDRATION_CONCURRENCY: usize = 8;

/// Fetches blocks and decorates them with per-transaction categories and
/// aggregate counts.
pub struct BlockFetcher<C> {
    client: Arc<C>,
}

impl<C: ChainRpc> BlockFetcher<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Fetch and decorate the block at `number`.
    ///
    /// `Ok(None)` means the height does not exist upstream yet; errors are
    /// transport-level and candidates for the caller's retry policy.
    pub async fn fetch(&self, number: u64) -> Result<Option<DecoratedBlock>, FeedError> {
        let Some(block) = self.client.block_by_number(number, true).await? else {
            return Ok(None);
        };

        let raw_txs = match &block.transactions {
            BlockTransactions::Full(txs) => txs.clone(),
            BlockTransactions::Hashes(hashes) => {
                tracing::debug!(
                    block = number,
                    count = hashes.len(),
                    "node returned hashes only, hydrating transactions"
                );
                self.hydrate(number, hashes.clone()).await
            }
        };

        Ok(Some(decorate(&block, raw_txs)))
    }

    /// Hydrate transaction bodies concurrently, preserving block order.
    ///
    /// Failed or missing transactions collapse to gaps which are dropped
    /// after the join; the block-level fetch never fails here.
    async fn hydrate(&self, block_number: u64, hashes: Vec<String>) -> Vec<RpcTransaction> {
        let results: Vec<Option<RpcTransaction>> = stream::iter(hashes)
            .map(|hash| {
                let client = Arc::clone(&self.client);
                async move {
                    match client.transaction_by_hash(&hash).await {
                        Ok(Some(tx)) => Some(tx),
                        Ok(None) => {
                            tracing::warn!(block = block_number, tx = %hash, "transaction not found, dropping");
                            None
                        }
                        Err(e) => {
                            tracing::warn!(block = block_number, tx = %hash, error = %e, "transaction hydration failed, dropping");
                            None
                        }
                    }
                }
            })
            .buffered(HYDRATION_CONCURRENCY)
            .collect()
            .await;

        results.into_iter().flatten().collect()
    }
}

/// Run every transaction through the classifier and fold the stats.
fn decorate(block: &RpcBlock, raw_txs: Vec<RpcTransaction>) -> DecoratedBlock {
    let mut stats = CategoryStats::default();
    let transactions: Vec<Transaction> = raw_txs
        .into_iter()
        .map(|tx| {
            let value = tx.value_u256();
            let category = classify(tx.to.as_deref(), &tx.input, value);
            stats.record(category);
            Transaction {
                hash: tx.hash,
                from: tx.from,
                to: tx.to,
                value,
                input: tx.input,
                category,
            }
        })
        .collect();

    DecoratedBlock {
        number: block.number_u64(),
        hash: block.hash.clone(),
        parent_hash: block.parent_hash.clone(),
        timestamp: block.timestamp_u64(),
        gas_used: block.gas_used_u64(),
        gas_limit: block.gas_limit_u64(),
        base_fee_per_gas: block.base_fee_per_gas_u64(),
        transactions,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chainfeed_rpc::RpcError;

    use crate::types::TxCategory;

    /// Mock node: serves one block (hashes-only or full) and a tx-by-hash map.
    struct MockRpc {
        block: Option<RpcBlock>,
        txs: HashMap<String, RpcTransaction>,
        /// Hashes that fail with a transient error when hydrated.
        failing: Vec<String>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChainRpc for MockRpc {
        async fn latest_height(&self) -> Result<u64, RpcError> {
            Ok(self.block.as_ref().map(|b| b.number_u64()).unwrap_or(0))
        }

        async fn block_by_number(
            &self,
            _number: u64,
            _full: bool,
        ) -> Result<Option<RpcBlock>, RpcError> {
            Ok(self.block.clone())
        }

        async fn transaction_by_hash(
            &self,
            hash: &str,
        ) -> Result<Option<RpcTransaction>, RpcError> {
            self.calls.lock().unwrap().push(hash.to_string());
            if self.failing.iter().any(|h| h == hash) {
                return Err(RpcError::Http("connection reset".into()));
            }
            Ok(self.txs.get(hash).cloned())
        }
    }

    fn tx(hash: &str, input: &str) -> RpcTransaction {
        RpcTransaction {
            hash: hash.into(),
            from: "0xf00".into(),
            to: Some("0xbar".into()),
            value: "0x1".into(),
            input: input.into(),
        }
    }

    fn block_with(transactions: BlockTransactions) -> RpcBlock {
        RpcBlock {
            number: "0x65".into(),
            hash: "0xb10c".into(),
            parent_hash: "0xb0ff".into(),
            timestamp: "0x65f0c800".into(),
            gas_used: "0x5208".into(),
            gas_limit: "0x1c9c380".into(),
            base_fee_per_gas: Some("0x3b9aca00".into()),
            transactions,
        }
    }

    #[tokio::test]
    async fn fetch_full_block_decorates() {
        let rpc = MockRpc {
            block: Some(block_with(BlockTransactions::Full(vec![
                tx("0x1", "0x"),
                tx("0x2", "0x38ed1739aabb"),
            ]))),
            txs: HashMap::new(),
            failing: vec![],
            calls: Mutex::new(vec![]),
        };
        let fetcher = BlockFetcher::new(Arc::new(rpc));

        let block = fetcher.fetch(101).await.unwrap().unwrap();
        assert_eq!(block.number, 101);
        assert_eq!(block.transactions.len(), 2);
        assert_eq!(block.transactions[0].category, TxCategory::Transfer);
        assert_eq!(block.transactions[1].category, TxCategory::DexSwap);
        assert_eq!(block.stats.transfer, 1);
        assert_eq!(block.stats.dex_swap, 1);
        assert_eq!(block.base_fee_per_gas, Some(1_000_000_000));
    }

    #[tokio::test]
    async fn fetch_missing_block_is_none() {
        let rpc = MockRpc {
            block: None,
            txs: HashMap::new(),
            failing: vec![],
            calls: Mutex::new(vec![]),
        };
        let fetcher = BlockFetcher::new(Arc::new(rpc));
        assert!(fetcher.fetch(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn hydration_preserves_order() {
        let hashes: Vec<String> = (0..5).map(|i| format!("0x{i}")).collect();
        let txs = hashes
            .iter()
            .map(|h| (h.clone(), tx(h, "0x")))
            .collect::<HashMap<_, _>>();
        let rpc = MockRpc {
            block: Some(block_with(BlockTransactions::Hashes(hashes.clone()))),
            txs,
            failing: vec![],
            calls: Mutex::new(vec![]),
        };
        let fetcher = BlockFetcher::new(Arc::new(rpc));

        let block = fetcher.fetch(101).await.unwrap().unwrap();
        let got: Vec<&str> = block.transactions.iter().map(|t| t.hash.as_str()).collect();
        assert_eq!(got, hashes.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn partial_hydration_failure_tolerated() {
        let hashes: Vec<String> = (0..5).map(|i| format!("0x{i}")).collect();
        let txs = hashes
            .iter()
            .map(|h| (h.clone(), tx(h, "0x")))
            .collect::<HashMap<_, _>>();
        let rpc = MockRpc {
            block: Some(block_with(BlockTransactions::Hashes(hashes))),
            txs,
            failing: vec!["0x2".into()],
            calls: Mutex::new(vec![]),
        };
        let fetcher = BlockFetcher::new(Arc::new(rpc));

        let block = fetcher.fetch(101).await.unwrap().unwrap();
        assert_eq!(block.transactions.len(), 4);
        assert!(block.transactions.iter().all(|t| t.hash != "0x2"));
        // Stats count only the transactions that survived hydration.
        assert_eq!(block.stats.total(), 4);
        assert_eq!(block.stats.transfer, 4);
    }
}
