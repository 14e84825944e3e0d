//! The poll loop: discovers unseen blocks and drives them to the sink.
//!
//! One periodic timer, one cycle at a time. The loop body is awaited before
//! the next tick is observed, and missed ticks are skipped, so a slow
//! upstream can never fan out concurrent poll cycles. The marker is owned
//! here and advances exactly once per successfully processed block, in
//! increasing order.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use chainfeed_rpc::ChainRpc;

use crate::error::FeedError;
use crate::fetcher::BlockFetcher;
use crate::policy::FetchRetryPolicy;
use crate::status::FeedStatus;
use crate::types::{DecoratedBlock, Marker, MarkerCheck};

/// Consumer seam for processed blocks.
///
/// Publishing is fire-and-forget: implementations swallow per-subscriber
/// failures, so a publish can never block marker advancement.
#[async_trait]
pub trait BlockSink: Send + Sync {
    async fn publish(&self, block: &DecoratedBlock);
}

/// Poll loop configuration.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Time between poll ticks.
    pub poll_interval: Duration,
    /// In-tick retry policy for transient per-block fetch errors.
    pub retry: FetchRetryPolicy,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            retry: FetchRetryPolicy::default(),
        }
    }
}

/// The poll loop. Owns the processing marker.
pub struct Poller<C> {
    client: Arc<C>,
    fetcher: BlockFetcher<C>,
    sink: Arc<dyn BlockSink>,
    status: Arc<FeedStatus>,
    config: PollerConfig,
    /// `None` until the first successful look at the chain head; the service
    /// starts at the head rather than replaying history.
    marker: Option<Marker>,
}

impl<C: ChainRpc> Poller<C> {
    pub fn new(
        client: Arc<C>,
        sink: Arc<dyn BlockSink>,
        status: Arc<FeedStatus>,
        config: PollerConfig,
    ) -> Self {
        Self {
            fetcher: BlockFetcher::new(Arc::clone(&client)),
            client,
            sink,
            status,
            config,
            marker: None,
        }
    }

    /// Start with a known marker (tests, or an externally supplied resume point).
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.status.set_marker(marker.number, &marker.hash);
        self.marker = Some(marker);
        self
    }

    /// The current marker, if initialised.
    pub fn marker(&self) -> Option<&Marker> {
        self.marker.as_ref()
    }

    /// Run until the shutdown signal flips.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => self.poll_once().await,
                changed = shutdown.changed() => {
                    // A dropped sender means the process is going away too.
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("poller stopping");
                        return;
                    }
                }
            }
        }
    }

    /// One poll cycle. Failures are logged and recovered on the next tick;
    /// nothing here is fatal.
    pub async fn poll_once(&mut self) {
        let height = match self.client.latest_height().await {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!(error = %e, "failed to query chain head, skipping tick");
                return;
            }
        };

        let Some(marker) = &self.marker else {
            self.init_marker(height).await;
            return;
        };

        let from = marker.number + 1;
        let to = height;
        if from > to {
            tracing::trace!(head = height, "no new blocks");
            return;
        }

        for number in from..=to {
            match self.fetch_with_retry(number).await {
                Ok(Some(block)) => self.process(block).await,
                Ok(None) => {
                    tracing::debug!(block = number, "block not yet available, skipping");
                }
                Err(e) => {
                    tracing::warn!(
                        block = number,
                        error = %e,
                        "fetch retries exhausted, skipping block"
                    );
                }
            }
        }
    }

    /// Dedup against the marker, publish, advance.
    async fn process(&mut self, block: DecoratedBlock) {
        let marker = self.marker.as_ref().expect("marker initialised before processing");
        match marker.check(block.number, &block.hash) {
            MarkerCheck::AlreadyProcessed => {
                tracing::debug!(block = block.number, "block already processed, skipping");
            }
            MarkerCheck::Reorg => {
                tracing::error!(
                    block = block.number,
                    recorded = %marker.hash,
                    observed = %block.hash,
                    "chain reorg at processed height, accepting latest hash"
                );
                self.advance_marker(block.number, &block.hash);
            }
            MarkerCheck::Fresh => {
                self.sink.publish(&block).await;
                self.advance_marker(block.number, &block.hash);
                tracing::info!(
                    block = block.number,
                    txs = block.transactions.len(),
                    "block broadcast"
                );
            }
        }
    }

    fn advance_marker(&mut self, number: u64, hash: &str) {
        if let Some(marker) = self.marker.as_mut() {
            marker.advance(number, hash);
        }
        self.status.set_marker(number, hash);
    }

    /// Seed the marker from the current head so no history is replayed.
    /// Failure leaves the marker unset; the next tick tries again.
    async fn init_marker(&mut self, height: u64) {
        match self.client.block_by_number(height, false).await {
            Ok(Some(block)) => {
                let marker = Marker::new(block.number_u64(), block.hash.clone());
                tracing::info!(block = marker.number, hash = %marker.hash, "marker initialised at chain head");
                self.status.set_marker(marker.number, &marker.hash);
                self.marker = Some(marker);
            }
            Ok(None) => {
                tracing::warn!(head = height, "head block not found during marker init");
            }
            Err(e) => {
                tracing::warn!(head = height, error = %e, "marker init failed, retrying next tick");
            }
        }
    }

    /// Fetch one block with the bounded in-tick retry policy. Only transient
    /// errors are retried.
    async fn fetch_with_retry(&self, number: u64) -> Result<Option<DecoratedBlock>, FeedError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.fetcher.fetch(number).await {
                Ok(found) => return Ok(found),
                Err(e) if e.is_transient() => match self.config.retry.next_delay(attempt) {
                    Some(delay) => {
                        tracing::warn!(
                            block = number,
                            attempt,
                            error = %e,
                            "transient fetch error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => return Err(e),
                },
                Err(e) => return Err(e),
            }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
