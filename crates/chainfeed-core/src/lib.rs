//! chainfeed-core — the ingestion pipeline.
//!
//! # Architecture
//!
//! ```text
//! Poller (marker owner, retry policy)
//!    ├── BlockFetcher        (fetch + hydrate + classify + stats)
//!    │      └── ChainRpc     (chainfeed-rpc: pool rotation per call)
//!    ├── BlockSink           (publish seam; implemented by the broadcaster)
//!    └── FeedStatus          (lock-light snapshot for health surfaces)
//! ```
//!
//! One periodic timer drives the poller; cycles never overlap. Transaction
//! hydration inside a single fetch is bounded-concurrent and order-preserving,
//! and joins before the block is handed to the sink.

pub mod classify;
pub mod error;
pub mod fetcher;
pub mod policy;
pub mod poller;
pub mod status;
pub mod types;

pub use classify::classify;
pub use error::FeedError;
pub use fetcher::BlockFetcher;
pub use policy::FetchRetryPolicy;
pub use poller::{BlockSink, Poller, PollerConfig};
pub use status::{FeedStatus, StatusSnapshot};
pub use types::{CategoryStats, DecoratedBlock, Marker, MarkerCheck, Transaction, TxCategory};
