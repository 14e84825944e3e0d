//! chainfeed-ws — push-channel delivery for decorated blocks.
//!
//! # Overview
//!
//! - [`message`] — the JSON wire form of a decorated block (all wide
//!   integers as decimal strings)
//! - [`SubscriberRegistry`] — the set of open connections, idempotent removal
//! - [`Broadcaster`] — implements the core's `BlockSink`: serialize once,
//!   fan out to every subscriber's bounded queue, prune failures
//! - [`WsServer`] — accepts connections, owns each socket in one task,
//!   heartbeats with ping/pong, removes dead peers
//!
//! Delivery is fire-and-forget: there is no replay buffer, and a subscriber
//! that connects after a block was published never receives it.

pub mod broadcast;
pub mod message;
pub mod registry;
pub mod server;

pub use broadcast::Broadcaster;
pub use message::BlockMessage;
pub use registry::{SubscriberId, SubscriberRegistry};
pub use server::{WsServer, WsServerConfig};
