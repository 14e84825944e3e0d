//! chainfeed — poll an EVM chain for new blocks and push them to WebSocket
//! subscribers.
//!
//! Usage:
//! ```bash
//! CHAINFEED_RPC_URLS=https://rpc-a.example,https://rpc-b.example chainfeed
//! ```

mod config;

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use chainfeed_core::{FeedStatus, Poller, PollerConfig};
use chainfeed_rpc::{EndpointPool, HttpChainClient, HttpClientConfig};
use chainfeed_ws::{Broadcaster, SubscriberRegistry, WsServer, WsServerConfig};

use crate::config::FeedConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = FeedConfig::from_env()?;
    tracing::info!(
        endpoints = config.rpc_urls.len(),
        bind = %config.bind,
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        "starting chainfeed"
    );

    let pool = Arc::new(EndpointPool::new(config.rpc_urls.clone()));
    let client = Arc::new(HttpChainClient::new(
        Arc::clone(&pool),
        HttpClientConfig {
            request_timeout: config.request_timeout,
        },
    ));

    let status = Arc::new(FeedStatus::new());
    let registry = Arc::new(SubscriberRegistry::new(Arc::clone(&status)));
    let broadcaster = Arc::new(Broadcaster::new(Arc::clone(&registry)));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!(addr = %config.bind, "websocket listener ready");

    let server = WsServer::new(
        Arc::clone(&registry),
        WsServerConfig {
            heartbeat_interval: config.heartbeat_interval,
            ..WsServerConfig::default()
        },
    );
    let server_task = tokio::spawn(server.run(listener, shutdown_rx.clone()));

    let poller = Poller::new(
        client,
        broadcaster,
        Arc::clone(&status),
        PollerConfig {
            poll_interval: config.poll_interval,
            ..PollerConfig::default()
        },
    );
    let poller_task = tokio::spawn(poller.run(shutdown_rx));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    let snapshot = serde_json::to_string(&status.snapshot())?;
    tracing::info!(status = %snapshot, "shutdown requested");

    shutdown_tx.send(true).ok();
    let _ = poller_task.await;
    let _ = server_task.await;

    tracing::info!("chainfeed stopped");
    Ok(())
}
