//! Service configuration from environment variables.

use std::time::Duration;

/// Runtime configuration for the chainfeed service.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Upstream JSON-RPC endpoint URLs, in rotation order.
    pub rpc_urls: Vec<String>,
    /// Address the WebSocket listener binds to.
    pub bind: String,
    /// Time between poll ticks.
    pub poll_interval: Duration,
    /// Interval between heartbeat pings to subscribers.
    pub heartbeat_interval: Duration,
    /// Timeout per upstream RPC request.
    pub request_timeout: Duration,
}

impl FeedConfig {
    /// Read configuration from the environment.
    ///
    /// `CHAINFEED_RPC_URLS` is required (comma-separated); everything else
    /// has a default. An empty endpoint set is a fatal startup condition.
    pub fn from_env() -> anyhow::Result<Self> {
        let rpc_urls: Vec<String> = std::env::var("CHAINFEED_RPC_URLS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if rpc_urls.is_empty() {
            anyhow::bail!("no RPC endpoints configured; set CHAINFEED_RPC_URLS (comma-separated)");
        }

        Ok(Self {
            rpc_urls,
            bind: env_or("CHAINFEED_BIND", "127.0.0.1:3001"),
            poll_interval: Duration::from_millis(env_parsed("CHAINFEED_POLL_INTERVAL_MS", 250)),
            heartbeat_interval: Duration::from_secs(env_parsed("CHAINFEED_HEARTBEAT_SECS", 30)),
            request_timeout: Duration::from_secs(env_parsed("CHAINFEED_REQUEST_TIMEOUT_SECS", 10)),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
