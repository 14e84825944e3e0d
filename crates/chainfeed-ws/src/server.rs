//! WebSocket push server: accepts subscribers and owns their connections.
//!
//! One task per connection. The task forwards the subscriber's outbound
//! queue to the socket, pings on a fixed interval, and closes the moment the
//! peer errors, closes, or stops answering heartbeats. Every exit path goes
//! through the same idempotent registry removal.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::registry::SubscriberRegistry;

/// Configuration for the push server.
#[derive(Debug, Clone)]
pub struct WsServerConfig {
    /// Interval between heartbeat pings.
    pub heartbeat_interval: Duration,
    /// Bound on any single socket send.
    pub send_timeout: Duration,
    /// Outbound queue depth per subscriber; overflowing it marks the
    /// subscriber as too slow.
    pub queue_capacity: usize,
}

impl Default for WsServerConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(30),
            send_timeout: Duration::from_secs(10),
            queue_capacity: 64,
        }
    }
}

/// Accept loop for subscriber connections.
pub struct WsServer {
    registry: Arc<SubscriberRegistry>,
    config: WsServerConfig,
}

impl WsServer {
    pub fn new(registry: Arc<SubscriberRegistry>, config: WsServerConfig) -> Self {
        Self { registry, config }
    }

    /// Accept subscribers until the shutdown signal flips.
    pub async fn run(self, listener: TcpListener, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let registry = Arc::clone(&self.registry);
                        let config = self.config.clone();
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            handle_connection(stream, peer, registry, config, shutdown).await;
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to accept connection");
                    }
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("ws server stopping");
                        return;
                    }
                }
            }
        }
    }
}

/// Perform the WebSocket handshake, register the subscriber, run its
/// connection to completion, and remove it exactly once on the way out.
async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    registry: Arc<SubscriberRegistry>,
    config: WsServerConfig,
    shutdown: watch::Receiver<bool>,
) {
    let ws = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            tracing::warn!(%peer, error = %e, "websocket handshake failed");
            return;
        }
    };

    let (queue_tx, queue_rx) = mpsc::channel(config.queue_capacity);
    let id = registry.add(queue_tx);
    tracing::debug!(subscriber = id, %peer, "connection open");

    run_subscriber(ws, queue_rx, &config, shutdown).await;

    // Reached from every exit: peer close, transport error, stale heartbeat,
    // broadcaster pruning (queue closed), or shutdown. May race with the
    // broadcaster's own removal; both are safe.
    registry.remove(id);
}

/// Drive one open subscriber until it closes.
async fn run_subscriber(
    ws: WebSocketStream<TcpStream>,
    mut queue_rx: mpsc::Receiver<String>,
    config: &WsServerConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    let (mut sink, mut stream) = ws.split();
    // First ping one interval after open, then steadily.
    let mut heartbeat = tokio::time::interval_at(
        tokio::time::Instant::now() + config.heartbeat_interval,
        config.heartbeat_interval,
    );
    let mut liveness = Liveness::new(config.heartbeat_interval * 2);

    loop {
        tokio::select! {
            queued = queue_rx.recv() => {
                match queued {
                    Some(text) => {
                        if !send_timed(&mut sink, Message::Text(text), config.send_timeout).await {
                            return;
                        }
                    }
                    // Sender side dropped: the registry pruned us.
                    None => return,
                }
            }
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Pong(_))) => liveness.refresh(),
                    Some(Ok(Message::Ping(payload))) => {
                        liveness.refresh();
                        if !send_timed(&mut sink, Message::Pong(payload), config.send_timeout).await {
                            return;
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                    Some(Ok(_)) => {} // inbound text/binary carries no meaning here
                }
            }
            _ = heartbeat.tick() => {
                if liveness.is_stale() {
                    tracing::info!("subscriber missed heartbeats, closing");
                    let _ = sink.send(Message::Close(None)).await;
                    return;
                }
                if !send_timed(&mut sink, Message::Ping(Vec::new()), config.send_timeout).await {
                    return;
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    let _ = sink.send(Message::Close(None)).await;
                    return;
                }
            }
        }
    }
}

async fn send_timed(
    sink: &mut SplitSink<WebSocketStream<TcpStream>, Message>,
    msg: Message,
    timeout: Duration,
) -> bool {
    match tokio::time::timeout(timeout, sink.send(msg)).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "socket send failed");
            false
        }
        Err(_) => {
            tracing::warn!("socket send timed out");
            false
        }
    }
}

/// Tracks when the peer last proved it was alive.
struct Liveness {
    last_seen: tokio::time::Instant,
    bound: Duration,
}

impl Liveness {
    fn new(bound: Duration) -> Self {
        Self {
            last_seen: tokio::time::Instant::now(),
            bound,
        }
    }

    fn refresh(&mut self) {
        self.last_seen = tokio::time::Instant::now();
    }

    /// `true` once no liveness signal has arrived within the bound.
    fn is_stale(&self) -> bool {
        self.last_seen.elapsed() >= self.bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn liveness_goes_stale_at_bound() {
        let liveness = Liveness::new(Duration::from_secs(60));
        assert!(!liveness.is_stale());

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(!liveness.is_stale());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(liveness.is_stale());
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_resets_the_clock() {
        let mut liveness = Liveness::new(Duration::from_secs(60));
        tokio::time::advance(Duration::from_secs(59)).await;
        liveness.refresh();

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(!liveness.is_stale());
    }
}
