//! Full-pipeline test: a mock chain drives the poller, the broadcaster fans
//! out over real WebSocket connections.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;

use chainfeed_core::{FeedStatus, Marker, Poller, PollerConfig};
use chainfeed_rpc::{BlockTransactions, ChainRpc, RpcBlock, RpcError, RpcTransaction};
use chainfeed_ws::{Broadcaster, SubscriberRegistry, WsServer, WsServerConfig};

struct MockChain {
    head: u64,
    blocks: HashMap<u64, RpcBlock>,
}

impl MockChain {
    fn with_range(from: u64, to: u64) -> Self {
        Self {
            head: to,
            blocks: (from..=to).map(|n| (n, mk_block(n))).collect(),
        }
    }
}

fn mk_block(n: u64) -> RpcBlock {
    RpcBlock {
        number: format!("0x{n:x}"),
        hash: format!("0xhash{n}"),
        parent_hash: format!("0xhash{}", n - 1),
        timestamp: "0x65f0c800".into(),
        gas_used: "0x5208".into(),
        gas_limit: "0x1c9c380".into(),
        base_fee_per_gas: None,
        transactions: BlockTransactions::Full(vec![RpcTransaction {
            hash: format!("0xtx{n}"),
            from: "0xalice".into(),
            to: Some("0xbob".into()),
            value: "0x1".into(),
            input: "0x".into(),
        }]),
    }
}

#[async_trait]
impl ChainRpc for MockChain {
    async fn latest_height(&self) -> Result<u64, RpcError> {
        Ok(self.head)
    }

    async fn block_by_number(&self, n: u64, _full: bool) -> Result<Option<RpcBlock>, RpcError> {
        Ok(self.blocks.get(&n).cloned())
    }

    async fn transaction_by_hash(&self, _h: &str) -> Result<Option<RpcTransaction>, RpcError> {
        Ok(None)
    }
}

type Client = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Next text frame, skipping pings and other control frames.
async fn next_text(client: &mut Client) -> serde_json::Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for a text frame")
            .expect("stream ended while waiting for a text frame")
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

#[tokio::test]
async fn one_tick_reaches_every_subscriber_in_order() {
    let status = Arc::new(FeedStatus::new());
    let registry = Arc::new(SubscriberRegistry::new(Arc::clone(&status)));
    let broadcaster = Arc::new(Broadcaster::new(Arc::clone(&registry)));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let server = WsServer::new(Arc::clone(&registry), WsServerConfig::default());
    tokio::spawn(server.run(listener, shutdown_rx));

    let (mut client_a, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .unwrap();
    let (mut client_b, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .unwrap();
    for _ in 0..200 {
        if registry.len() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(registry.len(), 2);

    // Marker at 100, chain head at 103: one tick processes 101..=103.
    let chain = Arc::new(MockChain::with_range(100, 103));
    let mut poller = Poller::new(
        chain,
        broadcaster,
        Arc::clone(&status),
        PollerConfig::default(),
    )
    .with_marker(Marker::new(100, "0xhash100"));

    poller.poll_once().await;

    // Three distinct block messages per subscriber, six sends total.
    for client in [&mut client_a, &mut client_b] {
        for expected in 101..=103u64 {
            let json = next_text(client).await;
            assert_eq!(json["data"]["block"]["number"], expected.to_string());
            assert_eq!(json["data"]["block"]["hash"], format!("0xhash{expected}"));
        }
    }

    assert_eq!(poller.marker(), Some(&Marker::new(103, "0xhash103")));
    let snap = status.snapshot();
    assert_eq!(snap.last_block_number, "103");
    assert_eq!(snap.last_block_hash, "0xhash103");
    assert_eq!(snap.connected_clients, 2);

    let _ = shutdown_tx.send(true);
}
