//! The outbound wire message, one per processed block.
//!
//! Block numbers, gas figures, and transaction values can exceed what a
//! double-precision float represents exactly, so every wide integer is
//! serialized as a decimal string. `baseFeePerGas` and `to` serialize as
//! explicit `null` when absent.

use serde::Serialize;

use chainfeed_core::{CategoryStats, DecoratedBlock, Transaction};

/// Top-level frame: `{"type":"block","data":{...}}`.
#[derive(Debug, Clone, Serialize)]
pub struct BlockMessage {
    #[serde(rename = "type")]
    kind: &'static str,
    data: BlockData,
}

#[derive(Debug, Clone, Serialize)]
struct BlockData {
    block: WireBlock,
    stats: CategoryStats,
}

#[derive(Debug, Clone, Serialize)]
struct WireBlock {
    number: String,
    hash: String,
    timestamp: String,
    #[serde(rename = "gasUsed")]
    gas_used: String,
    #[serde(rename = "gasLimit")]
    gas_limit: String,
    #[serde(rename = "baseFeePerGas")]
    base_fee_per_gas: Option<String>,
    transactions: Vec<WireTransaction>,
}

#[derive(Debug, Clone, Serialize)]
struct WireTransaction {
    hash: String,
    from: String,
    to: Option<String>,
    value: String,
    #[serde(rename = "type")]
    category: &'static str,
}

impl From<&DecoratedBlock> for BlockMessage {
    fn from(block: &DecoratedBlock) -> Self {
        Self {
            kind: "block",
            data: BlockData {
                block: WireBlock {
                    number: block.number.to_string(),
                    hash: block.hash.clone(),
                    timestamp: block.timestamp.to_string(),
                    gas_used: block.gas_used.to_string(),
                    gas_limit: block.gas_limit.to_string(),
                    base_fee_per_gas: block.base_fee_per_gas.map(|f| f.to_string()),
                    transactions: block.transactions.iter().map(WireTransaction::from).collect(),
                },
                stats: block.stats,
            },
        }
    }
}

impl From<&Transaction> for WireTransaction {
    fn from(tx: &Transaction) -> Self {
        Self {
            hash: tx.hash.clone(),
            from: tx.from.clone(),
            to: tx.to.clone(),
            // U256 displays in decimal.
            value: tx.value.to_string(),
            category: tx.category.label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use chainfeed_core::TxCategory;

    fn sample_block() -> DecoratedBlock {
        let mut stats = CategoryStats::default();
        stats.record(TxCategory::Transfer);
        stats.record(TxCategory::DexSwap);
        DecoratedBlock {
            number: 18_000_001,
            hash: "0xb10c".into(),
            parent_hash: "0xb0ff".into(),
            timestamp: 1_710_000_000,
            gas_used: 12_345_678,
            gas_limit: 30_000_000,
            base_fee_per_gas: None,
            transactions: vec![
                Transaction {
                    hash: "0xt1".into(),
                    from: "0xalice".into(),
                    to: Some("0xbob".into()),
                    value: U256::from(10u64).pow(U256::from(21u64)), // 1000 ETH in wei
                    input: "0x".into(),
                    category: TxCategory::Transfer,
                },
                Transaction {
                    hash: "0xt2".into(),
                    from: "0xalice".into(),
                    to: None,
                    value: U256::ZERO,
                    input: "0x38ed1739".into(),
                    category: TxCategory::DexSwap,
                },
            ],
            stats,
        }
    }

    #[test]
    fn wire_shape_matches_protocol() {
        let msg = BlockMessage::from(&sample_block());
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "block");
        let block = &json["data"]["block"];
        assert_eq!(block["number"], "18000001");
        assert_eq!(block["hash"], "0xb10c");
        assert_eq!(block["timestamp"], "1710000000");
        assert_eq!(block["gasUsed"], "12345678");
        assert_eq!(block["gasLimit"], "30000000");
        assert_eq!(block["baseFeePerGas"], serde_json::Value::Null);

        let txs = block["transactions"].as_array().unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0]["value"], "1000000000000000000000"); // decimal, not hex
        assert_eq!(txs[0]["type"], "Transfer");
        assert_eq!(txs[1]["to"], serde_json::Value::Null);
        assert_eq!(txs[1]["type"], "DEX Swap");

        let stats = &json["data"]["stats"];
        assert_eq!(stats["Transfer"], 1);
        assert_eq!(stats["DEX Swap"], 1);
        assert_eq!(stats["NFT Mint"], 0);
        assert_eq!(stats["Contract Creation"], 0);
        assert_eq!(stats["Other"], 0);
    }

    #[test]
    fn base_fee_present_serializes_as_string() {
        let mut block = sample_block();
        block.base_fee_per_gas = Some(1_000_000_000);
        let json = serde_json::to_value(BlockMessage::from(&block)).unwrap();
        assert_eq!(json["data"]["block"]["baseFeePerGas"], "1000000000");
    }
}
