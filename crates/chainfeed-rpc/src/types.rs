//! Raw EVM types as returned by the JSON-RPC node.
//!
//! All quantities arrive as `0x`-prefixed hex strings; accessor methods parse
//! them into native integers. Transaction values are 256-bit quantities and
//! parse into [`U256`].

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// A raw block from `eth_getBlockByNumber`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcBlock {
    pub number: String,
    pub hash: String,
    #[serde(rename = "parentHash")]
    pub parent_hash: String,
    pub timestamp: String,
    #[serde(rename = "gasUsed")]
    pub gas_used: String,
    #[serde(rename = "gasLimit")]
    pub gas_limit: String,
    #[serde(rename = "baseFeePerGas")]
    pub base_fee_per_gas: Option<String>,
    pub transactions: BlockTransactions,
}

impl RpcBlock {
    pub fn number_u64(&self) -> u64 {
        parse_hex_u64(&self.number)
    }

    pub fn timestamp_u64(&self) -> u64 {
        parse_hex_u64(&self.timestamp)
    }

    pub fn gas_used_u64(&self) -> u64 {
        parse_hex_u64(&self.gas_used)
    }

    pub fn gas_limit_u64(&self) -> u64 {
        parse_hex_u64(&self.gas_limit)
    }

    pub fn base_fee_per_gas_u64(&self) -> Option<u64> {
        self.base_fee_per_gas.as_deref().map(parse_hex_u64)
    }
}

/// The transaction list of a fetched block.
///
/// Depending on the `full_transactions` flag (and the node), the list is
/// either full transaction objects or bare hashes that must be hydrated
/// individually. Resolving which shape a fetch produced happens exactly once,
/// at deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockTransactions {
    /// Full transaction bodies were included in the block response.
    Full(Vec<RpcTransaction>),
    /// Only transaction hashes; each must be fetched via
    /// `eth_getTransactionByHash`.
    Hashes(Vec<String>),
}

impl BlockTransactions {
    /// Number of transactions the block carries, regardless of shape.
    pub fn len(&self) -> usize {
        match self {
            Self::Full(txs) => txs.len(),
            Self::Hashes(hs) => hs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A raw transaction from a full block response or `eth_getTransactionByHash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcTransaction {
    pub hash: String,
    pub from: String,
    /// Absent for contract-creation transactions.
    pub to: Option<String>,
    pub value: String,
    pub input: String,
}

impl RpcTransaction {
    pub fn value_u256(&self) -> U256 {
        parse_hex_u256(&self.value)
    }
}

/// Parse a hex-encoded quantity (with or without `0x`) to u64.
pub fn parse_hex_u64(s: &str) -> u64 {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).unwrap_or(0)
}

/// Parse a hex-encoded quantity (with or without `0x`) to [`U256`].
pub fn parse_hex_u256(s: &str) -> U256 {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.is_empty() {
        return U256::ZERO;
    }
    U256::from_str_radix(s, 16).unwrap_or(U256::ZERO)
}
