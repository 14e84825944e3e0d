//! Shared types for the ingestion pipeline.

use alloy_primitives::U256;
use serde::{Serialize, Serializer};

// ─── TxCategory ───────────────────────────────────────────────────────────────

/// Category assigned to every transaction by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxCategory {
    Transfer,
    NftMint,
    DexSwap,
    ContractCreation,
    Other,
}

impl TxCategory {
    /// All categories, in wire order.
    pub const ALL: [TxCategory; 5] = [
        Self::Transfer,
        Self::NftMint,
        Self::DexSwap,
        Self::ContractCreation,
        Self::Other,
    ];

    /// The label used on the wire and in stats keys.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Transfer => "Transfer",
            Self::NftMint => "NFT Mint",
            Self::DexSwap => "DEX Swap",
            Self::ContractCreation => "Contract Creation",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for TxCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for TxCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

// ─── CategoryStats ────────────────────────────────────────────────────────────

/// Per-category transaction counts for one block.
///
/// Counts only transactions that were successfully hydrated and classified;
/// dropped transactions never appear here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    #[serde(rename = "Transfer")]
    pub transfer: u32,
    #[serde(rename = "NFT Mint")]
    pub nft_mint: u32,
    #[serde(rename = "DEX Swap")]
    pub dex_swap: u32,
    #[serde(rename = "Contract Creation")]
    pub contract_creation: u32,
    #[serde(rename = "Other")]
    pub other: u32,
}

impl CategoryStats {
    /// Count one transaction of the given category.
    pub fn record(&mut self, category: TxCategory) {
        match category {
            TxCategory::Transfer => self.transfer += 1,
            TxCategory::NftMint => self.nft_mint += 1,
            TxCategory::DexSwap => self.dex_swap += 1,
            TxCategory::ContractCreation => self.contract_creation += 1,
            TxCategory::Other => self.other += 1,
        }
    }

    pub fn get(&self, category: TxCategory) -> u32 {
        match category {
            TxCategory::Transfer => self.transfer,
            TxCategory::NftMint => self.nft_mint,
            TxCategory::DexSwap => self.dex_swap,
            TxCategory::ContractCreation => self.contract_creation,
            TxCategory::Other => self.other,
        }
    }

    /// Total classified transactions.
    pub fn total(&self) -> u32 {
        TxCategory::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

// ─── Transaction / DecoratedBlock ─────────────────────────────────────────────

/// A normalized transaction with its derived category.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub hash: String,
    pub from: String,
    /// Absent for contract-creation transactions.
    pub to: Option<String>,
    /// Value in wei. 256-bit: wire serialization stringifies to decimal.
    pub value: U256,
    pub input: String,
    pub category: TxCategory,
}

/// A block annotated with classified transactions and aggregate counts.
#[derive(Debug, Clone)]
pub struct DecoratedBlock {
    pub number: u64,
    pub hash: String,
    pub parent_hash: String,
    /// Unix timestamp (seconds).
    pub timestamp: u64,
    pub gas_used: u64,
    pub gas_limit: u64,
    pub base_fee_per_gas: Option<u64>,
    /// Canonical block order, preserved through hydration.
    pub transactions: Vec<Transaction>,
    pub stats: CategoryStats,
}

// ─── Marker ───────────────────────────────────────────────────────────────────

/// The last block fully processed and broadcast.
///
/// Owned exclusively by the poller; everything else sees it through
/// [`crate::status::FeedStatus`] snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub number: u64,
    pub hash: String,
}

/// How a fetched block relates to the current marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerCheck {
    /// Strictly newer than the marker: process and broadcast.
    Fresh,
    /// At or below the marker with a matching recorded hash: skip.
    AlreadyProcessed,
    /// Same number as the marker but a different hash: the chain reorganized
    /// under us.
    Reorg,
}

impl Marker {
    pub fn new(number: u64, hash: impl Into<String>) -> Self {
        Self {
            number,
            hash: hash.into(),
        }
    }

    /// Classify a fetched `(number, hash)` against this marker.
    pub fn check(&self, number: u64, hash: &str) -> MarkerCheck {
        if number > self.number {
            MarkerCheck::Fresh
        } else if number == self.number && hash != self.hash {
            MarkerCheck::Reorg
        } else {
            MarkerCheck::AlreadyProcessed
        }
    }

    /// Move the marker forward (or overwrite the hash on reorg acceptance).
    pub fn advance(&mut self, number: u64, hash: impl Into<String>) {
        self.number = number;
        self.hash = hash.into();
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
