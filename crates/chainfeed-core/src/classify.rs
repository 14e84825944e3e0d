//! Transaction classification from call-payload heuristics.
//!
//! Pure and total: the same `(to, input, value)` always yields the same
//! category, and unknown patterns fall through to [`TxCategory::Other`].
//! The selector tables are fixed data; changing them changes what counts as
//! a swap or a mint on the wire.

use alloy_primitives::U256;

use crate::types::TxCategory;

/// Known DEX router / aggregator function selectors.
const SWAP_SELECTORS: [&str; 7] = [
    "0x38ed1739", // swapExactTokensForTokens
    "0x8803dbee", // swapTokensForExactTokens
    "0x7ff36ab5", // swapExactETHForTokens
    "0xfb3bdb41", // swapETHForExactTokens
    "0x18cbafe5", // swapExactTokensForETH
    "0x4a25d94a", // swapTokensForExactETH
    "0x5c11d795", // swapExactTokensForETHSupportingFeeOnTransferTokens
];

/// Known mint function selectors (ERC-721/1155 style).
const MINT_SELECTORS: [&str; 2] = [
    "0x1249c58b", // mint()
    "0x40c10f19", // mint(address,uint256)
];

/// Init-code prefix recognized as an NFT/proxy deployment rather than a
/// generic contract creation.
const MINT_BYTECODE_PREFIX: &str = "0x60806040";

/// Classify a transaction from its destination, payload, and value.
///
/// First match wins:
/// 1. no destination: contract creation, or an NFT mint when the init code
///    carries the recognized prefix
/// 2. empty payload with non-zero value: plain transfer
/// 3. swap-router selector: DEX swap
/// 4. mint selector: NFT mint
/// 5. everything else: other
pub fn classify(to: Option<&str>, input: &str, value: U256) -> TxCategory {
    let input = input.to_ascii_lowercase();

    if to.is_none() {
        if input.starts_with(MINT_BYTECODE_PREFIX) {
            return TxCategory::NftMint;
        }
        return TxCategory::ContractCreation;
    }

    if payload_is_empty(&input) {
        if value > U256::ZERO {
            return TxCategory::Transfer;
        }
        return TxCategory::Other;
    }

    if let Some(selector) = leading_selector(&input) {
        if SWAP_SELECTORS.contains(&selector) {
            return TxCategory::DexSwap;
        }
        if MINT_SELECTORS.contains(&selector) {
            return TxCategory::NftMint;
        }
    }

    TxCategory::Other
}

fn payload_is_empty(input: &str) -> bool {
    input.is_empty() || input == "0x"
}

/// The leading 4-byte selector (`0x` + 8 hex chars), if the payload carries one.
fn leading_selector(input: &str) -> Option<&str> {
    if input.len() >= 10 && input.starts_with("0x") {
        Some(&input[..10])
    } else {
        None
    }
}
