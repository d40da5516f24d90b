//! Wallet value types and display helpers

use crate::registry::DEMO_CHARITY_ADDRESS;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name the demo charity address resolves to
pub const DEMO_CRONOS_ID: &str = "CronosCharity.cro";

/// A wallet address on the target chain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A broadcast transaction, identified by its hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHandle {
    pub hash: String,
}

impl TxHandle {
    pub fn new(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }
}

/// Confirmation record for a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

/// Shorten an address or hash for display: `0x742d...f44e`
///
/// Values too short to abbreviate are returned unchanged.
pub fn format_short(value: &str) -> String {
    const HEAD: usize = 6;
    const TAIL: usize = 4;

    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= HEAD + TAIL {
        return value.to_string();
    }
    let head: String = chars.iter().take(HEAD).collect();
    let tail: String = chars.iter().skip(chars.len() - TAIL).collect();
    format!("{head}...{tail}")
}

/// Resolve an address to its Cronos ID name.
///
/// Only the demo charity address is known; a real deployment would query
/// the name service contract.
pub fn resolve_cronos_id(address: &str) -> Option<&'static str> {
    address
        .eq_ignore_ascii_case(DEMO_CHARITY_ADDRESS)
        .then_some(DEMO_CRONOS_ID)
}
