//! Wallet error types

use thiserror::Error;

/// Wallet error with classification
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct WalletError {
    pub kind: WalletErrorKind,
    pub message: String,
}

impl WalletError {
    pub fn new(kind: WalletErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(WalletErrorKind::Connection, message)
    }

    pub fn transaction(message: impl Into<String>) -> Self {
        Self::new(WalletErrorKind::Transaction, message)
    }

    pub fn verification(message: impl Into<String>) -> Self {
        Self::new(WalletErrorKind::Verification, message)
    }
}

/// Where in the payment flow the failure happened
///
/// None of these are retried automatically; the user re-initiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletErrorKind {
    /// No wallet/node reachable, user rejected, or no unlocked accounts
    Connection,
    /// Transaction could not be signed or broadcast
    Transaction,
    /// Receipt polling timed out or the node errored
    Verification,
}

impl WalletErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WalletErrorKind::Connection => "connection",
            WalletErrorKind::Transaction => "transaction",
            WalletErrorKind::Verification => "verification",
        }
    }
}
