//! Wallet/chain bridge
//!
//! The dialogue core never talks to a chain directly. It goes through
//! [`WalletBridge`], which covers account access, transaction broadcast and
//! receipt confirmation.

mod error;
mod rpc;
mod types;

pub use error::{WalletError, WalletErrorKind};
#[allow(unused_imports)] // Public API re-exports
pub use rpc::{to_wei, JsonRpcWallet, RpcConfig};
#[allow(unused_imports)] // Public API re-exports
pub use types::{
    format_short, resolve_cronos_id, AccountId, Receipt, TxHandle, DEMO_CRONOS_ID,
};

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Common interface for wallet providers
#[async_trait]
pub trait WalletBridge: Send + Sync {
    /// Request account access and return the active account
    async fn connect(&self) -> Result<AccountId, WalletError>;

    /// Sign and broadcast a transfer of `amount` CRO to `destination`
    async fn send(&self, destination: &AccountId, amount: Decimal)
        -> Result<TxHandle, WalletError>;

    /// Wait for the transaction to be mined and report its outcome
    async fn confirm(&self, handle: &TxHandle) -> Result<Receipt, WalletError>;

    /// Account from the last successful connect, if any
    fn connected_account(&self) -> Option<AccountId>;
}

#[async_trait]
impl<T: WalletBridge + ?Sized> WalletBridge for Arc<T> {
    async fn connect(&self) -> Result<AccountId, WalletError> {
        (**self).connect().await
    }

    async fn send(
        &self,
        destination: &AccountId,
        amount: Decimal,
    ) -> Result<TxHandle, WalletError> {
        (**self).send(destination, amount).await
    }

    async fn confirm(&self, handle: &TxHandle) -> Result<Receipt, WalletError> {
        (**self).confirm(handle).await
    }

    fn connected_account(&self) -> Option<AccountId> {
        (**self).connected_account()
    }
}

/// Logging wrapper for wallet providers
pub struct LoggingWallet {
    inner: Arc<dyn WalletBridge>,
}

impl LoggingWallet {
    pub fn new(inner: Arc<dyn WalletBridge>) -> Self {
        Self { inner }
    }
}

fn log_outcome<T>(operation: &str, started: std::time::Instant, result: &Result<T, WalletError>) {
    let duration = started.elapsed();
    match result {
        Ok(_) => {
            tracing::info!(
                operation,
                duration_ms = %duration.as_millis(),
                "Wallet call completed"
            );
        }
        Err(e) => {
            tracing::error!(
                operation,
                duration_ms = %duration.as_millis(),
                kind = e.kind.as_str(),
                error = %e.message,
                "Wallet call failed"
            );
        }
    }
}

#[async_trait]
impl WalletBridge for LoggingWallet {
    async fn connect(&self) -> Result<AccountId, WalletError> {
        let start = std::time::Instant::now();
        let result = self.inner.connect().await;
        log_outcome("connect", start, &result);
        result
    }

    async fn send(
        &self,
        destination: &AccountId,
        amount: Decimal,
    ) -> Result<TxHandle, WalletError> {
        let start = std::time::Instant::now();
        let result = self.inner.send(destination, amount).await;
        log_outcome("send", start, &result);
        if let Ok(handle) = &result {
            tracing::info!(
                to = %format_short(destination.as_str()),
                %amount,
                tx = %format_short(&handle.hash),
                "Donation broadcast"
            );
        }
        result
    }

    async fn confirm(&self, handle: &TxHandle) -> Result<Receipt, WalletError> {
        let start = std::time::Instant::now();
        let result = self.inner.confirm(handle).await;
        log_outcome("confirm", start, &result);
        result
    }

    fn connected_account(&self) -> Option<AccountId> {
        self.inner.connected_account()
    }
}
