//! Donation execution and transaction monitoring
//!
//! Drives a payment card through the wallet bridge: connect if needed,
//! broadcast, record in the monitor, then wait for the receipt.

use crate::state_machine::PaymentCard;
use crate::wallet::{format_short, AccountId, Receipt, WalletBridge, WalletError, WalletErrorKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Mutex, PoisonError};

/// Lifecycle of an issued payment card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Unpaid,
    Processing,
    Paid,
    Failed,
}

/// A payment card awaiting (or past) payment
#[derive(Debug, Clone, Serialize)]
pub struct Invoice {
    pub id: String,
    pub card: PaymentCard,
    pub status: InvoiceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    pub fn new(card: PaymentCard) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            card,
            status: InvoiceStatus::Unpaid,
            tx_hash: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    Pending,
    Verified,
    Failed,
}

/// One row of the transaction monitor
#[derive(Debug, Clone, Serialize)]
pub struct TrackedTx {
    pub hash: String,
    pub short_hash: String,
    pub status: TxStatus,
    pub updated_at: DateTime<Utc>,
}

/// Rows kept by the monitor; older ones fall off the end
pub const MONITOR_CAPACITY: usize = 500;

/// Broadcast transactions, newest first
#[derive(Debug)]
pub struct TxMonitor {
    entries: Mutex<Vec<TrackedTx>>,
    capacity: usize,
}

impl Default for TxMonitor {
    fn default() -> Self {
        Self::with_capacity(MONITOR_CAPACITY)
    }
}

impl TxMonitor {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn track(&self, hash: &str) {
        let entry = TrackedTx {
            hash: hash.to_string(),
            short_hash: format_short(hash),
            status: TxStatus::Pending,
            updated_at: Utc::now(),
        };
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(0, entry);
        entries.truncate(self.capacity);
    }

    pub fn update(&self, hash: &str, status: TxStatus) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = entries.iter_mut().find(|e| e.hash == hash) {
            entry.status = status;
            entry.updated_at = Utc::now();
        }
    }

    pub fn snapshot(&self) -> Vec<TrackedTx> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Result of a donation whose transaction was mined
#[derive(Debug, Clone, Serialize)]
pub struct DonationOutcome {
    pub status: InvoiceStatus,
    pub tx_hash: String,
    pub receipt: Receipt,
    pub message: String,
}

impl DonationOutcome {
    fn verified(card: &PaymentCard, tx_hash: String, receipt: Receipt) -> Self {
        let message = format!(
            "✅ Payment of {} CRO to {} has been verified on-chain!",
            card.amount.normalize(),
            format_short(&card.charity.address)
        );
        Self {
            status: InvoiceStatus::Paid,
            tx_hash,
            receipt,
            message,
        }
    }

    fn reverted(tx_hash: String, receipt: Receipt) -> Self {
        Self {
            status: InvoiceStatus::Failed,
            tx_hash,
            receipt,
            message: "❌ Transaction failed or was rejected.".to_string(),
        }
    }
}

/// Chat-facing text for a wallet failure
pub fn failure_message(err: &WalletError) -> String {
    match err.kind {
        WalletErrorKind::Connection => format!("I couldn't connect to your wallet. {}", err.message),
        WalletErrorKind::Transaction | WalletErrorKind::Verification => {
            format!("⚠️ Donation cancelled or failed. {}", err.message)
        }
    }
}

pub struct DonationExecutor<W: WalletBridge> {
    wallet: W,
    monitor: TxMonitor,
}

impl<W: WalletBridge> DonationExecutor<W> {
    pub fn new(wallet: W) -> Self {
        Self {
            wallet,
            monitor: TxMonitor::default(),
        }
    }

    pub fn monitor(&self) -> &TxMonitor {
        &self.monitor
    }

    pub async fn connect(&self) -> Result<AccountId, WalletError> {
        self.wallet.connect().await
    }

    /// Reuse the connected account, prompting for access only when absent
    pub async fn ensure_connected(&self) -> Result<AccountId, WalletError> {
        match self.wallet.connected_account() {
            Some(account) => Ok(account),
            None => self.wallet.connect().await,
        }
    }

    /// Pay a card and wait for the chain's verdict.
    ///
    /// A mined-but-reverted transaction is an `Ok` outcome with status
    /// `Failed`. Errors before broadcast leave the monitor untouched; a
    /// verification error leaves the tracked transaction pending.
    pub async fn donate(&self, card: &PaymentCard) -> Result<DonationOutcome, WalletError> {
        self.ensure_connected().await?;

        let destination = AccountId::new(card.charity.address.clone());
        let handle = self.wallet.send(&destination, card.amount).await?;
        self.monitor.track(&handle.hash);

        let receipt = self.wallet.confirm(&handle).await?;
        if receipt.success {
            self.monitor.update(&handle.hash, TxStatus::Verified);
            Ok(DonationOutcome::verified(card, handle.hash, receipt))
        } else {
            self.monitor.update(&handle.hash, TxStatus::Failed);
            Ok(DonationOutcome::reverted(handle.hash, receipt))
        }
    }
}
