//! Mock wallet and conversation-level integration tests
//!
//! These run whole sessions against the runtime without touching a node.

use crate::wallet::{AccountId, Receipt, TxHandle, WalletBridge, WalletError};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const MOCK_ACCOUNT: &str = "0x00000000000000000000000000000000000d0a0e";

/// Mock wallet: succeeds by default, queued results take precedence
#[allow(dead_code)]
pub struct MockWallet {
    account: Mutex<Option<AccountId>>,
    connect_results: Mutex<VecDeque<Result<AccountId, WalletError>>>,
    send_results: Mutex<VecDeque<Result<TxHandle, WalletError>>>,
    confirm_results: Mutex<VecDeque<Result<Receipt, WalletError>>>,
    /// Held confirmations wait here until released
    confirm_gate: Option<Arc<Notify>>,
    connect_calls: AtomicUsize,
    /// Record of every send
    pub sends: Mutex<Vec<(AccountId, Decimal)>>,
}

#[allow(dead_code)]
impl MockWallet {
    pub fn new() -> Self {
        Self {
            account: Mutex::new(None),
            connect_results: Mutex::new(VecDeque::new()),
            send_results: Mutex::new(VecDeque::new()),
            confirm_results: Mutex::new(VecDeque::new()),
            confirm_gate: None,
            connect_calls: AtomicUsize::new(0),
            sends: Mutex::new(Vec::new()),
        }
    }

    /// Block every confirmation until the gate is notified
    pub fn with_confirm_gate(mut self, gate: Arc<Notify>) -> Self {
        self.confirm_gate = Some(gate);
        self
    }

    pub fn queue_connect(&self, result: Result<AccountId, WalletError>) {
        self.connect_results.lock().unwrap().push_back(result);
    }

    pub fn queue_send(&self, result: Result<TxHandle, WalletError>) {
        self.send_results.lock().unwrap().push_back(result);
    }

    pub fn queue_confirm(&self, result: Result<Receipt, WalletError>) {
        self.confirm_results.lock().unwrap().push_back(result);
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn recorded_sends(&self) -> Vec<(AccountId, Decimal)> {
        self.sends.lock().unwrap().clone()
    }
}

impl Default for MockWallet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletBridge for MockWallet {
    async fn connect(&self) -> Result<AccountId, WalletError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        let result = self
            .connect_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(AccountId::new(MOCK_ACCOUNT)));
        if let Ok(account) = &result {
            *self.account.lock().unwrap() = Some(account.clone());
        }
        result
    }

    async fn send(&self, destination: &AccountId, amount: Decimal) -> Result<TxHandle, WalletError> {
        let mut sends = self.sends.lock().unwrap();
        sends.push((destination.clone(), amount));
        let default = TxHandle::new(format!("0x{:064x}", sends.len()));
        drop(sends);
        self.send_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(default))
    }

    async fn confirm(&self, _handle: &TxHandle) -> Result<Receipt, WalletError> {
        if let Some(gate) = &self.confirm_gate {
            gate.notified().await;
        }
        self.confirm_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Receipt {
                success: true,
                block_number: Some(1),
            }))
    }

    fn connected_account(&self) -> Option<AccountId> {
        self.account.lock().unwrap().clone()
    }
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Category, CharityId, Registry};
    use crate::runtime::{ConversationManager, InvoiceStatus, RuntimeError, TxStatus};
    use crate::state_machine::{DonationTier, Phase};
    use crate::wallet::WalletErrorKind;

    fn manager(wallet: MockWallet) -> Arc<ConversationManager<MockWallet>> {
        Arc::new(ConversationManager::new(
            Arc::new(Registry::seeded().unwrap()),
            wallet,
        ))
    }

    /// Walk a fresh session to a payment card; returns (conversation id, invoice id)
    async fn issue_invoice(
        manager: &ConversationManager<MockWallet>,
        amount: &str,
    ) -> (String, String) {
        let conv = manager.create_conversation().await;
        let id = conv.id().to_string();
        manager.send_message(&id, "hello").await.unwrap();
        manager.send_message(&id, "health").await.unwrap();
        manager.send_message(&id, "ok").await.unwrap();
        let turn = manager.send_message(&id, amount).await.unwrap();
        let invoice_id = turn.invoice_id.expect("payment card issues an invoice");
        (id, invoice_id)
    }

    #[tokio::test]
    async fn test_new_conversation_is_idle() {
        let manager = manager(MockWallet::new());
        let conv = manager.create_conversation().await;
        assert_eq!(conv.phase().await, Phase::Idle);
    }

    #[tokio::test]
    async fn test_chat_turns_report_phase() {
        let manager = manager(MockWallet::new());
        let id = manager.create_conversation().await.id().to_string();

        let turn = manager.send_message(&id, "hello").await.unwrap();
        assert_eq!(turn.phase, Phase::Discovery);
        assert!(turn.invoice_id.is_none());

        let turn = manager.send_message(&id, "tech please").await.unwrap();
        assert_eq!(turn.phase, Phase::ConfirmCharity);
        assert_eq!(turn.response.details().unwrap().category, Category::Tech);
    }

    #[tokio::test]
    async fn test_conversations_are_independent() {
        let manager = manager(MockWallet::new());
        let a = manager.create_conversation().await.id().to_string();
        let b = manager.create_conversation().await.id().to_string();

        manager.send_message(&a, "urgent").await.unwrap();

        assert_eq!(manager.conversation(&a).await.unwrap().phase().await, Phase::ConfirmCharity);
        assert_eq!(manager.conversation(&b).await.unwrap().phase().await, Phase::Idle);
    }

    #[tokio::test]
    async fn test_unknown_conversation() {
        let manager = manager(MockWallet::new());
        let err = manager.send_message("missing", "hello").await.unwrap_err();
        assert!(matches!(err, RuntimeError::ConversationNotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_select_charity_through_manager() {
        let manager = manager(MockWallet::new());
        let id = manager.create_conversation().await.id().to_string();

        let turn = manager
            .select_charity(&id, &CharityId::new("museumon-chain.cro"))
            .await
            .unwrap();
        assert_eq!(turn.phase, Phase::ConfirmCharity);
        assert_eq!(turn.response.details().unwrap().name, "Museum On-Chain");

        let err = manager
            .select_charity(&id, &CharityId::new("ghost.cro"))
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Transition(_)));
    }

    #[tokio::test]
    async fn test_payment_card_issues_unpaid_invoice() {
        let manager = manager(MockWallet::new());
        let (conv, invoice_id) = issue_invoice(&manager, "3").await;

        let invoice = manager.invoice(&conv, &invoice_id).await.unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Unpaid);
        assert_eq!(invoice.card.tier, DonationTier::Micro);
        assert_eq!(invoice.card.charity.category, Category::Health);
    }

    #[tokio::test]
    async fn test_pay_invoice_end_to_end() {
        let manager = manager(MockWallet::new());
        let (conv, invoice_id) = issue_invoice(&manager, "50").await;

        let outcome = manager.pay_invoice(&conv, &invoice_id).await.unwrap();
        assert_eq!(outcome.status, InvoiceStatus::Paid);
        assert_eq!(
            outcome.message,
            "✅ Payment of 50 CRO to 0x742d...f44e has been verified on-chain!"
        );

        let invoice = manager.invoice(&conv, &invoice_id).await.unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert_eq!(invoice.tx_hash.as_deref(), Some(outcome.tx_hash.as_str()));

        let txs = manager.transactions();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].status, TxStatus::Verified);
    }

    #[tokio::test]
    async fn test_paid_invoice_cannot_be_paid_twice() {
        let manager = manager(MockWallet::new());
        let (conv, invoice_id) = issue_invoice(&manager, "50").await;
        manager.pay_invoice(&conv, &invoice_id).await.unwrap();

        let err = manager.pay_invoice(&conv, &invoice_id).await.unwrap_err();
        assert!(matches!(err, RuntimeError::InvoiceAlreadyPaid(_)));
        assert_eq!(manager.transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_invoice_can_be_retried() {
        let wallet = MockWallet::new();
        wallet.queue_send(Err(WalletError::transaction("You rejected the transaction.")));
        let manager = manager(wallet);
        let (conv, invoice_id) = issue_invoice(&manager, "20").await;

        let err = manager.pay_invoice(&conv, &invoice_id).await.unwrap_err();
        assert!(matches!(&err, RuntimeError::Wallet(e) if e.kind == WalletErrorKind::Transaction));
        assert_eq!(
            manager.invoice(&conv, &invoice_id).await.unwrap().status,
            InvoiceStatus::Failed
        );

        let outcome = manager.pay_invoice(&conv, &invoice_id).await.unwrap();
        assert_eq!(outcome.status, InvoiceStatus::Paid);
    }

    #[tokio::test]
    async fn test_reverted_transaction_fails_invoice() {
        let wallet = MockWallet::new();
        wallet.queue_confirm(Ok(Receipt {
            success: false,
            block_number: Some(4),
        }));
        let manager = manager(wallet);
        let (conv, invoice_id) = issue_invoice(&manager, "20").await;

        let outcome = manager.pay_invoice(&conv, &invoice_id).await.unwrap();
        assert_eq!(outcome.status, InvoiceStatus::Failed);
        assert_eq!(
            manager.invoice(&conv, &invoice_id).await.unwrap().status,
            InvoiceStatus::Failed
        );
        assert_eq!(manager.transactions()[0].status, TxStatus::Failed);
    }

    #[tokio::test]
    async fn test_concurrent_payment_is_rejected() {
        let gate = Arc::new(Notify::new());
        let manager = manager(MockWallet::new().with_confirm_gate(Arc::clone(&gate)));
        let (conv, invoice_id) = issue_invoice(&manager, "20").await;

        let first = {
            let manager = Arc::clone(&manager);
            let conv = conv.clone();
            let invoice_id = invoice_id.clone();
            tokio::spawn(async move { manager.pay_invoice(&conv, &invoice_id).await })
        };

        for _ in 0..100 {
            if manager.invoice(&conv, &invoice_id).await.unwrap().status
                == InvoiceStatus::Processing
            {
                break;
            }
            tokio::task::yield_now().await;
        }

        let err = manager.pay_invoice(&conv, &invoice_id).await.unwrap_err();
        assert!(matches!(err, RuntimeError::InvoiceBusy(_)));

        gate.notify_one();
        let outcome = first.await.unwrap().unwrap();
        assert_eq!(outcome.status, InvoiceStatus::Paid);
    }

    #[tokio::test]
    async fn test_abandoned_payment_can_be_retried() {
        let gate = Arc::new(Notify::new());
        let manager = manager(MockWallet::new().with_confirm_gate(Arc::clone(&gate)));
        let (conv, invoice_id) = issue_invoice(&manager, "20").await;

        let paying = {
            let manager = Arc::clone(&manager);
            let conv = conv.clone();
            let invoice_id = invoice_id.clone();
            tokio::spawn(async move { manager.pay_invoice(&conv, &invoice_id).await })
        };

        for _ in 0..100 {
            if manager.invoice(&conv, &invoice_id).await.unwrap().status
                == InvoiceStatus::Processing
            {
                break;
            }
            tokio::task::yield_now().await;
        }

        // Client went away while the receipt was pending
        paying.abort();
        assert!(paying.await.unwrap_err().is_cancelled());
        assert_eq!(
            manager.invoice(&conv, &invoice_id).await.unwrap().status,
            InvoiceStatus::Failed
        );

        gate.notify_one();
        let outcome = manager.pay_invoice(&conv, &invoice_id).await.unwrap();
        assert_eq!(outcome.status, InvoiceStatus::Paid);
        assert_eq!(
            manager.invoice(&conv, &invoice_id).await.unwrap().status,
            InvoiceStatus::Paid
        );
    }

    #[tokio::test]
    async fn test_least_recently_active_conversation_is_evicted() {
        let manager = ConversationManager::with_capacity(
            Arc::new(Registry::seeded().unwrap()),
            MockWallet::new(),
            2,
        );
        let first = manager.create_conversation().await.id().to_string();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = manager.create_conversation().await.id().to_string();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        // Activity on the older session keeps it alive
        manager.send_message(&first, "hello").await.unwrap();
        let third = manager.create_conversation().await.id().to_string();

        assert_eq!(manager.conversation_count().await, 2);
        assert!(manager.conversation(&first).await.is_ok());
        assert!(matches!(
            manager.conversation(&second).await,
            Err(RuntimeError::ConversationNotFound(_))
        ));
        assert!(manager.conversation(&third).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_invoice() {
        let manager = manager(MockWallet::new());
        let id = manager.create_conversation().await.id().to_string();
        let err = manager.pay_invoice(&id, "nope").await.unwrap_err();
        assert!(matches!(err, RuntimeError::InvoiceNotFound(_)));
    }

    #[tokio::test]
    async fn test_transactions_newest_first() {
        let manager = manager(MockWallet::new());
        let (conv_a, inv_a) = issue_invoice(&manager, "10").await;
        let (conv_b, inv_b) = issue_invoice(&manager, "11").await;

        let first = manager.pay_invoice(&conv_a, &inv_a).await.unwrap();
        let second = manager.pay_invoice(&conv_b, &inv_b).await.unwrap();

        let txs = manager.transactions();
        assert_eq!(txs[0].hash, second.tx_hash);
        assert_eq!(txs[1].hash, first.tx_hash);
    }

    #[tokio::test]
    async fn test_connect_wallet() {
        let manager = manager(MockWallet::new());
        let account = manager.connect_wallet().await.unwrap();
        assert_eq!(account.as_str(), MOCK_ACCOUNT);
    }
}
