//! Runtime for hosting dialogue sessions
//!
//! Each conversation owns one [`DialogueEngine`]; turns within a
//! conversation are serialized, conversations are independent of each
//! other. Payment cards become invoices that are paid through the shared
//! [`DonationExecutor`].

mod donation;
mod engine;

#[cfg(test)]
pub mod testing;

#[allow(unused_imports)] // Public API re-exports
pub use donation::{
    failure_message, DonationExecutor, DonationOutcome, Invoice, InvoiceStatus, TrackedTx,
    TxMonitor, TxStatus,
};
pub use engine::DialogueEngine;

use crate::registry::{CharityId, Registry};
use crate::state_machine::{AgentResponse, Phase, TransitionError};
use crate::wallet::{AccountId, WalletBridge, WalletError};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError};
use std::time::Instant;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

/// Sessions kept before the least recently active one is evicted
pub const DEFAULT_MAX_CONVERSATIONS: usize = 10_000;

type InvoiceMap = std::sync::Mutex<HashMap<String, Invoice>>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),
    #[error("Invoice {0} is already being paid")]
    InvoiceBusy(String),
    #[error("Invoice {0} has already been paid")]
    InvoiceAlreadyPaid(String),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// Result of one chat turn
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub response: AgentResponse,
    pub phase: Phase,
    /// Set when the turn issued a payment card
    pub invoice_id: Option<String>,
}

/// One dialogue session
pub struct Conversation {
    id: String,
    engine: Mutex<DialogueEngine>,
    /// Never held across an await
    invoices: InvoiceMap,
    last_active: std::sync::Mutex<Instant>,
}

impl Conversation {
    fn new(id: String, registry: Arc<Registry>) -> Self {
        Self {
            id,
            engine: Mutex::new(DialogueEngine::new(registry)),
            invoices: std::sync::Mutex::new(HashMap::new()),
            last_active: std::sync::Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        *self
            .last_active
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    fn last_active(&self) -> Instant {
        *self
            .last_active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn phase(&self) -> Phase {
        self.engine.lock().await.phase()
    }

    /// Register the payment card of a turn, if any, as an unpaid invoice
    fn record_turn(&self, response: AgentResponse, phase: Phase) -> ChatTurn {
        let invoice_id = match response.payment() {
            Some(card) => {
                let invoice = Invoice::new(card.clone());
                let id = invoice.id.clone();
                tracing::info!(
                    conv_id = %self.id,
                    invoice_id = %id,
                    charity = %card.charity.id,
                    amount = %card.amount,
                    tier = %card.tier,
                    "Invoice issued"
                );
                self.invoices
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(id.clone(), invoice);
                Some(id)
            }
            None => None,
        };
        ChatTurn {
            response,
            phase,
            invoice_id,
        }
    }
}

/// Marks an invoice `Failed` if a payment is abandoned mid-flight.
///
/// A dropped request future must not leave the invoice `Processing`, or it
/// could never be retried.
struct PaymentGuard<'a> {
    invoices: &'a InvoiceMap,
    invoice_id: &'a str,
    armed: bool,
}

impl<'a> PaymentGuard<'a> {
    fn new(invoices: &'a InvoiceMap, invoice_id: &'a str) -> Self {
        Self {
            invoices,
            invoice_id,
            armed: true,
        }
    }

    /// Record the donation result and disarm
    fn settle(mut self, result: &Result<DonationOutcome, WalletError>) {
        self.armed = false;
        let mut invoices = self.invoices.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(invoice) = invoices.get_mut(self.invoice_id) {
            match result {
                Ok(outcome) => {
                    invoice.status = outcome.status;
                    invoice.tx_hash = Some(outcome.tx_hash.clone());
                }
                Err(_) => invoice.status = InvoiceStatus::Failed,
            }
        }
    }
}

impl Drop for PaymentGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut invoices = self.invoices.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(invoice) = invoices.get_mut(self.invoice_id) {
            if invoice.status == InvoiceStatus::Processing {
                invoice.status = InvoiceStatus::Failed;
                tracing::warn!(invoice_id = %self.invoice_id, "Payment abandoned before settling");
            }
        }
    }
}

/// Manager for all dialogue sessions
pub struct ConversationManager<W: WalletBridge> {
    registry: Arc<Registry>,
    donations: DonationExecutor<W>,
    conversations: RwLock<HashMap<String, Arc<Conversation>>>,
    max_conversations: usize,
}

impl<W: WalletBridge> ConversationManager<W> {
    pub fn new(registry: Arc<Registry>, wallet: W) -> Self {
        Self::with_capacity(registry, wallet, DEFAULT_MAX_CONVERSATIONS)
    }

    pub fn with_capacity(registry: Arc<Registry>, wallet: W, max_conversations: usize) -> Self {
        Self {
            registry,
            donations: DonationExecutor::new(wallet),
            conversations: RwLock::new(HashMap::new()),
            max_conversations: max_conversations.max(1),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Start a new session in IDLE, evicting the least recently active one when full
    pub async fn create_conversation(&self) -> Arc<Conversation> {
        let id = uuid::Uuid::new_v4().to_string();
        let conversation = Arc::new(Conversation::new(id.clone(), Arc::clone(&self.registry)));

        let mut conversations = self.conversations.write().await;
        while conversations.len() >= self.max_conversations {
            let Some(stale) = conversations
                .values()
                .min_by_key(|c| c.last_active())
                .map(|c| c.id.clone())
            else {
                break;
            };
            conversations.remove(&stale);
            tracing::info!(conv_id = %stale, "Conversation evicted");
        }
        conversations.insert(id.clone(), Arc::clone(&conversation));
        drop(conversations);

        tracing::info!(conv_id = %id, "Conversation created");
        conversation
    }

    pub async fn conversation(&self, conv_id: &str) -> Result<Arc<Conversation>, RuntimeError> {
        let conversation = self
            .conversations
            .read()
            .await
            .get(conv_id)
            .cloned()
            .ok_or_else(|| RuntimeError::ConversationNotFound(conv_id.to_string()))?;
        conversation.touch();
        Ok(conversation)
    }

    #[allow(dead_code)] // API completeness
    pub async fn conversation_count(&self) -> usize {
        self.conversations.read().await.len()
    }

    pub async fn send_message(&self, conv_id: &str, text: &str) -> Result<ChatTurn, RuntimeError> {
        let conversation = self.conversation(conv_id).await?;
        let (response, phase) = {
            let mut engine = conversation.engine.lock().await;
            let response = engine.process_message(text);
            (response, engine.phase())
        };
        Ok(conversation.record_turn(response, phase))
    }

    pub async fn select_charity(
        &self,
        conv_id: &str,
        charity_id: &CharityId,
    ) -> Result<ChatTurn, RuntimeError> {
        let conversation = self.conversation(conv_id).await?;
        let (response, phase) = {
            let mut engine = conversation.engine.lock().await;
            let response = engine.select_charity(charity_id)?;
            (response, engine.phase())
        };
        Ok(conversation.record_turn(response, phase))
    }

    #[allow(dead_code)] // API completeness
    pub async fn invoice(&self, conv_id: &str, invoice_id: &str) -> Result<Invoice, RuntimeError> {
        let conversation = self.conversation(conv_id).await?;
        let invoices = conversation
            .invoices
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        invoices
            .get(invoice_id)
            .cloned()
            .ok_or_else(|| RuntimeError::InvoiceNotFound(invoice_id.to_string()))
    }

    /// Pay an invoice.
    ///
    /// Only one payment may be in flight per invoice. A paid invoice cannot
    /// be paid again; a failed or abandoned one may be retried.
    pub async fn pay_invoice(
        &self,
        conv_id: &str,
        invoice_id: &str,
    ) -> Result<DonationOutcome, RuntimeError> {
        let conversation = self.conversation(conv_id).await?;

        let card = {
            let mut invoices = conversation
                .invoices
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let invoice = invoices
                .get_mut(invoice_id)
                .ok_or_else(|| RuntimeError::InvoiceNotFound(invoice_id.to_string()))?;
            match invoice.status {
                InvoiceStatus::Processing => {
                    return Err(RuntimeError::InvoiceBusy(invoice_id.to_string()))
                }
                InvoiceStatus::Paid => {
                    return Err(RuntimeError::InvoiceAlreadyPaid(invoice_id.to_string()))
                }
                InvoiceStatus::Unpaid | InvoiceStatus::Failed => {}
            }
            invoice.status = InvoiceStatus::Processing;
            invoice.card.clone()
        };

        let guard = PaymentGuard::new(&conversation.invoices, invoice_id);
        let result = self.donations.donate(&card).await;
        guard.settle(&result);

        match &result {
            Ok(outcome) => tracing::info!(
                conv_id,
                invoice_id,
                tx = %outcome.tx_hash,
                status = ?outcome.status,
                "Donation settled"
            ),
            Err(e) => tracing::warn!(
                conv_id,
                invoice_id,
                kind = e.kind.as_str(),
                error = %e,
                "Donation failed"
            ),
        }

        result.map_err(RuntimeError::from)
    }

    pub async fn connect_wallet(&self) -> Result<AccountId, WalletError> {
        self.donations.connect().await
    }

    pub fn transactions(&self) -> Vec<TrackedTx> {
        self.donations.monitor().snapshot()
    }
}
