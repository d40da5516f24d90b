//! API request and response types

use crate::registry::{CharityId, CharityRecord};
use crate::runtime::{ChatTurn, TrackedTx};
use crate::state_machine::{AgentResponse, Phase};
use serde::{Deserialize, Serialize};

/// Filter for the charity list; absent or `All` lists everything
#[derive(Debug, Default, Deserialize)]
pub struct CharityListQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CharityListResponse {
    pub charities: Vec<CharityRecord>,
}

/// Charity profile plus the verification panel fields
#[derive(Debug, Serialize)]
pub struct CharityDetailResponse {
    pub charity: CharityRecord,
    pub short_address: String,
    pub cronos_id: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ConversationCreatedResponse {
    pub id: String,
    pub phase: Phase,
}

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Request to pick a charity from the list
#[derive(Debug, Deserialize)]
pub struct SelectCharityRequest {
    pub charity_id: CharityId,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: AgentResponse,
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
}

impl From<ChatTurn> for ChatResponse {
    fn from(turn: ChatTurn) -> Self {
        Self {
            response: turn.response,
            phase: turn.phase,
            invoice_id: turn.invoice_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WalletConnectResponse {
    pub account: String,
    pub short_account: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<TrackedTx>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
