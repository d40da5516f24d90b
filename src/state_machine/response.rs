//! Agent responses produced by dialogue transitions

use crate::registry::CharityRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Donation size band, drives how the payment card is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DonationTier {
    Vip,
    Micro,
    Standard,
}

impl DonationTier {
    /// Amounts at or above this are VIP
    pub const VIP_THRESHOLD: u32 = 500;
    /// Amounts strictly below this are MICRO
    pub const MICRO_THRESHOLD: u32 = 5;

    pub fn classify(amount: Decimal) -> Self {
        if amount >= Decimal::from(Self::VIP_THRESHOLD) {
            DonationTier::Vip
        } else if amount < Decimal::from(Self::MICRO_THRESHOLD) {
            DonationTier::Micro
        } else {
            DonationTier::Standard
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DonationTier::Vip => "VIP",
            DonationTier::Micro => "MICRO",
            DonationTier::Standard => "STANDARD",
        }
    }
}

impl fmt::Display for DonationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a payment card: who gets paid, how much, and in which band
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentCard {
    pub charity: CharityRecord,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub tier: DonationTier,
}

/// UI action attached to a reply
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentAction {
    None,
    ShowDetails(CharityRecord),
    ShowPaymentCard(PaymentCard),
}

/// One agent turn: reply text plus an optional UI action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentResponse {
    pub text: String,
    #[serde(flatten)]
    pub action: AgentAction,
}

impl AgentResponse {
    /// Plain chat reply
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: AgentAction::None,
        }
    }

    pub fn show_details(text: impl Into<String>, charity: CharityRecord) -> Self {
        Self {
            text: text.into(),
            action: AgentAction::ShowDetails(charity),
        }
    }

    pub fn payment_card(text: impl Into<String>, card: PaymentCard) -> Self {
        Self {
            text: text.into(),
            action: AgentAction::ShowPaymentCard(card),
        }
    }

    pub fn payment(&self) -> Option<&PaymentCard> {
        match &self.action {
            AgentAction::ShowPaymentCard(card) => Some(card),
            _ => None,
        }
    }

    #[allow(dead_code)] // API completeness
    pub fn details(&self) -> Option<&CharityRecord> {
        match &self.action {
            AgentAction::ShowDetails(charity) => Some(charity),
            _ => None,
        }
    }
}
