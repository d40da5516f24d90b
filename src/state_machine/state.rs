//! Dialogue state types

use crate::registry::CharityId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position in the donation dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Fresh conversation, or a payment card was just issued
    #[default]
    Idle,
    /// Looking for a cause
    Discovery,
    /// A charity is proposed, waiting for yes/no/details
    ConfirmCharity,
    /// Charity confirmed, waiting for a donation amount
    AwaitAmount,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "IDLE",
            Phase::Discovery => "DISCOVERY",
            Phase::ConfirmCharity => "CONFIRM_CHARITY",
            Phase::AwaitAmount => "AWAIT_AMOUNT",
        }
    }

    /// Phases that require a selected charity
    pub fn requires_selection(self) -> bool {
        matches!(self, Phase::ConfirmCharity | Phase::AwaitAmount)
    }

    pub fn is_discovering(self) -> bool {
        matches!(self, Phase::Idle | Phase::Discovery)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-conversation dialogue state
///
/// The selection is a registry key, resolved on demand; the registry owns
/// the record itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueState {
    pub phase: Phase,
    pub selected_charity: Option<CharityId>,
}

impl DialogueState {
    pub fn new(phase: Phase, selected_charity: Option<CharityId>) -> Self {
        Self {
            phase,
            selected_charity,
        }
    }

    /// `phase` with the selection cleared
    pub fn cleared(phase: Phase) -> Self {
        Self::new(phase, None)
    }

    pub fn selecting(phase: Phase, charity: CharityId) -> Self {
        Self::new(phase, Some(charity))
    }

    /// Same selection, different phase
    pub fn with_phase(&self, phase: Phase) -> Self {
        Self::new(phase, self.selected_charity.clone())
    }

    /// Selection present whenever the phase needs one
    pub fn is_consistent(&self) -> bool {
        !self.phase.requires_selection() || self.selected_charity.is_some()
    }
}
