//! Pure state transition function
//!
//! A user message is resolved by walking an ordered rule table. Global
//! overrides come first, then phase-specific rules, then a catch-all. The
//! first rule that fires decides the next state and the reply; nothing after
//! it is evaluated.

use super::amount::{parse_amount, AmountError};
use super::{AgentResponse, DialogueState, DonationTier, Event, PaymentCard, Phase};
use crate::registry::{Category, CharityId, CharityRecord, Registry};
use rust_decimal::Decimal;
use thiserror::Error;

const EMERGENCY_WORDS: &[&str] = &["urgent", "emergency", "disaster"];
const GREETING_WORDS: &[&str] = &["hello", "start", "reset"];
const SMALL_BUDGET_WORDS: &[&str] = &["small", "tiny", "little"];
const AFFIRMATIVE_WORDS: &[&str] = &["yes", "sure", "ok", "confirm"];
const INFO_WORDS: &[&str] = &["more", "tell", "details", "what", "who"];
const NEGATIVE_WORDS: &[&str] = &["no", "cancel"];

const GREETING_TEXT: &str = "Hello! I am your Verifiable Charity Agent. \n\n\
**Scenarios available:**\n\
1. Tell me a cause (e.g. 'Environment')\n\
2. Mention 'Urgent' for emergency response\n\
3. Browse the list manually\n\n\
How can I help?";

const SMALL_BUDGET_TEXT: &str = "Micro-donations are the backbone of decentralized funding! 💧 \n\n\
Please select a cause, and I'll generate a gas-optimized transaction for you. \
(Try 'Education' or 'Arts')";

const NO_MATCH_TEXT: &str = "I couldn't find a specific match. You can browse the list on the right, \
or tell me if this is an 'Urgent' situation.";

const RESTART_TEXT: &str = "Understood. Let's start over. What cause are you interested in?";

const BAD_AMOUNT_TEXT: &str = "I couldn't understand the amount. Please enter a number (e.g. 50).";

const NEGATIVE_AMOUNT_TEXT: &str =
    "Donations can't be negative. Please enter a positive number (e.g. 50).";

const LOST_SELECTION_TEXT: &str =
    "I lost track of the charity you picked. What cause are you interested in?";

const FALLBACK_TEXT: &str = "I didn't quite catch that. Try saying 'Hello' to restart.";

/// Identifies which rule produced a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleId {
    EmergencyOverride,
    GreetingReset,
    SmallBudgetHint,
    DiscoveryMatch,
    DiscoveryNoMatch,
    ConfirmAccept,
    ConfirmDetails,
    ConfirmDecline,
    AmountCapture,
    Fallback,
    /// Charity picked from the list rather than typed; not part of the table
    ListSelection,
}

/// Result of a state transition
#[derive(Debug, Clone)]
pub struct TransitionResult {
    pub new_state: DialogueState,
    pub response: AgentResponse,
    pub rule: RuleId,
}

impl TransitionResult {
    fn new(rule: RuleId, new_state: DialogueState, response: AgentResponse) -> Self {
        Self {
            new_state,
            response,
            rule,
        }
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Unknown charity: {0}")]
    UnknownCharity(CharityId),
}

/// Everything a rule may look at for one turn
struct Turn<'a> {
    state: &'a DialogueState,
    registry: &'a Registry,
    /// Case-folded utterance
    text: &'a str,
}

impl<'a> Turn<'a> {
    fn phase(&self) -> Phase {
        self.state.phase
    }

    fn mentions_any(&self, words: &[&str]) -> bool {
        words.iter().any(|w| self.text.contains(w))
    }

    fn selected(&self) -> Option<&'a CharityRecord> {
        self.state
            .selected_charity
            .as_ref()
            .and_then(|id| self.registry.get(id))
    }

    fn stay(&self, rule: RuleId, response: AgentResponse) -> TransitionResult {
        TransitionResult::new(rule, self.state.clone(), response)
    }
}

struct Rule {
    id: RuleId,
    fire: fn(&Turn<'_>) -> Option<TransitionResult>,
}

/// Rule precedence, highest first
static RULES: [Rule; 10] = [
    Rule {
        id: RuleId::EmergencyOverride,
        fire: emergency_override,
    },
    Rule {
        id: RuleId::GreetingReset,
        fire: greeting_reset,
    },
    Rule {
        id: RuleId::SmallBudgetHint,
        fire: small_budget_hint,
    },
    Rule {
        id: RuleId::DiscoveryMatch,
        fire: discovery_match,
    },
    Rule {
        id: RuleId::DiscoveryNoMatch,
        fire: discovery_no_match,
    },
    Rule {
        id: RuleId::ConfirmAccept,
        fire: confirm_accept,
    },
    Rule {
        id: RuleId::ConfirmDetails,
        fire: confirm_details,
    },
    Rule {
        id: RuleId::ConfirmDecline,
        fire: confirm_decline,
    },
    Rule {
        id: RuleId::AmountCapture,
        fire: amount_capture,
    },
    Rule {
        id: RuleId::Fallback,
        fire: fallback_rule,
    },
];

/// Order in which rules are tried for a user message
#[cfg(test)]
fn rule_order() -> impl Iterator<Item = RuleId> {
    RULES.iter().map(|rule| rule.id)
}

/// Pure transition function
///
/// Given the same state, registry and event it always produces the same
/// result, with no I/O.
pub fn transition(
    state: &DialogueState,
    registry: &Registry,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match event {
        Event::UserMessage { text } => Ok(respond_to_message(state, registry, &text)),
        Event::CharitySelected { charity_id } => select_from_list(registry, &charity_id),
    }
}

/// Resolve one user utterance; never fails, unrecognized input degrades to a reply
pub fn respond_to_message(
    state: &DialogueState,
    registry: &Registry,
    text: &str,
) -> TransitionResult {
    let folded = text.to_lowercase();
    let turn = Turn {
        state,
        registry,
        text: &folded,
    };

    RULES
        .iter()
        .find_map(|rule| {
            let result = (rule.fire)(&turn)?;
            debug_assert_eq!(result.rule, rule.id);
            Some(result)
        })
        .unwrap_or_else(|| fallback(&turn))
}

fn select_from_list(
    registry: &Registry,
    charity_id: &CharityId,
) -> Result<TransitionResult, TransitionError> {
    let charity = registry
        .get(charity_id)
        .ok_or_else(|| TransitionError::UnknownCharity(charity_id.clone()))?;

    let text = format!(
        "Excellent choice! **{}** is a verified entity on Cronos. \n\n{}\n\nWould you like to donate?",
        charity.name, charity.description
    );
    Ok(TransitionResult::new(
        RuleId::ListSelection,
        DialogueState::selecting(Phase::ConfirmCharity, charity.id.clone()),
        AgentResponse::show_details(text, charity.clone()),
    ))
}

// ============================================================
// Global overrides
// ============================================================

fn emergency_override(turn: &Turn<'_>) -> Option<TransitionResult> {
    if !turn.mentions_any(EMERGENCY_WORDS) {
        return None;
    }
    let recommended = turn.registry.filter(Category::Health).into_iter().next()?;

    let text = format!(
        "🚨 **Emergency Response Mode Activated** 🚨\n\n\
         I've detected an urgent request. recommending **{}** for immediate medical/disaster relief.\n\n\
         Verified ID: {}. \n\nProceed with donation?",
        recommended.name, recommended.id
    );
    Some(TransitionResult::new(
        RuleId::EmergencyOverride,
        DialogueState::selecting(Phase::ConfirmCharity, recommended.id.clone()),
        AgentResponse::show_details(text, recommended.clone()),
    ))
}

fn greeting_reset(turn: &Turn<'_>) -> Option<TransitionResult> {
    turn.mentions_any(GREETING_WORDS).then(|| {
        TransitionResult::new(
            RuleId::GreetingReset,
            DialogueState::cleared(Phase::Discovery),
            AgentResponse::reply(GREETING_TEXT),
        )
    })
}

// ============================================================
// Discovery
// ============================================================

fn small_budget_hint(turn: &Turn<'_>) -> Option<TransitionResult> {
    (turn.phase().is_discovering() && turn.mentions_any(SMALL_BUDGET_WORDS))
        .then(|| turn.stay(RuleId::SmallBudgetHint, AgentResponse::reply(SMALL_BUDGET_TEXT)))
}

fn discovery_match(turn: &Turn<'_>) -> Option<TransitionResult> {
    if !turn.phase().is_discovering() {
        return None;
    }
    let found = turn.registry.search(turn.text)?;

    let text = format!(
        "I found a match: **{}** {}.\n\n*{}*\n\nVerified ID: {}. Would you like to support them?",
        found.name, found.icon, found.description, found.id
    );
    Some(TransitionResult::new(
        RuleId::DiscoveryMatch,
        DialogueState::selecting(Phase::ConfirmCharity, found.id.clone()),
        AgentResponse::show_details(text, found.clone()),
    ))
}

/// Only from DISCOVERY; an unmatched IDLE utterance goes to the fallback
fn discovery_no_match(turn: &Turn<'_>) -> Option<TransitionResult> {
    (turn.phase() == Phase::Discovery)
        .then(|| turn.stay(RuleId::DiscoveryNoMatch, AgentResponse::reply(NO_MATCH_TEXT)))
}

// ============================================================
// Confirmation
// ============================================================

fn confirm_accept(turn: &Turn<'_>) -> Option<TransitionResult> {
    if turn.phase() != Phase::ConfirmCharity || !turn.mentions_any(AFFIRMATIVE_WORDS) {
        return None;
    }
    let charity = turn.selected()?;

    Some(TransitionResult::new(
        RuleId::ConfirmAccept,
        turn.state.with_phase(Phase::AwaitAmount),
        AgentResponse::reply(format!(
            "Great. How much CRO would you like to donate to **{}**?",
            charity.name
        )),
    ))
}

fn confirm_details(turn: &Turn<'_>) -> Option<TransitionResult> {
    if turn.phase() != Phase::ConfirmCharity || !turn.mentions_any(INFO_WORDS) {
        return None;
    }
    let charity = turn.selected()?;

    Some(turn.stay(
        RuleId::ConfirmDetails,
        AgentResponse::reply(format!(
            "📖 **About {}**\n\n{}\n\nReady to donate?",
            charity.name, charity.bio
        )),
    ))
}

fn confirm_decline(turn: &Turn<'_>) -> Option<TransitionResult> {
    (turn.phase() == Phase::ConfirmCharity && turn.mentions_any(NEGATIVE_WORDS)).then(|| {
        TransitionResult::new(
            RuleId::ConfirmDecline,
            DialogueState::cleared(Phase::Discovery),
            AgentResponse::reply(RESTART_TEXT),
        )
    })
}

// ============================================================
// Amount capture
// ============================================================

fn amount_capture(turn: &Turn<'_>) -> Option<TransitionResult> {
    if turn.phase() != Phase::AwaitAmount {
        return None;
    }

    let amount = match parse_amount(turn.text) {
        Ok(amount) => amount,
        Err(AmountError::Negative) => {
            return Some(turn.stay(
                RuleId::AmountCapture,
                AgentResponse::reply(NEGATIVE_AMOUNT_TEXT),
            ));
        }
        Err(AmountError::Missing | AmountError::OutOfRange) => {
            return Some(turn.stay(RuleId::AmountCapture, AgentResponse::reply(BAD_AMOUNT_TEXT)));
        }
    };

    let Some(charity) = turn.selected() else {
        return Some(TransitionResult::new(
            RuleId::AmountCapture,
            DialogueState::cleared(Phase::Discovery),
            AgentResponse::reply(LOST_SELECTION_TEXT),
        ));
    };

    let tier = DonationTier::classify(amount);
    let card = PaymentCard {
        charity: charity.clone(),
        amount,
        tier,
    };

    // Selection is kept after the card is issued
    Some(TransitionResult::new(
        RuleId::AmountCapture,
        turn.state.with_phase(Phase::Idle),
        AgentResponse::payment_card(payment_text(tier, amount), card),
    ))
}

fn payment_text(tier: DonationTier, amount: Decimal) -> String {
    let amount = amount.normalize();
    match tier {
        DonationTier::Vip => format!(
            "🌟 **High Impact Donor Detected** 🌟\n\n\
             For a donation of {amount} CRO, you qualify for a **Titanium Tier Impact NFT** receipt.\n\n\
             Preparing your VIP payment card..."
        ),
        DonationTier::Micro => {
            "Thanks for your micro-donation! 💧\n\nEvery CRO counts. Here is your express payment link:"
                .to_string()
        }
        DonationTier::Standard => format!("Generating x402 Payment Request for **{amount} CRO**..."),
    }
}

fn fallback_rule(turn: &Turn<'_>) -> Option<TransitionResult> {
    Some(fallback(turn))
}

fn fallback(turn: &Turn<'_>) -> TransitionResult {
    turn.stay(RuleId::Fallback, AgentResponse::reply(FALLBACK_TEXT))
}
