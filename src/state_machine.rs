//! Donation dialogue state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! `(state, event) -> (new state, response)`, no I/O.

mod amount;
mod event;
mod response;
mod state;
mod transition;

#[cfg(test)]
mod proptests;

#[allow(unused_imports)] // Public API re-exports
pub use amount::{parse_amount, AmountError};
pub use event::Event;
#[allow(unused_imports)] // Public API re-exports
pub use response::{AgentAction, AgentResponse, DonationTier, PaymentCard};
pub use state::{DialogueState, Phase};
#[allow(unused_imports)] // Public API re-exports
pub use transition::{respond_to_message, transition, RuleId, TransitionError, TransitionResult};
