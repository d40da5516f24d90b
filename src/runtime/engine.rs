//! Per-conversation dialogue engine
//!
//! Owns the dialogue state and feeds each turn through the pure transition
//! function. One engine per session; turns are processed one at a time.

use crate::registry::{CharityId, CharityRecord, Registry};
use crate::state_machine::{
    respond_to_message, transition, AgentResponse, DialogueState, Event, Phase, TransitionError,
    TransitionResult,
};
use std::sync::Arc;

pub struct DialogueEngine {
    registry: Arc<Registry>,
    state: DialogueState,
}

impl DialogueEngine {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            state: DialogueState::default(),
        }
    }

    #[allow(dead_code)] // API completeness
    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// The selected charity, resolved against the registry
    #[allow(dead_code)] // API completeness
    pub fn selected_charity(&self) -> Option<&CharityRecord> {
        self.state
            .selected_charity
            .as_ref()
            .and_then(|id| self.registry.get(id))
    }

    /// Process one user utterance and return the agent's reply
    pub fn process_message(&mut self, utterance: &str) -> AgentResponse {
        let result = respond_to_message(&self.state, &self.registry, utterance);
        self.commit(result)
    }

    /// Apply a charity picked from the browse list
    pub fn select_charity(&mut self, id: &CharityId) -> Result<AgentResponse, TransitionError> {
        let result = transition(
            &self.state,
            &self.registry,
            Event::CharitySelected {
                charity_id: id.clone(),
            },
        )?;
        Ok(self.commit(result))
    }

    fn commit(&mut self, result: TransitionResult) -> AgentResponse {
        tracing::debug!(
            from = %self.state.phase,
            to = %result.new_state.phase,
            rule = ?result.rule,
            "Dialogue transition"
        );
        debug_assert!(result.new_state.is_consistent());
        self.state = result.new_state;
        result.response
    }
}
