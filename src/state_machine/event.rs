//! Events that can occur in a dialogue

use crate::registry::CharityId;

/// Inputs that drive dialogue transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Free text typed by the user
    UserMessage { text: String },
    /// The user picked a charity straight from the browsable list
    CharitySelected { charity_id: CharityId },
}

impl Event {
    #[allow(dead_code)] // Used by tests
    pub fn user_message(text: impl Into<String>) -> Self {
        Event::UserMessage { text: text.into() }
    }
}
