//! HTTP API for the charity donation agent

mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::registry::Registry;
use crate::runtime::ConversationManager;
use crate::wallet::WalletBridge;
use std::sync::Arc;

/// Conversation manager over a type-erased wallet
pub type SharedRuntime = ConversationManager<Arc<dyn WalletBridge>>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<SharedRuntime>,
}

impl AppState {
    pub fn new(registry: Arc<Registry>, wallet: Arc<dyn WalletBridge>) -> Self {
        Self {
            runtime: Arc::new(ConversationManager::new(registry, wallet)),
        }
    }
}
