//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::memory::adapters::RigChat;
use crate::memory::core::config::MemoryConfig;
use crate::memory::core::errors::MemoryResult;
use crate::memory::store::{ChatMemory, ChatMemoryStore};

/// Shared application state.
pub struct AppState {
    /// Conversation memory store.
    pub memory: Arc<dyn ChatMemory>,
    /// Memory-aware chat client.
    pub chat: RigChat,
}

impl AppState {
    /// Connect the configured backend and build the chat client.
    ///
    /// # Errors
    /// Returns an error if the backend cannot connect or the client cannot be built.
    pub async fn new(config: &MemoryConfig) -> MemoryResult<Arc<Self>> {
        let store = ChatMemoryStore::from_config(&config.backend).await?;
        Self::with_memory(config, Arc::new(store))
    }

    /// Build state around an existing memory provider.
    ///
    /// # Errors
    /// Returns an error if the chat client cannot be built.
    pub fn with_memory(config: &MemoryConfig, memory: Arc<dyn ChatMemory>) -> MemoryResult<Arc<Self>> {
        let chat = RigChat::new(config, Arc::clone(&memory))?;
        Ok(Arc::new(Self { memory, chat }))
    }
}
