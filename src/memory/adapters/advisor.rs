//! Memory advisor: loads history before a model call and records the turn around it.

use std::sync::Arc;

use tracing::debug;

use crate::memory::core::config::AdvisorConfig;
use crate::memory::core::errors::MemoryResult;
use crate::memory::core::ids::ConversationId;
use crate::memory::core::message::ChatMessage;
use crate::memory::store::ChatMemory;

/// History prepared for one model call.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedHistory {
    /// Configured system prompt followed by stored system messages, oldest first.
    pub preamble: Option<String>,
    /// Prior user and assistant turns, oldest first.
    pub turns: Vec<ChatMessage>,
    /// The new user message, tagged with its stored id.
    pub user_message: ChatMessage,
}

/// Advisor wrapping a model call with chat memory reads and writes.
#[derive(Clone)]
pub struct MemoryAdvisor {
    memory: Arc<dyn ChatMemory>,
    config: AdvisorConfig,
}

impl MemoryAdvisor {
    /// Create an advisor over a memory provider.
    #[must_use]
    pub fn new(memory: Arc<dyn ChatMemory>, config: AdvisorConfig) -> Self {
        Self { memory, config }
    }

    /// Borrow the underlying memory provider.
    #[must_use]
    pub const fn memory(&self) -> &Arc<dyn ChatMemory> {
        &self.memory
    }

    /// Load history for `conversation_id`, then store the user message.
    ///
    /// The store reads most-recent-first; history handed to the model is
    /// reversed into chronological order here.
    ///
    /// # Errors
    /// Returns an error if the history cannot be read or the message stored.
    pub async fn before(
        &self,
        conversation_id: &ConversationId,
        user_text: &str,
    ) -> MemoryResult<PreparedHistory> {
        let mut history = self
            .memory
            .read(conversation_id, self.config.history_end_index)
            .await?;
        history.reverse();

        let mut system_parts: Vec<String> = self.config.system_prompt.iter().cloned().collect();
        let mut turns = Vec::with_capacity(history.len());
        for message in history {
            match message {
                ChatMessage::System { text, .. } => system_parts.push(text),
                other => turns.push(other),
            }
        }

        let mut batch = [ChatMessage::user(user_text)];
        self.memory.append(conversation_id, &mut batch).await?;
        let [user_message] = batch;

        debug!(
            "Advisor loaded {} turns for conversation {} (question {} chars)",
            turns.len(),
            conversation_id,
            user_text.len()
        );

        let preamble = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n\n"))
        };

        Ok(PreparedHistory {
            preamble,
            turns,
            user_message,
        })
    }

    /// Store the assistant reply for `conversation_id`.
    ///
    /// # Errors
    /// Returns an error if the message cannot be stored.
    pub async fn after(
        &self,
        conversation_id: &ConversationId,
        assistant_text: &str,
    ) -> MemoryResult<ChatMessage> {
        let mut batch = [ChatMessage::assistant(assistant_text)];
        self.memory.append(conversation_id, &mut batch).await?;
        let [assistant_message] = batch;

        debug!(
            "Advisor stored reply for conversation {} ({} chars)",
            conversation_id,
            assistant_text.len()
        );

        Ok(assistant_message)
    }
}
