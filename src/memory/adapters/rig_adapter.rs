//! Rig adapter for memory-aware chat with Ollama.

use std::sync::Arc;

use reqwest::Client as ReqwestClient;
use rig::client::CompletionClient;
use rig::completion::CompletionModel;
use rig::message::{AssistantContent, Message};
use rig::providers::ollama;
use tracing::debug;

use crate::memory::adapters::advisor::MemoryAdvisor;
use crate::memory::core::config::{LlmConfig, MemoryConfig};
use crate::memory::core::errors::{MemoryError, MemoryResult};
use crate::memory::core::ids::ConversationId;
use crate::memory::core::message::ChatMessage;
use crate::memory::store::ChatMemory;

/// Chat client that runs every completion through a [`MemoryAdvisor`].
pub struct RigChat {
    model: ollama::CompletionModel,
    advisor: MemoryAdvisor,
    llm: LlmConfig,
}

impl RigChat {
    /// Build the Ollama client and the advisor.
    ///
    /// # Errors
    /// Returns an error if the Ollama client cannot be built.
    pub fn new(config: &MemoryConfig, memory: Arc<dyn ChatMemory>) -> MemoryResult<Self> {
        let builder = ollama::Client::<ReqwestClient>::builder().api_key(rig::client::Nothing);
        let builder = if let Some(base_url) = &config.llm.base_url {
            builder.base_url(base_url)
        } else {
            builder
        };
        let client = builder.build().map_err(MemoryError::from)?;
        let model = client.completion_model(config.llm.model.clone());

        Ok(Self {
            model,
            advisor: MemoryAdvisor::new(memory, config.advisor.clone()),
            llm: config.llm.clone(),
        })
    }

    /// Borrow the advisor.
    #[must_use]
    pub const fn advisor(&self) -> &MemoryAdvisor {
        &self.advisor
    }

    /// Answer `question` in `conversation_id`, recording both sides of the turn.
    ///
    /// # Errors
    /// Returns an error if memory access or the completion fails.
    pub async fn chat(
        &self,
        conversation_id: &ConversationId,
        question: &str,
    ) -> MemoryResult<String> {
        let prepared = self.advisor.before(conversation_id, question).await?;
        let history = to_rig_messages(&prepared.turns);

        debug!(
            "Completion request for conversation {} with {} history messages",
            conversation_id,
            history.len()
        );

        let builder = self
            .model
            .completion_request(question.to_string())
            .messages(history)
            .temperature(self.llm.temperature)
            .max_tokens_opt(self.llm.max_tokens);
        let builder = match prepared.preamble {
            Some(preamble) => builder.preamble(preamble),
            None => builder,
        };
        let request = builder.build();

        let response = self.model.completion(request).await?;
        let assistant_text = extract_text(&response.choice);

        self.advisor.after(conversation_id, &assistant_text).await?;

        Ok(assistant_text)
    }
}

/// Convert chronological user and assistant turns into Rig chat history.
///
/// System messages belong in the preamble and tool messages never come out
/// of the store, so both are skipped.
#[must_use]
pub fn to_rig_messages(turns: &[ChatMessage]) -> Vec<Message> {
    turns
        .iter()
        .filter_map(|turn| match turn {
            ChatMessage::User { text, .. } => Some(Message::user(text.clone())),
            ChatMessage::Assistant { text, .. } => Some(Message::assistant(text.clone())),
            ChatMessage::System { .. } | ChatMessage::Tool { .. } => None,
        })
        .collect()
}

fn extract_text(choice: &rig::OneOrMany<AssistantContent>) -> String {
    let mut out = String::new();
    for content in choice.iter() {
        if let AssistantContent::Text(text) = content {
            out.push_str(&text.text);
        }
    }
    out
}
