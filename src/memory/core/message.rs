//! Message model: the caller-facing [`ChatMessage`] and its stored [`MessageRecord`] form.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::memory::core::errors::MemoryError;
use crate::memory::core::ids::MessageId;

/// Insertion-ordered metadata attached to every message.
pub type Metadata = serde_json::Map<String, Value>;

/// Speaker category of a message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// System instruction.
    System,
    /// User input.
    User,
    /// Assistant output.
    Assistant,
    /// Tool output. Decodable, but not supported by the memory store.
    Tool,
}

impl MessageRole {
    /// Stable string form for storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tool invocation requested by the assistant.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call identifier assigned by the model.
    pub id: String,
    /// Tool name.
    pub name: String,
    /// Raw JSON arguments.
    pub arguments: String,
}

/// Result of a tool invocation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Identifier of the call this answers.
    pub id: String,
    /// Tool name.
    pub name: String,
    /// Raw response payload.
    pub response_data: String,
}

/// One conversation turn as seen by callers of the memory store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "message_type", rename_all = "snake_case")]
pub enum ChatMessage {
    /// System instruction.
    System {
        /// Message body.
        text: String,
        /// Message metadata.
        #[serde(default)]
        metadata: Metadata,
    },
    /// User input.
    User {
        /// Message body.
        text: String,
        /// Message metadata.
        #[serde(default)]
        metadata: Metadata,
    },
    /// Assistant output.
    Assistant {
        /// Message body.
        text: String,
        /// Message metadata.
        #[serde(default)]
        metadata: Metadata,
        /// Tool calls requested alongside the text.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    /// Tool responses fed back to the model.
    Tool {
        /// Responses carried by this message.
        responses: Vec<ToolResponse>,
        /// Message metadata.
        #[serde(default)]
        metadata: Metadata,
    },
}

impl ChatMessage {
    /// Build a system message.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self::System {
            text: text.into(),
            metadata: Metadata::new(),
        }
    }

    /// Build a user message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::User {
            text: text.into(),
            metadata: Metadata::new(),
        }
    }

    /// Build an assistant message without tool calls.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant {
            text: text.into(),
            metadata: Metadata::new(),
            tool_calls: Vec::new(),
        }
    }

    /// Build a tool response message.
    #[must_use]
    pub fn tool(responses: Vec<ToolResponse>) -> Self {
        Self::Tool {
            responses,
            metadata: Metadata::new(),
        }
    }

    /// Attach a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata_mut().insert(key.into(), value.into());
        self
    }

    /// Role of this message.
    #[must_use]
    pub const fn role(&self) -> MessageRole {
        match self {
            Self::System { .. } => MessageRole::System,
            Self::User { .. } => MessageRole::User,
            Self::Assistant { .. } => MessageRole::Assistant,
            Self::Tool { .. } => MessageRole::Tool,
        }
    }

    /// Message body. Tool messages have no body.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::System { text, .. } | Self::User { text, .. } | Self::Assistant { text, .. } => {
                text
            }
            Self::Tool { .. } => "",
        }
    }

    /// Borrow the metadata.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        match self {
            Self::System { metadata, .. }
            | Self::User { metadata, .. }
            | Self::Assistant { metadata, .. }
            | Self::Tool { metadata, .. } => metadata,
        }
    }

    /// Mutably borrow the metadata.
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        match self {
            Self::System { metadata, .. }
            | Self::User { metadata, .. }
            | Self::Assistant { metadata, .. }
            | Self::Tool { metadata, .. } => metadata,
        }
    }

    /// Store-assigned id, if the message has been appended.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.metadata()
            .get(MessageId::METADATA_KEY)
            .and_then(Value::as_str)
    }

    /// Overwrite the id entry with a freshly generated one.
    pub fn assign_id(&mut self) -> MessageId {
        let id = MessageId::generate();
        self.metadata_mut().insert(
            MessageId::METADATA_KEY.to_string(),
            Value::String(id.to_string()),
        );
        id
    }
}

/// Stored form of a message: one JSON entry in the backend list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Role of the message.
    pub message_type: MessageRole,
    /// Message body.
    #[serde(default)]
    pub text: String,
    /// Message metadata, including the store-assigned id.
    #[serde(default)]
    pub metadata: Metadata,
    /// Assistant tool calls.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Tool responses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_responses: Vec<ToolResponse>,
}

impl MessageRecord {
    /// Id stored in the metadata, if any.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.metadata
            .get(MessageId::METADATA_KEY)
            .and_then(Value::as_str)
    }
}

impl From<&ChatMessage> for MessageRecord {
    fn from(message: &ChatMessage) -> Self {
        let mut record = Self {
            message_type: message.role(),
            text: message.text().to_string(),
            metadata: message.metadata().clone(),
            tool_calls: Vec::new(),
            tool_responses: Vec::new(),
        };
        match message {
            ChatMessage::Assistant { tool_calls, .. } => record.tool_calls.clone_from(tool_calls),
            ChatMessage::Tool { responses, .. } => record.tool_responses.clone_from(responses),
            ChatMessage::System { .. } | ChatMessage::User { .. } => {}
        }
        record
    }
}

impl TryFrom<MessageRecord> for ChatMessage {
    type Error = MemoryError;

    fn try_from(record: MessageRecord) -> Result<Self, Self::Error> {
        let MessageRecord {
            message_type,
            text,
            metadata,
            tool_calls,
            ..
        } = record;
        match message_type {
            MessageRole::System => Ok(Self::System { text, metadata }),
            MessageRole::User => Ok(Self::User { text, metadata }),
            MessageRole::Assistant => Ok(Self::Assistant {
                text,
                metadata,
                tool_calls,
            }),
            MessageRole::Tool => Err(MemoryError::UnsupportedRole(message_type)),
        }
    }
}
