//! Core memory types and identifiers.

pub mod config;
pub mod errors;
pub mod ids;
pub mod message;

pub use config::{AdvisorConfig, BackendConfig, BackendKind, LlmConfig, MemoryConfig, ServerConfig};
pub use errors::{MemoryError, MemoryResult};
pub use ids::{ConversationId, MessageId};
pub use message::{ChatMessage, MessageRecord, MessageRole, Metadata, ToolCall, ToolResponse};
