//! Chat memory subsystem.
//!
//! Conversation history lives in a list-shaped key-value backend, one list
//! per conversation, newest message at the head. Organized into:
//! - `core`: Configuration, errors, IDs, and the message model
//! - `storage`: List backend contract with Redis and in-memory implementations
//! - `store`: The conversation memory store and its JSON codec
//! - `adapters`: Advisor and Rig integration

pub mod adapters;
pub mod core;
pub mod storage;
pub mod store;

// Re-export commonly used types for convenience
pub use self::adapters::{MemoryAdvisor, PreparedHistory, RigChat, to_rig_messages};
pub use self::core::{
    AdvisorConfig, BackendConfig, BackendKind, ChatMessage, ConversationId, LlmConfig,
    MemoryConfig, MemoryError, MemoryResult, MessageId, MessageRecord, MessageRole, Metadata,
    ServerConfig, ToolCall, ToolResponse,
};
pub use self::storage::{InMemoryListBackend, ListBackend, RedisListBackend, StoreFuture};
pub use self::store::{ChatMemory, ChatMemoryStore};
