//! Error types for the chat memory subsystem.

use thiserror::Error;

use crate::memory::core::message::MessageRole;

/// Chat memory error type.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A message could not be serialized to its stored form.
    #[error("failed to encode message: {0}")]
    Encoding(#[source] serde_json::Error),
    /// A stored entry could not be parsed back into a message record.
    #[error("failed to decode stored message: {0}")]
    Decoding(#[source] serde_json::Error),
    /// A decoded record carries a role with no caller-facing conversion.
    #[error("unsupported message role: {0}")]
    UnsupportedRole(MessageRole),
    /// Key-value backend error, passed through from the Redis client.
    #[error("backend error: {0}")]
    Backend(#[from] redis::RedisError),
    /// HTTP client error from Rig.
    #[error("http client error: {0}")]
    HttpClient(#[from] rig::http_client::Error),
    /// Completion error.
    #[error("completion error: {0}")]
    Completion(#[from] rig::completion::CompletionError),
    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

/// Convenience result alias for memory operations.
pub type MemoryResult<T> = Result<T, MemoryError>;
