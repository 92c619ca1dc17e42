//! JSON codec between messages and backend list entries.

use crate::memory::core::errors::{MemoryError, MemoryResult};
use crate::memory::core::message::{ChatMessage, MessageRecord};

/// Encode a message into its stored JSON form.
///
/// # Errors
/// Returns `MemoryError::Encoding` if serialization fails.
pub fn encode(message: &ChatMessage) -> MemoryResult<String> {
    serde_json::to_string(&MessageRecord::from(message)).map_err(MemoryError::Encoding)
}

/// Decode a stored entry into a record.
///
/// # Errors
/// Returns `MemoryError::Decoding` if the entry is not a valid record.
pub fn decode(raw: &str) -> MemoryResult<MessageRecord> {
    serde_json::from_str(raw).map_err(MemoryError::Decoding)
}

/// Decode a stored entry and convert it to a caller-facing message.
///
/// # Errors
/// Returns `MemoryError::Decoding` for malformed entries and
/// `MemoryError::UnsupportedRole` for records with no caller-facing form.
pub fn decode_message(raw: &str) -> MemoryResult<ChatMessage> {
    ChatMessage::try_from(decode(raw)?)
}
