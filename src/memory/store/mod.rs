//! Conversation memory store and its message codec.

pub mod chat_memory;
pub mod codec;

pub use chat_memory::{ChatMemory, ChatMemoryStore};
pub use codec::{decode, decode_message, encode};
