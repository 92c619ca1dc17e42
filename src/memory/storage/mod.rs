//! List backends for conversation storage.

pub mod in_memory_list;
pub mod list_backend;
pub mod redis_list;
#[cfg(test)]
pub(crate) mod unavailable;

pub use in_memory_list::InMemoryListBackend;
pub use list_backend::{ListBackend, StoreFuture};
pub use redis_list::RedisListBackend;
