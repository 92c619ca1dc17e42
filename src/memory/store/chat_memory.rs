//! Conversation memory store over a list backend.
//!
//! Each conversation is one backend list. Messages are pushed at the head,
//! so the list reads most-recent-first. Every appended message gets a fresh
//! [`MessageId`](crate::memory::core::ids::MessageId) in its metadata, which
//! is what makes per-message deletion possible on a backend that only knows
//! how to remove list elements by value.

use std::sync::Arc;

use tracing::debug;

use crate::memory::core::config::{BackendConfig, BackendKind};
use crate::memory::core::errors::MemoryResult;
use crate::memory::core::ids::ConversationId;
use crate::memory::core::message::ChatMessage;
use crate::memory::storage::{InMemoryListBackend, ListBackend, RedisListBackend, StoreFuture};
use crate::memory::store::codec;

/// Chat memory provider contract used by the advisor and the HTTP layer.
pub trait ChatMemory: Send + Sync {
    /// Append messages to a conversation.
    ///
    /// Each message is tagged in place with a new id. The batch is pushed at
    /// the head in input order, so its last message ends up first. An empty
    /// batch is a no-op.
    ///
    /// # Errors
    /// Returns `Encoding` if any message cannot be serialized (nothing is
    /// written), or a backend error.
    fn append<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
        messages: &'a mut [ChatMessage],
    ) -> StoreFuture<'a, MemoryResult<()>>;

    /// Read messages `0..=last_n` in head order (most recent first).
    ///
    /// `last_n` is an inclusive end index, not a count: the `n` most recent
    /// messages are `read(id, n - 1)`, and `-1` reads the whole conversation.
    /// Results are not re-sorted.
    ///
    /// # Errors
    /// Returns `Decoding` or `UnsupportedRole` if any entry in the range is
    /// unreadable, or a backend error.
    fn read<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
        last_n: isize,
    ) -> StoreFuture<'a, MemoryResult<Vec<ChatMessage>>>;

    /// Drop the whole conversation. Clearing a missing conversation succeeds.
    ///
    /// # Errors
    /// Returns a backend error.
    fn clear<'a>(&'a self, conversation_id: &'a ConversationId)
    -> StoreFuture<'a, MemoryResult<()>>;

    /// Remove the first message whose metadata id equals `message_id`.
    ///
    /// An unknown id or conversation is a no-op.
    ///
    /// # Errors
    /// Returns `Decoding` if an entry scanned before the match is unreadable,
    /// or a backend error.
    fn delete_by_message_id<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
        message_id: &'a str,
    ) -> StoreFuture<'a, MemoryResult<()>>;
}

/// Chat memory stored as one backend list per conversation.
#[derive(Clone)]
pub struct ChatMemoryStore {
    backend: Arc<dyn ListBackend>,
    key_prefix: String,
}

impl ChatMemoryStore {
    /// Create a store over `backend`, using conversation ids as keys verbatim.
    #[must_use]
    pub fn new(backend: Arc<dyn ListBackend>) -> Self {
        Self {
            backend,
            key_prefix: String::new(),
        }
    }

    /// Prefix every list key with `prefix`.
    #[must_use]
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Build the configured backend and wrap it in a store.
    ///
    /// # Errors
    /// Returns an error if the Redis backend cannot connect.
    pub async fn from_config(config: &BackendConfig) -> MemoryResult<Self> {
        let backend: Arc<dyn ListBackend> = match config.kind {
            BackendKind::Redis => Arc::new(RedisListBackend::connect(&config.redis_url).await?),
            BackendKind::Memory => Arc::new(InMemoryListBackend::new()),
        };
        Ok(Self::new(backend).with_key_prefix(config.key_prefix.clone()))
    }

    /// Backend list key for a conversation.
    #[must_use]
    pub fn key_for(&self, conversation_id: &ConversationId) -> String {
        format!("{}{}", self.key_prefix, conversation_id)
    }
}

impl ChatMemory for ChatMemoryStore {
    fn append<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
        messages: &'a mut [ChatMessage],
    ) -> StoreFuture<'a, MemoryResult<()>> {
        Box::pin(async move {
            if messages.is_empty() {
                return Ok(());
            }

            let mut encoded = Vec::with_capacity(messages.len());
            for message in messages.iter_mut() {
                message.assign_id();
                encoded.push(codec::encode(message)?);
            }

            let count = encoded.len();
            self.backend
                .push_head(&self.key_for(conversation_id), encoded)
                .await?;
            debug!(
                "Appended {} messages to conversation {}",
                count, conversation_id
            );
            Ok(())
        })
    }

    fn read<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
        last_n: isize,
    ) -> StoreFuture<'a, MemoryResult<Vec<ChatMessage>>> {
        Box::pin(async move {
            let raw = self
                .backend
                .range(&self.key_for(conversation_id), 0, last_n)
                .await?;
            let messages = raw
                .iter()
                .map(|entry| codec::decode_message(entry))
                .collect::<MemoryResult<Vec<_>>>()?;
            debug!(
                "Read {} messages from conversation {} (end index {})",
                messages.len(),
                conversation_id,
                last_n
            );
            Ok(messages)
        })
    }

    fn clear<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> StoreFuture<'a, MemoryResult<()>> {
        Box::pin(async move {
            self.backend.delete(&self.key_for(conversation_id)).await?;
            debug!("Cleared conversation {}", conversation_id);
            Ok(())
        })
    }

    fn delete_by_message_id<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
        message_id: &'a str,
    ) -> StoreFuture<'a, MemoryResult<()>> {
        Box::pin(async move {
            let key = self.key_for(conversation_id);
            let raw = self.backend.range(&key, 0, -1).await?;

            for entry in &raw {
                let record = codec::decode(entry)?;
                if record.id() == Some(message_id) {
                    // Remove by the fetched bytes; a re-encoded copy may differ.
                    let removed = self.backend.remove_value(&key, 1, entry).await?;
                    debug!(
                        "Deleted message {} from conversation {} ({} removed)",
                        message_id, conversation_id, removed
                    );
                    return Ok(());
                }
            }

            debug!(
                "No message {} in conversation {}",
                message_id, conversation_id
            );
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::memory::core::errors::MemoryError;
    use crate::memory::core::ids::MessageId;
    use crate::memory::core::message::MessageRole;
    use crate::memory::storage::unavailable::UnavailableBackend;

    fn store_with_backend() -> (ChatMemoryStore, Arc<InMemoryListBackend>) {
        let backend = Arc::new(InMemoryListBackend::new());
        let store = ChatMemoryStore::new(backend.clone());
        (store, backend)
    }

    async fn append_texts(store: &ChatMemoryStore, id: &ConversationId, texts: &[&str]) {
        for text in texts {
            let mut batch = [ChatMessage::user(*text)];
            store.append(id, &mut batch).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_append_then_read_round_trip() {
        let (store, _) = store_with_backend();
        let id = ConversationId::from("conv-1");
        let mut batch = [
            ChatMessage::user("A").with_metadata("lang", "en"),
            ChatMessage::assistant("B"),
        ];
        store.append(&id, &mut batch).await.unwrap();

        let read = store.read(&id, 1).await.unwrap();
        assert_eq!(read.len(), 2);
        // The last message of the batch sits at the head.
        assert_eq!(read[0].role(), MessageRole::Assistant);
        assert_eq!(read[0].text(), "B");
        assert_eq!(read[1].role(), MessageRole::User);
        assert_eq!(read[1].text(), "A");
        assert_eq!(read[1].metadata().get("lang"), Some(&serde_json::Value::from("en")));
        assert_eq!(read[0], batch[1]);
        assert_eq!(read[1], batch[0]);
    }

    #[tokio::test]
    async fn test_append_tags_caller_messages_in_place() {
        let (store, _) = store_with_backend();
        let id = ConversationId::from("conv-1");
        let mut batch = [ChatMessage::user("hi").with_metadata("id", "stale")];
        store.append(&id, &mut batch).await.unwrap();

        let assigned = batch[0].id().unwrap();
        assert_ne!(assigned, "stale");
        assert_eq!(assigned.len(), MessageId::LEN);
    }

    #[tokio::test]
    async fn test_ids_are_unique_for_identical_content() {
        let (store, _) = store_with_backend();
        let id = ConversationId::from("conv-1");
        append_texts(&store, &id, &["same", "same", "same"]).await;
        let mut batch = [ChatMessage::user("same"), ChatMessage::user("same")];
        store.append(&id, &mut batch).await.unwrap();

        let read = store.read(&id, -1).await.unwrap();
        let ids: HashSet<&str> = read.iter().filter_map(ChatMessage::id).collect();
        assert_eq!(read.len(), 5);
        assert_eq!(ids.len(), 5);
        for message_id in ids {
            assert_eq!(message_id.len(), 32);
            assert!(message_id.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
        }
    }

    #[tokio::test]
    async fn test_empty_append_is_noop() {
        let (store, backend) = store_with_backend();
        let id = ConversationId::from("conv-1");
        store.append(&id, &mut []).await.unwrap();
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_last_n_is_an_inclusive_end_index() {
        let (store, _) = store_with_backend();
        let id = ConversationId::from("conv-1");
        append_texts(&store, &id, &["m1", "m2", "m3", "m4", "m5"]).await;

        let three = store.read(&id, 2).await.unwrap();
        let texts: Vec<&str> = three.iter().map(ChatMessage::text).collect();
        assert_eq!(texts, ["m5", "m4", "m3"]);

        assert_eq!(store.read(&id, -1).await.unwrap().len(), 5);
        assert_eq!(store.read(&id, 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_read_missing_conversation_is_empty() {
        let (store, _) = store_with_backend();
        let id = ConversationId::from("nobody");
        assert!(store.read(&id, -1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let (store, _) = store_with_backend();
        let id = ConversationId::from("conv-1");
        store.clear(&id).await.unwrap();

        append_texts(&store, &id, &["a", "b"]).await;
        store.clear(&id).await.unwrap();
        assert!(store.read(&id, -1).await.unwrap().is_empty());
        store.clear(&id).await.unwrap();
    }

    #[tokio::test]
    async fn test_conversations_are_independent() {
        let (store, _) = store_with_backend();
        let first = ConversationId::from("first");
        let second = ConversationId::from("second");
        append_texts(&store, &first, &["a"]).await;
        append_texts(&store, &second, &["b", "c"]).await;
        store.clear(&first).await.unwrap();

        assert!(store.read(&first, -1).await.unwrap().is_empty());
        assert_eq!(store.read(&second, -1).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_by_id_targets_one_message() {
        let (store, _) = store_with_backend();
        let id = ConversationId::from("conv-1");
        let mut batch = [
            ChatMessage::user("hello"),
            ChatMessage::assistant("middle"),
            ChatMessage::user("hello"),
        ];
        store.append(&id, &mut batch).await.unwrap();
        let target = batch[1].id().unwrap().to_string();

        store.delete_by_message_id(&id, &target).await.unwrap();

        let remaining = store.read(&id, -1).await.unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|m| m.text() == "hello"));
        assert!(remaining.iter().all(|m| m.id() != Some(target.as_str())));
    }

    #[tokio::test]
    async fn test_delete_unknown_id_leaves_conversation_unchanged() {
        let (store, _) = store_with_backend();
        let id = ConversationId::from("conv-1");
        append_texts(&store, &id, &["a", "b"]).await;
        let before = store.read(&id, -1).await.unwrap();

        store
            .delete_by_message_id(&id, "00000000000000000000000000000000")
            .await
            .unwrap();
        store
            .delete_by_message_id(&ConversationId::from("nobody"), "x")
            .await
            .unwrap();

        assert_eq!(store.read(&id, -1).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_delete_removes_original_bytes() {
        let (store, backend) = store_with_backend();
        let id = ConversationId::from("conv-1");
        // Field order and spacing differ from what the codec would produce.
        let raw = r#"{ "text": "odd", "metadata": {"z": 1, "id": "0123456789abcdef0123456789abcdef"}, "message_type": "user" }"#;
        backend
            .push_head(&store.key_for(&id), vec![raw.to_string()])
            .await
            .unwrap();
        assert_ne!(
            codec::encode(&codec::decode_message(raw).unwrap()).unwrap(),
            raw
        );

        store
            .delete_by_message_id(&id, "0123456789abcdef0123456789abcdef")
            .await
            .unwrap();
        assert_eq!(backend.list_len(&store.key_for(&id)), 0);
    }

    #[tokio::test]
    async fn test_unsupported_role_fails_read() {
        let (store, backend) = store_with_backend();
        let id = ConversationId::from("conv-1");
        append_texts(&store, &id, &["a"]).await;
        let mut tool = [ChatMessage::tool(Vec::new())];
        store.append(&id, &mut tool).await.unwrap();
        assert_eq!(backend.list_len("conv-1"), 2);

        let err = store.read(&id, -1).await.unwrap_err();
        assert!(matches!(err, MemoryError::UnsupportedRole(MessageRole::Tool)));

        // The tool entry is still addressable by id.
        let tool_id = tool[0].id().unwrap().to_string();
        store.delete_by_message_id(&id, &tool_id).await.unwrap();
        assert_eq!(store.read(&id, -1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_entry_fails_read_and_delete() {
        let (store, backend) = store_with_backend();
        let id = ConversationId::from("conv-1");
        append_texts(&store, &id, &["a"]).await;
        backend
            .push_head("conv-1", vec!["{not json".to_string()])
            .await
            .unwrap();

        assert!(matches!(
            store.read(&id, -1).await,
            Err(MemoryError::Decoding(_))
        ));
        assert!(matches!(
            store.delete_by_message_id(&id, "whatever").await,
            Err(MemoryError::Decoding(_))
        ));
        assert_eq!(backend.list_len("conv-1"), 2);
    }

    #[tokio::test]
    async fn test_key_prefix_namespaces_lists() {
        let backend = Arc::new(InMemoryListBackend::new());
        let store = ChatMemoryStore::new(backend.clone()).with_key_prefix("chat:");
        let id = ConversationId::from("conv-1");
        append_texts(&store, &id, &["a"]).await;

        assert_eq!(store.key_for(&id), "chat:conv-1");
        assert_eq!(backend.list_len("chat:conv-1"), 1);
        assert_eq!(backend.list_len("conv-1"), 0);
    }

    #[tokio::test]
    async fn test_from_config_memory_backend() {
        let config = BackendConfig {
            kind: BackendKind::Memory,
            key_prefix: "p:".to_string(),
            ..BackendConfig::default()
        };
        let store = ChatMemoryStore::from_config(&config).await.unwrap();
        let id = ConversationId::from("c");
        append_texts(&store, &id, &["a"]).await;
        assert_eq!(store.read(&id, -1).await.unwrap().len(), 1);
        assert_eq!(store.key_for(&id), "p:c");
    }

    fn is_connection_down(result: &MemoryResult<impl std::fmt::Debug>) -> bool {
        matches!(
            result,
            Err(MemoryError::Backend(err)) if err.kind() == redis::ErrorKind::IoError
        )
    }

    #[tokio::test]
    async fn test_backend_errors_pass_through() {
        let store = ChatMemoryStore::new(Arc::new(UnavailableBackend));
        let id = ConversationId::from("conv-1");

        let mut batch = [ChatMessage::user("hi")];
        assert!(is_connection_down(&store.append(&id, &mut batch).await));
        assert!(is_connection_down(&store.read(&id, -1).await));
        assert!(is_connection_down(&store.clear(&id).await));
        assert!(is_connection_down(
            &store.delete_by_message_id(&id, "whatever").await
        ));
    }
}
