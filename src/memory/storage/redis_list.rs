//! Redis implementation of the list backend.

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::info;

use crate::memory::core::errors::MemoryResult;
use crate::memory::storage::list_backend::{ListBackend, StoreFuture};

/// List backend over a multiplexed Redis connection.
///
/// Every operation clones the connection manager into its own scope, so the
/// handle is released when the call returns or fails. Reconnection, timeouts
/// and retries are left to the Redis client.
#[derive(Clone)]
pub struct RedisListBackend {
    manager: ConnectionManager,
}

impl RedisListBackend {
    /// Connect to Redis at `url`.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the server is unreachable.
    pub async fn connect(url: &str) -> MemoryResult<Self> {
        let client = redis::Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        info!("Connected to Redis list backend at {}", url);
        Ok(Self { manager })
    }
}

impl ListBackend for RedisListBackend {
    fn push_head<'a>(
        &'a self,
        key: &'a str,
        values: Vec<String>,
    ) -> StoreFuture<'a, MemoryResult<()>> {
        Box::pin(async move {
            // LPUSH rejects an empty value list.
            if values.is_empty() {
                return Ok(());
            }
            let mut conn = self.manager.clone();
            let _len: usize = conn.lpush(key, values).await?;
            Ok(())
        })
    }

    fn range<'a>(
        &'a self,
        key: &'a str,
        start: isize,
        end: isize,
    ) -> StoreFuture<'a, MemoryResult<Vec<String>>> {
        Box::pin(async move {
            let mut conn = self.manager.clone();
            let values: Vec<String> = conn.lrange(key, start, end).await?;
            Ok(values)
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, MemoryResult<()>> {
        Box::pin(async move {
            let mut conn = self.manager.clone();
            let _deleted: usize = conn.del(key).await?;
            Ok(())
        })
    }

    fn remove_value<'a>(
        &'a self,
        key: &'a str,
        count: isize,
        value: &'a str,
    ) -> StoreFuture<'a, MemoryResult<usize>> {
        Box::pin(async move {
            let mut conn = self.manager.clone();
            let removed: usize = conn.lrem(key, count, value).await?;
            Ok(removed)
        })
    }
}
