//! List backend whose every operation fails as an unreachable Redis would.

use crate::memory::core::errors::{MemoryError, MemoryResult};
use crate::memory::storage::list_backend::{ListBackend, StoreFuture};

pub(crate) struct UnavailableBackend;

pub(crate) fn connection_down() -> MemoryError {
    MemoryError::Backend(redis::RedisError::from((redis::ErrorKind::IoError, "down")))
}

impl ListBackend for UnavailableBackend {
    fn push_head<'a>(
        &'a self,
        _key: &'a str,
        _values: Vec<String>,
    ) -> StoreFuture<'a, MemoryResult<()>> {
        Box::pin(async { Err(connection_down()) })
    }

    fn range<'a>(
        &'a self,
        _key: &'a str,
        _start: isize,
        _end: isize,
    ) -> StoreFuture<'a, MemoryResult<Vec<String>>> {
        Box::pin(async { Err(connection_down()) })
    }

    fn delete<'a>(&'a self, _key: &'a str) -> StoreFuture<'a, MemoryResult<()>> {
        Box::pin(async { Err(connection_down()) })
    }

    fn remove_value<'a>(
        &'a self,
        _key: &'a str,
        _count: isize,
        _value: &'a str,
    ) -> StoreFuture<'a, MemoryResult<usize>> {
        Box::pin(async { Err(connection_down()) })
    }
}
