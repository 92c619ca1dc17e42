//! Process-local list backend with Redis list semantics.

use std::collections::VecDeque;

use dashmap::DashMap;

use crate::memory::core::errors::MemoryResult;
use crate::memory::storage::list_backend::{ListBackend, StoreFuture};

/// In-memory list backend. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryListBackend {
    lists: DashMap<String, VecDeque<String>>,
}

impl InMemoryListBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently holding a list.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.lists.len()
    }

    /// Length of the list at `key`, zero if absent.
    #[must_use]
    pub fn list_len(&self, key: &str) -> usize {
        self.lists.get(key).map_or(0, |list| list.len())
    }

    /// Whether the backend holds no lists at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

/// Resolve LRANGE-style indices against a list of `len` elements.
fn resolve_range(len: usize, start: isize, end: isize) -> Option<(usize, usize)> {
    let len = isize::try_from(len).ok()?;
    if len == 0 {
        return None;
    }
    let start = if start < 0 { (start + len).max(0) } else { start };
    let end = if end < 0 { end + len } else { end.min(len - 1) };
    if start > end || start >= len {
        return None;
    }
    Some((usize::try_from(start).ok()?, usize::try_from(end).ok()?))
}

/// Remove occurrences of `value` following LREM counting rules.
fn remove_matching(list: &mut VecDeque<String>, count: isize, value: &str) -> usize {
    let limit = if count == 0 {
        usize::MAX
    } else {
        count.unsigned_abs()
    };
    let mut removed = 0;

    if count >= 0 {
        let mut index = 0;
        while index < list.len() && removed < limit {
            if list[index] == value {
                list.remove(index);
                removed += 1;
            } else {
                index += 1;
            }
        }
    } else {
        let mut index = list.len();
        while index > 0 && removed < limit {
            index -= 1;
            if list[index] == value {
                list.remove(index);
                removed += 1;
            }
        }
    }

    removed
}

impl ListBackend for InMemoryListBackend {
    fn push_head<'a>(
        &'a self,
        key: &'a str,
        values: Vec<String>,
    ) -> StoreFuture<'a, MemoryResult<()>> {
        Box::pin(async move {
            if values.is_empty() {
                return Ok(());
            }
            let mut list = self.lists.entry(key.to_string()).or_default();
            for value in values {
                list.push_front(value);
            }
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
            let Some(list) = self.lists.get(key) else {
                return Ok(Vec::new());
            };
            let values = resolve_range(list.len(), start, end).map_or_else(Vec::new, |(from, to)| {
                list.range(from..=to).cloned().collect()
            });
            Ok(values)
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, MemoryResult<()>> {
        Box::pin(async move {
            self.lists.remove(key);
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
            let Some(mut list) = self.lists.get_mut(key) else {
                return Ok(0);
            };
            let removed = remove_matching(&mut list, count, value);
            drop(list);
            self.lists.remove_if(key, |_, list| list.is_empty());
            Ok(removed)
        })
    }
}
