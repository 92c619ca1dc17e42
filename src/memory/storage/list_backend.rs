//! List-shaped key-value backend contract.

use std::future::Future;
use std::pin::Pin;

use crate::memory::core::errors::MemoryResult;

/// Boxed future type for backend and store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Key-value store whose values are ordered lists of strings.
///
/// Semantics follow Redis lists: indices are zero-based from the head,
/// negative indices count back from the tail, a missing key behaves as an
/// empty list, and a list emptied by removals disappears.
pub trait ListBackend: Send + Sync {
    /// Insert `values` at the head of the list, one after another, so the
    /// last value ends up first. Creates the key if absent.
    ///
    /// # Errors
    /// Returns an error if the backend is unreachable.
    fn push_head<'a>(&'a self, key: &'a str, values: Vec<String>)
    -> StoreFuture<'a, MemoryResult<()>>;

    /// Return the values between the inclusive indices `start` and `end`.
    ///
    /// # Errors
    /// Returns an error if the backend is unreachable.
    fn range<'a>(
        &'a self,
        key: &'a str,
        start: isize,
        end: isize,
    ) -> StoreFuture<'a, MemoryResult<Vec<String>>>;

    /// Remove the key and all its values.
    ///
    /// # Errors
    /// Returns an error if the backend is unreachable.
    fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, MemoryResult<()>>;

    /// Remove occurrences of the exact string `value` and return how many went.
    ///
    /// `count > 0` removes up to `count` scanning from the head, `count < 0`
    /// scans from the tail, `0` removes all.
    ///
    /// # Errors
    /// Returns an error if the backend is unreachable.
    fn remove_value<'a>(
        &'a self,
        key: &'a str,
        count: isize,
        value: &'a str,
    ) -> StoreFuture<'a, MemoryResult<usize>>;
}
