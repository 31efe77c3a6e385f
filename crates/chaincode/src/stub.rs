//! Contract view of the ledger platform
//!
//! The contract only ever sees the world state through [`ChaincodeStub`].
//! Range and history queries hand back a [`QueryCursor`], which releases its
//! platform-side resources when dropped, on every exit path.

use std::fmt;

use chrono::{DateTime, Utc};
use passport_common::Result;

/// A key and its current value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

/// One entry of a key's change log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyModification {
    pub tx_id: String,
    pub timestamp: DateTime<Utc>,

    /// Empty when `is_delete` is set
    pub value: Vec<u8>,
    pub is_delete: bool,
}

/// Streaming result of a range or history query.
///
/// The release hook runs exactly once, either on [`QueryCursor::close`] or
/// when the cursor is dropped.
pub struct QueryCursor<'a, T> {
    items: Box<dyn Iterator<Item = Result<T>> + 'a>,
    release: Option<Box<dyn FnOnce() + 'a>>,
}

impl<'a, T> QueryCursor<'a, T> {
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Result<T>>,
        I::IntoIter: 'a,
    {
        Self {
            items: Box::new(items.into_iter()),
            release: None,
        }
    }

    /// Register the hook that frees the cursor on the platform side
    pub fn on_release<F: FnOnce() + 'a>(mut self, release: F) -> Self {
        self.release = Some(Box::new(release));
        self
    }

    pub fn close(self) {}
}

impl<T> Iterator for QueryCursor<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next()
    }
}

impl<T> Drop for QueryCursor<'_, T> {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl<T> fmt::Debug for QueryCursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCursor")
            .field("released", &self.release.is_none())
            .finish()
    }
}

pub type StateQueryIterator<'a> = QueryCursor<'a, KeyValue>;
pub type HistoryQueryIterator<'a> = QueryCursor<'a, KeyModification>;

/// World state access for one transaction
pub trait ChaincodeStub {
    /// ID of the transaction being executed
    fn tx_id(&self) -> &str;

    /// Timestamp the client assigned to the transaction
    fn tx_timestamp(&self) -> DateTime<Utc>;

    /// Returns `Ok(None)` when the key is absent
    fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>>;

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()>;

    fn del_state(&mut self, key: &str) -> Result<()>;

    /// Scan keys in `[start, end)`. An empty bound is unbounded.
    fn get_state_by_range(&mut self, start: &str, end: &str) -> Result<StateQueryIterator<'_>>;

    /// Change log of `key`, oldest first
    fn get_history_for_key(&mut self, key: &str) -> Result<HistoryQueryIterator<'_>>;
}
