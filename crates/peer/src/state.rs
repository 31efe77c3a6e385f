//! Versioned world state with per-key change log
//!
//! Data model:
//! - `data`: key → current value and the version of the transaction that wrote it
//! - `history`: key → every committed modification, oldest first

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use chrono::{DateTime, Utc};
use passport_chaincode::KeyModification;
use passport_common::{KvWrite, Version};

/// Current value of a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    pub value: Vec<u8>,
    pub version: Version,
}

/// Committed key-value state of a channel
#[derive(Debug, Default)]
pub struct WorldState {
    data: BTreeMap<String, VersionedValue>,
    history: HashMap<String, Vec<KeyModification>>,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&VersionedValue> {
        self.data.get(key)
    }

    pub fn version(&self, key: &str) -> Option<Version> {
        self.data.get(key).map(|v| v.version)
    }

    /// Keys in `[start, end)` in lexical order. Empty bounds are unbounded.
    pub fn range<'a>(
        &'a self,
        start: &str,
        end: &str,
    ) -> Box<dyn Iterator<Item = (&'a String, &'a VersionedValue)> + 'a> {
        if !start.is_empty() && !end.is_empty() && start >= end {
            return Box::new(std::iter::empty());
        }

        let lower = if start.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(start)
        };
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end)
        };

        Box::new(self.data.range::<str, _>((lower, upper)))
    }

    /// Change log of `key`, oldest first
    pub fn history(&self, key: &str) -> &[KeyModification] {
        self.history.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Apply the write set of a valid transaction
    pub fn apply(
        &mut self,
        tx_id: &str,
        timestamp: DateTime<Utc>,
        version: Version,
        writes: &[KvWrite],
    ) {
        for write in writes {
            if write.is_delete {
                self.data.remove(&write.key);
            } else {
                self.data.insert(
                    write.key.clone(),
                    VersionedValue {
                        value: write.value.clone(),
                        version,
                    },
                );
            }

            self.history
                .entry(write.key.clone())
                .or_default()
                .push(KeyModification {
                    tx_id: tx_id.to_string(),
                    timestamp,
                    value: if write.is_delete {
                        Vec::new()
                    } else {
                        write.value.clone()
                    },
                    is_delete: write.is_delete,
                });
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
