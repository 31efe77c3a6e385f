//! Transaction simulation against committed state
//!
//! The simulator executes the chaincode against a read-only borrow of the
//! world state. Reads are recorded with the version they observed, writes are
//! buffered, and the resulting read/write set is validated again at commit.
//! Reads do not observe the transaction's own buffered writes.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use passport_chaincode::{
    ChaincodeStub, HistoryQueryIterator, KeyValue, QueryCursor, StateQueryIterator,
};
use passport_common::{KvRead, KvWrite, RangeQueryInfo, ReadWriteSet, Result};

use crate::state::WorldState;

/// Per-transaction [`ChaincodeStub`] recording a read/write set
pub struct TxSimulator<'a> {
    state: &'a WorldState,
    tx_id: String,
    timestamp: DateTime<Utc>,
    reads: BTreeMap<String, Option<passport_common::Version>>,
    writes: BTreeMap<String, Option<Vec<u8>>>,
    range_queries: Rc<RefCell<Vec<RangeQueryInfo>>>,
}

impl<'a> TxSimulator<'a> {
    pub fn new(state: &'a WorldState, tx_id: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            state,
            tx_id,
            timestamp,
            reads: BTreeMap::new(),
            writes: BTreeMap::new(),
            range_queries: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Finish simulation and hand back the read/write set
    pub fn into_rwset(self) -> ReadWriteSet {
        let reads = self
            .reads
            .into_iter()
            .map(|(key, version)| KvRead { key, version })
            .collect();

        let writes = self
            .writes
            .into_iter()
            .map(|(key, value)| KvWrite {
                key,
                is_delete: value.is_none(),
                value: value.unwrap_or_default(),
            })
            .collect();

        ReadWriteSet {
            reads,
            range_queries: self.range_queries.take(),
            writes,
        }
    }
}

impl ChaincodeStub for TxSimulator<'_> {
    fn tx_id(&self) -> &str {
        &self.tx_id
    }

    fn tx_timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        let state = self.state;
        let current = state.get(key);
        self.reads
            .entry(key.to_string())
            .or_insert_with(|| current.map(|v| v.version));

        Ok(current.map(|v| v.value.clone()))
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        self.writes.insert(key.to_string(), Some(value));
        Ok(())
    }

    fn del_state(&mut self, key: &str) -> Result<()> {
        self.writes.insert(key.to_string(), None);
        Ok(())
    }

    fn get_state_by_range(&mut self, start: &str, end: &str) -> Result<StateQueryIterator<'_>> {
        let observed = Rc::new(RefCell::new(Vec::new()));
        let exhausted = Rc::new(Cell::new(false));

        let recorder = Rc::clone(&observed);
        let rows = self.state.range(start, end).map(move |(key, versioned)| {
            recorder.borrow_mut().push(KvRead {
                key: key.clone(),
                version: Some(versioned.version),
            });
            Ok(KeyValue {
                key: key.clone(),
                value: versioned.value.clone(),
            })
        });

        let end_marker = Rc::clone(&exhausted);
        let rows = rows.chain(std::iter::from_fn(move || {
            end_marker.set(true);
            None
        }));

        // The scan is recorded when the cursor is released, covering exactly
        // the rows the chaincode consumed.
        let range_queries = Rc::clone(&self.range_queries);
        let (start_key, end_key) = (start.to_string(), end.to_string());

        Ok(QueryCursor::new(rows).on_release(move || {
            range_queries.borrow_mut().push(RangeQueryInfo {
                start_key,
                end_key,
                itr_exhausted: exhausted.get(),
                reads: observed.take(),
            });
        }))
    }

    fn get_history_for_key(&mut self, key: &str) -> Result<HistoryQueryIterator<'_>> {
        let entries = self.state.history(key).iter().cloned().map(Ok);
        Ok(QueryCursor::new(entries))
    }
}
