//! In-memory stub for exercising the contract without a peer

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use passport_common::Result;

use crate::contract::PassportContract;
use crate::stub::{
    ChaincodeStub, HistoryQueryIterator, KeyModification, KeyValue, QueryCursor,
    StateQueryIterator,
};

/// Single-process world state with per-key history.
///
/// Each [`MockStub::invoke`] runs as one transaction: writes become visible
/// and enter the history only if the invocation succeeds.
pub struct MockStub {
    state: BTreeMap<String, Vec<u8>>,
    history: HashMap<String, Vec<KeyModification>>,
    pending: Vec<(String, Option<Vec<u8>>)>,
    tx_id: String,
    tx_count: u64,
    epoch: DateTime<Utc>,
    open_cursors: Arc<AtomicUsize>,
}

impl MockStub {
    pub fn new() -> Self {
        Self {
            state: BTreeMap::new(),
            history: HashMap::new(),
            pending: Vec::new(),
            tx_id: String::new(),
            tx_count: 0,
            epoch: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default(),
            open_cursors: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Run `function` as a new transaction against the stub
    pub fn invoke(
        &mut self,
        contract: &PassportContract,
        function: &str,
        args: &[&str],
    ) -> Result<Vec<u8>> {
        self.tx_count += 1;
        self.tx_id = format!("tx{}", self.tx_count);

        let snapshot = self.state.clone();
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();

        match contract.invoke(self, function, &args) {
            Ok(payload) => {
                self.commit_pending();
                Ok(payload)
            }
            Err(e) => {
                self.state = snapshot;
                self.pending.clear();
                Err(e)
            }
        }
    }

    /// Write raw bytes outside of any transaction, e.g. to plant corrupt data
    pub fn put_raw(&mut self, key: &str, value: Vec<u8>) {
        self.state.insert(key.to_string(), value);
    }

    /// Number of range/history cursors not yet released
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    fn commit_pending(&mut self) {
        let timestamp = self.tx_timestamp();
        for (key, value) in self.pending.drain(..) {
            let modification = KeyModification {
                tx_id: self.tx_id.clone(),
                timestamp,
                is_delete: value.is_none(),
                value: value.unwrap_or_default(),
            };
            self.history.entry(key).or_default().push(modification);
        }
    }

    fn track_cursor<'a, T>(&self, cursor: QueryCursor<'a, T>) -> QueryCursor<'a, T> {
        let open = Arc::clone(&self.open_cursors);
        open.fetch_add(1, Ordering::SeqCst);
        cursor.on_release(move || {
            open.fetch_sub(1, Ordering::SeqCst);
        })
    }
}

impl Default for MockStub {
    fn default() -> Self {
        Self::new()
    }
}

impl ChaincodeStub for MockStub {
    fn tx_id(&self) -> &str {
        &self.tx_id
    }

    fn tx_timestamp(&self) -> DateTime<Utc> {
        self.epoch + Duration::seconds(self.tx_count as i64)
    }

    fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.state.get(key).cloned())
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        self.state.insert(key.to_string(), value.clone());
        self.pending.push((key.to_string(), Some(value)));
        Ok(())
    }

    fn del_state(&mut self, key: &str) -> Result<()> {
        self.state.remove(key);
        self.pending.push((key.to_string(), None));
        Ok(())
    }

    fn get_state_by_range(&mut self, start: &str, end: &str) -> Result<StateQueryIterator<'_>> {
        let items: Vec<Result<KeyValue>> = self
            .state
            .iter()
            .filter(|(key, _)| start.is_empty() || key.as_str() >= start)
            .filter(|(key, _)| end.is_empty() || key.as_str() < end)
            .map(|(key, value)| {
                Ok(KeyValue {
                    key: key.clone(),
                    value: value.clone(),
                })
            })
            .collect();

        Ok(self.track_cursor(QueryCursor::new(items)))
    }

    fn get_history_for_key(&mut self, key: &str) -> Result<HistoryQueryIterator<'_>> {
        let items: Vec<Result<KeyModification>> = self
            .history
            .get(key)
            .map(|entries| entries.iter().cloned().map(Ok).collect())
            .unwrap_or_default();

        Ok(self.track_cursor(QueryCursor::new(items)))
    }
}
