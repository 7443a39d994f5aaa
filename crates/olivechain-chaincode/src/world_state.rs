//! World state abstraction
//!
//! The minimal surface a ledger peer exposes to a ledger program: point
//! reads, whole-value writes and ordered range scans. There is no append
//! or partial-update primitive; every write replaces the value at its key.

use std::collections::BTreeMap;

use olivechain_integrity::{KeyRange, Result};

/// Key/value stub of a ledger peer
pub trait WorldState: Send + Sync {
    /// Value stored at `key`, if any
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the value at `key`. Either the whole value lands or nothing does.
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()>;

    /// All entries in `[range.start, range.end)`, ordered by key.
    ///
    /// Returns a snapshot: calling it again restarts the scan.
    fn range(&self, range: &KeyRange) -> Result<Vec<(String, Vec<u8>)>>;
}

/// In-memory world state backed by an ordered map
#[derive(Debug, Clone, Default)]
pub struct MemoryWorldState {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryWorldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl WorldState for MemoryWorldState {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn range(&self, range: &KeyRange) -> Result<Vec<(String, Vec<u8>)>> {
        Ok(self
            .entries
            .range(range.start.clone()..range.end.clone())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
