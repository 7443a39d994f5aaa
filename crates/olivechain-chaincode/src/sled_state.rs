//! Sled-backed world state
//!
//! Durable world state for the embedded peer. One sled tree holds the whole
//! namespaced key space; sled keeps keys ordered, so range scans come back
//! in key order.

use olivechain_integrity::{ContractError, KeyRange, Result};
use sled::Db;
use std::path::Path;
use tracing::info;

use crate::world_state::WorldState;

pub struct SledWorldState {
    db: Db,
}

impl SledWorldState {
    /// Open or create a world state database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path.as_ref()).map_err(state_err)?;
        info!(path = %path.as_ref().display(), "Opened world state database");
        Ok(Self { db })
    }

    /// Throwaway database, removed when dropped
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(state_err)?;
        Ok(Self { db })
    }

    /// Flush pending writes to disk
    pub fn flush(&self) -> Result<()> {
        self.db.flush().map_err(state_err)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }
}

impl WorldState for SledWorldState {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .db
            .get(key.as_bytes())
            .map_err(state_err)?
            .map(|v| v.to_vec()))
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        self.db.insert(key.as_bytes(), value).map_err(state_err)?;
        Ok(())
    }

    fn range(&self, range: &KeyRange) -> Result<Vec<(String, Vec<u8>)>> {
        let mut entries = Vec::new();
        for item in self.db.range(range.start.as_bytes()..range.end.as_bytes()) {
            let (key, value) = item.map_err(state_err)?;
            let key = String::from_utf8(key.to_vec())
                .map_err(|e| ContractError::state(format!("non-UTF-8 key: {}", e)))?;
            entries.push((key, value.to_vec()));
        }
        Ok(entries)
    }
}

fn state_err(err: sled::Error) -> ContractError {
    ContractError::state(err.to_string())
}
