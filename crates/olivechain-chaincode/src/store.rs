//! Typed entity store over a world state
//!
//! Serializes entities as JSON under their namespaced keys
//! (`WASTE_<id>`, `EXTRACTION_<id>`, `RECYCLING_<id>`).

use olivechain_integrity::{ContractError, EntityKind, LedgerEntity, Result};
use tracing::warn;

use crate::world_state::WorldState;

pub struct EntityStore<S> {
    state: S,
}

impl<S: WorldState> EntityStore<S> {
    pub fn new(state: S) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Write `entity` under its key, replacing any previous record
    pub fn put<E: LedgerEntity>(&mut self, entity: &E) -> Result<()> {
        let bytes = serde_json::to_vec(entity)?;
        self.state.put_state(&entity.key(), bytes)
    }

    /// Read an entity, failing with `NotFound` if absent
    pub fn get<E: LedgerEntity>(&self, id: &str) -> Result<E> {
        self.try_get(id)?
            .ok_or_else(|| ContractError::not_found(E::KIND, id))
    }

    pub fn try_get<E: LedgerEntity>(&self, id: &str) -> Result<Option<E>> {
        match self.state.get_state(&E::KIND.key(id))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn exists(&self, kind: EntityKind, id: &str) -> Result<bool> {
        Ok(self.state.get_state(&kind.key(id))?.is_some())
    }

    /// Every entity of type `E`, ordered by key (not by creation time).
    ///
    /// Fails on the first record that does not decode.
    pub fn range_all<E: LedgerEntity>(&self) -> Result<Vec<E>> {
        self.state
            .range(&E::KIND.range())?
            .into_iter()
            .map(|(_, bytes)| serde_json::from_slice(&bytes).map_err(ContractError::from))
            .collect()
    }

    /// Lenient scan that skips records which fail to decode
    pub fn scan<E: LedgerEntity>(&self) -> Result<impl Iterator<Item = E>> {
        let entries = self.state.range(&E::KIND.range())?;
        Ok(entries.into_iter().filter_map(|(key, bytes)| {
            match serde_json::from_slice::<E>(&bytes) {
                Ok(entity) => Some(entity),
                Err(e) => {
                    warn!(key = %key, error = %e, "Skipping undecodable record");
                    None
                }
            }
        }))
    }
}
