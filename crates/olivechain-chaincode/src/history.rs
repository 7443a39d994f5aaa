//! History log
//!
//! The store has no append primitive, so appending an event means loading
//! the record, pushing the event and rewriting the record in full.

use chrono::{DateTime, Utc};
use olivechain_integrity::{HistoryEvent, LedgerEntity, Result};

use crate::store::EntityStore;
use crate::world_state::WorldState;

/// Append `event` to the history of entity `id` and persist the whole record.
///
/// `mutate` runs before the append so status changes and their event land
/// in the same write.
pub fn append_event<E, S, F>(
    store: &mut EntityStore<S>,
    id: &str,
    at: DateTime<Utc>,
    event: HistoryEvent,
    mutate: F,
) -> Result<E>
where
    E: LedgerEntity,
    S: WorldState,
    F: FnOnce(&mut E),
{
    let mut entity: E = store.get(id)?;
    mutate(&mut entity);
    entity.history_mut().push(event);
    entity.touch(at);
    store.put(&entity)?;
    Ok(entity)
}
