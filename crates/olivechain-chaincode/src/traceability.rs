//! Traceability assembly
//!
//! Rebuilds the chain of custody for one waste unit from independently
//! stored records. There is no waste → extraction/recycling index, so both
//! record types are scanned in key order and the first match wins.

use olivechain_integrity::{Extraction, LedgerEntity, Recycling, Result, Traceability, Waste};
use tracing::debug;

use crate::store::EntityStore;
use crate::world_state::WorldState;

/// Assemble the traceability chain for `waste_id`.
///
/// The merged chain is the waste history, then the extraction history, then
/// the recycling history. Segments are concatenated, not sorted by time.
// TODO: offer a chronological merge (stable sort of `chain` by timestamp)
// behind an explicit option once consumers ask for a single timeline.
pub fn assemble_traceability<S: WorldState>(
    store: &EntityStore<S>,
    waste_id: &str,
) -> Result<Traceability> {
    let waste: Waste = store.get(waste_id)?;
    let extraction = first_referencing::<Extraction, S>(store, waste_id)?;
    let recycling = first_referencing::<Recycling, S>(store, waste_id)?;

    let mut chain = waste.history.clone();
    if let Some(ref e) = extraction {
        chain.extend(e.history.iter().cloned());
    }
    if let Some(ref r) = recycling {
        chain.extend(r.history.iter().cloned());
    }

    debug!(
        waste_id = %waste_id,
        extraction = extraction.is_some(),
        recycling = recycling.is_some(),
        events = chain.len(),
        "Assembled traceability chain"
    );

    Ok(Traceability {
        waste: Some(waste),
        extraction,
        recycling,
        chain,
    })
}

fn first_referencing<E: LedgerEntity, S: WorldState>(
    store: &EntityStore<S>,
    waste_id: &str,
) -> Result<Option<E>> {
    Ok(store
        .scan::<E>()?
        .find(|entity| entity.waste_ref() == Some(waste_id)))
}
