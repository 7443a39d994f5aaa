//! Local mirror
//!
//! Transient, non-authoritative copy of ledger records held in process. It
//! serves reads when the ledger cannot, accepts writes when the ledger is
//! down or was never connected, and receives an echo of every record the
//! ledger accepts. Echoes never replace a record with an older version of
//! itself.
//!
//! The mirror runs the same ledger program as a peer, so fallback writes obey
//! the same validation, duplicate, reference and transition rules. All access
//! goes through one lock; a compound operation (create plus link) holds it
//! for its whole duration.

use olivechain_chaincode::{Contract, MemoryWorldState};
use olivechain_integrity::{Extraction, LedgerEntity, Recycling, Result, Waste};
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub struct LocalMirror {
    inner: Mutex<Contract<MemoryWorldState>>,
}

impl Default for LocalMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalMirror {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Contract::new(MemoryWorldState::new())),
        }
    }

    /// Run a read against the mirror
    pub async fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Contract<MemoryWorldState>) -> Result<T>,
    {
        let guard = self.inner.lock().await;
        f(&guard)
    }

    /// Run a write (or a sequence of writes) under a single lock acquisition
    pub async fn write<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Contract<MemoryWorldState>) -> Result<T>,
    {
        let mut guard = self.inner.lock().await;
        f(&mut guard)
    }

    /// Copy records the ledger accepted. Failures are logged, never returned.
    pub async fn echo<R: Echo + ?Sized>(&self, records: &R) {
        let mut guard = self.inner.lock().await;
        if let Err(e) = records.echo_into(&mut guard) {
            warn!(error = %e, "Failed to echo ledger records into local mirror");
        }
    }

    /// Number of stored records across all entity types
    pub async fn len(&self) -> usize {
        self.inner.lock().await.store().state().len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Ledger results that can be copied into the mirror
pub trait Echo {
    fn echo_into(&self, mirror: &mut Contract<MemoryWorldState>) -> Result<()>;
}

/// Store a ledger record unless the mirror already holds a later version.
///
/// History only grows, so a reply carrying fewer events than the stored
/// record was overtaken by a concurrent write and is dropped.
fn echo_record<E: LedgerEntity>(mirror: &mut Contract<MemoryWorldState>, record: &E) -> Result<()> {
    if let Some(stored) = mirror.store().try_get::<E>(record.id())? {
        if stored.history().len() > record.history().len() {
            debug!(
                key = %record.key(),
                stored = stored.history().len(),
                incoming = record.history().len(),
                "Skipping stale ledger echo"
            );
            return Ok(());
        }
    }
    mirror.put_record(record)
}

macro_rules! echo_entity {
    ($($ty:ty),*) => {$(
        impl Echo for $ty {
            fn echo_into(&self, mirror: &mut Contract<MemoryWorldState>) -> Result<()> {
                echo_record(mirror, self)
            }
        }
    )*};
}

echo_entity!(Waste, Extraction, Recycling);

impl<E: LedgerEntity> Echo for [E] {
    fn echo_into(&self, mirror: &mut Contract<MemoryWorldState>) -> Result<()> {
        self.iter().try_for_each(|record| echo_record(mirror, record))
    }
}

impl<E: LedgerEntity> Echo for Vec<E> {
    fn echo_into(&self, mirror: &mut Contract<MemoryWorldState>) -> Result<()> {
        self.as_slice().echo_into(mirror)
    }
}
