//! Green Olive Chain ledger program
//!
//! The logic that runs inside the ledger peer. It owns the rules of the
//! traceability model and nothing else; ordering, durability and
//! endorsement belong to the ledger that hosts it.
//!
//! ## Layers
//!
//! - [`WorldState`]: the peer's raw key/value stub (get, put, range scan)
//! - [`EntityStore`]: typed, namespaced records on top of a world state
//! - [`history`]: append-only event log embedded in each record
//! - [`traceability`]: chain-of-custody assembly across the three record types
//! - [`Contract`]: the ledger-program operations and their [`Invocation`] dispatch
//!
//! Two world states ship with the crate: [`MemoryWorldState`] (tests and
//! the client's local mirror) and [`SledWorldState`] (the embedded peer).
//!
//! [`Invocation`]: olivechain_integrity::Invocation

pub mod contract;
pub mod history;
pub mod seed;
pub mod sled_state;
pub mod store;
pub mod traceability;
pub mod world_state;

pub use contract::{Contract, TxContext};
pub use sled_state::SledWorldState;
pub use store::EntityStore;
pub use traceability::assemble_traceability;
pub use world_state::{MemoryWorldState, WorldState};

pub use olivechain_integrity as integrity;
