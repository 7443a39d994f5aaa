//! Green Olive Chain Integrity
//!
//! Shared definitions for the olive-waste traceability ledger:
//! - **Entities**: `Waste`, `Extraction`, `Recycling` and the derived `Traceability` chain
//! - **Key schema**: `<TYPE>_<id>` namespacing so all three types share one key space
//! - **History**: append-only `HistoryEvent` log embedded in every entity
//! - **Status**: the forward-only waste state machine
//! - **Requests**: typed create/update inputs with a single validation step
//! - **Invocation**: the typed wire schema of every ledger-program operation
//!
//! Nothing in this crate performs I/O. The ledger program (`olivechain-chaincode`)
//! and the client (`olivechain-gateway`) both build on these types so a record
//! written by one is always readable by the other.

pub mod entities;
pub mod error;
pub mod history;
pub mod invocation;
pub mod keys;
pub mod requests;
pub mod status;

pub use entities::{Extraction, LedgerEntity, Recycling, Traceability, Waste};
pub use error::{ContractError, ErrorKind, FieldError, Result};
pub use history::{HistoryAction, HistoryEvent};
pub use invocation::Invocation;
pub use keys::{EntityKind, KeyRange, RANGE_SENTINEL};
pub use requests::{NewExtraction, NewRecycling, NewWaste, StatusUpdate};
pub use status::{ExtractionStatus, RecyclingStatus, WasteStatus};
