//! Typed ledger-program invocations
//!
//! One variant per operation the ledger program exposes. Serialized as
//! `{"function": "CreateWaste", "args": {...}}` on the wire.

use serde::{Deserialize, Serialize};

use crate::keys::EntityKind;
use crate::requests::{NewExtraction, NewRecycling, NewWaste, StatusUpdate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "function", content = "args")]
pub enum Invocation {
    /// Seed sample data (idempotent)
    InitLedger,

    CreateWaste(NewWaste),
    CreateExtraction(NewExtraction),
    CreateRecycling(NewRecycling),
    UpdateWasteStatus(StatusUpdate),

    ReadWaste { id: String },
    ReadExtraction { id: String },
    ReadRecycling { id: String },

    GetAllWastes,
    GetAllExtractions,
    GetAllRecyclings,

    #[serde(rename_all = "camelCase")]
    GetTraceability { waste_id: String },
    GetWasteHistory { id: String },

    Exists { kind: EntityKind, id: String },
}

impl Invocation {
    /// Name of the ledger-program function
    pub fn function(&self) -> &'static str {
        match self {
            Self::InitLedger => "InitLedger",
            Self::CreateWaste(_) => "CreateWaste",
            Self::CreateExtraction(_) => "CreateExtraction",
            Self::CreateRecycling(_) => "CreateRecycling",
            Self::UpdateWasteStatus(_) => "UpdateWasteStatus",
            Self::ReadWaste { .. } => "ReadWaste",
            Self::ReadExtraction { .. } => "ReadExtraction",
            Self::ReadRecycling { .. } => "ReadRecycling",
            Self::GetAllWastes => "GetAllWastes",
            Self::GetAllExtractions => "GetAllExtractions",
            Self::GetAllRecyclings => "GetAllRecyclings",
            Self::GetTraceability { .. } => "GetTraceability",
            Self::GetWasteHistory { .. } => "GetWasteHistory",
            Self::Exists { .. } => "Exists",
        }
    }

    /// Writes are submitted for ordering; everything else is evaluated
    pub fn is_submit(&self) -> bool {
        matches!(
            self,
            Self::InitLedger
                | Self::CreateWaste(_)
                | Self::CreateExtraction(_)
                | Self::CreateRecycling(_)
                | Self::UpdateWasteStatus(_)
        )
    }

    /// Read invocation for a single entity of `kind`
    pub fn read(kind: EntityKind, id: impl Into<String>) -> Self {
        let id = id.into();
        match kind {
            EntityKind::Waste => Self::ReadWaste { id },
            EntityKind::Extraction => Self::ReadExtraction { id },
            EntityKind::Recycling => Self::ReadRecycling { id },
        }
    }

    /// Enumeration invocation for every entity of `kind`
    pub fn list(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Waste => Self::GetAllWastes,
            EntityKind::Extraction => Self::GetAllExtractions,
            EntityKind::Recycling => Self::GetAllRecyclings,
        }
    }
}
