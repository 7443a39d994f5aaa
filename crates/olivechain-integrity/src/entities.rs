//! Entity definitions
//!
//! Records are immutable-by-replacement: every change rewrites the whole
//! record under its key. JSON field names are the ledger's persisted format.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::history::HistoryEvent;
use crate::keys::EntityKind;
use crate::status::{ExtractionStatus, RecyclingStatus, WasteStatus};

/// Behaviour shared by every persisted entity type.
///
/// Lets the entity store, the history log and the client's resilient
/// gateway be written once and parameterized by entity type.
pub trait LedgerEntity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Namespace of this type in the key space
    const KIND: EntityKind;

    fn id(&self) -> &str;

    fn history(&self) -> &[HistoryEvent];

    fn history_mut(&mut self) -> &mut Vec<HistoryEvent>;

    /// Waste this record references, if any
    fn waste_ref(&self) -> Option<&str> {
        None
    }

    /// Stamp a modification time. Only entities with an `updatedAt` field care.
    fn touch(&mut self, _at: DateTime<Utc>) {}

    fn key(&self) -> String {
        Self::KIND.key(self.id())
    }
}

// =============================================================================
// Waste
// =============================================================================

/// A unit of collected agricultural byproduct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waste {
    pub id: String,
    /// Material type (e.g. "Olive Branches", "Pomace")
    #[serde(rename = "type")]
    pub waste_type: String,
    pub quantity: f64,
    pub harvest_date: NaiveDate,
    pub status: WasteStatus,
    /// Producer who collected the waste
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub history: Vec<HistoryEvent>,
}

impl LedgerEntity for Waste {
    const KIND: EntityKind = EntityKind::Waste;

    fn id(&self) -> &str {
        &self.id
    }

    fn history(&self) -> &[HistoryEvent] {
        &self.history
    }

    fn history_mut(&mut self) -> &mut Vec<HistoryEvent> {
        &mut self.history
    }

    // updatedAt never moves backwards, even if the caller's clock does
    fn touch(&mut self, at: DateTime<Utc>) {
        if at > self.updated_at {
            self.updated_at = at;
        }
    }
}

// =============================================================================
// Extraction
// =============================================================================

/// Extraction of a product (oil, polyphenols, ...) from one waste unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    pub id: String,
    pub waste_id: String,
    pub product_type: String,
    pub quantity: f64,
    /// Quality grade (free text, e.g. "Extra Virgin", "A")
    pub quality: String,
    pub extraction_date: DateTime<Utc>,
    pub processor: String,
    pub status: ExtractionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub history: Vec<HistoryEvent>,
}

impl LedgerEntity for Extraction {
    const KIND: EntityKind = EntityKind::Extraction;

    fn id(&self) -> &str {
        &self.id
    }

    fn history(&self) -> &[HistoryEvent] {
        &self.history
    }

    fn history_mut(&mut self) -> &mut Vec<HistoryEvent> {
        &mut self.history
    }

    fn waste_ref(&self) -> Option<&str> {
        Some(&self.waste_id)
    }
}

// =============================================================================
// Recycling
// =============================================================================

/// Recycling of one waste unit into a product (compost, biochar, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recycling {
    pub id: String,
    pub waste_id: String,
    pub recycled_product: String,
    pub quantity: f64,
    pub method: String,
    pub recycling_date: DateTime<Utc>,
    pub recycler: String,
    pub status: RecyclingStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub history: Vec<HistoryEvent>,
}

impl LedgerEntity for Recycling {
    const KIND: EntityKind = EntityKind::Recycling;

    fn id(&self) -> &str {
        &self.id
    }

    fn history(&self) -> &[HistoryEvent] {
        &self.history
    }

    fn history_mut(&mut self) -> &mut Vec<HistoryEvent> {
        &mut self.history
    }

    fn waste_ref(&self) -> Option<&str> {
        Some(&self.waste_id)
    }
}

// =============================================================================
// Traceability
// =============================================================================

/// Full chain of custody for one waste unit.
///
/// Derived on every query and never persisted. `chain` is the waste history
/// followed by the extraction history and then the recycling history; the
/// three segments are not interleaved by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Traceability {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waste: Option<Waste>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction: Option<Extraction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recycling: Option<Recycling>,
    #[serde(default)]
    pub chain: Vec<HistoryEvent>,
}

impl Traceability {
    /// Number of lifecycle stages present (1 to 3 for a found waste)
    pub fn stages(&self) -> usize {
        [
            self.waste.is_some(),
            self.extraction.is_some(),
            self.recycling.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}
