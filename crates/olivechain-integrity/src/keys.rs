//! Key schema
//!
//! All three entity types share one key space. Every key is `<TYPE>_<id>`,
//! and enumerating one type scans the half-open range `[TYPE_, TYPE_~)`.
//! Ids are restricted (see `requests::validate_id`) to characters that sort
//! below `~`, so the range always covers every id of its type and nothing else.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound character for range scans, lexically above every id character
pub const RANGE_SENTINEL: char = '~';

/// The three persisted entity types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Waste,
    Extraction,
    Recycling,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [Self::Waste, Self::Extraction, Self::Recycling];

    /// Namespace prefix used in the ledger key space
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Waste => "WASTE",
            Self::Extraction => "EXTRACTION",
            Self::Recycling => "RECYCLING",
        }
    }

    /// Ledger key for an id of this kind
    pub fn key(&self, id: &str) -> String {
        format!("{}_{}", self.prefix(), id)
    }

    /// Key range covering every entity of this kind
    pub fn range(&self) -> KeyRange {
        KeyRange {
            start: format!("{}_", self.prefix()),
            end: format!("{}_{}", self.prefix(), RANGE_SENTINEL),
        }
    }

    /// Field name used for this kind's id in error payloads
    pub fn id_field(&self) -> &'static str {
        match self {
            Self::Waste => "wasteId",
            Self::Extraction => "extractionId",
            Self::Recycling => "recyclingId",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Waste => "waste",
            Self::Extraction => "extraction",
            Self::Recycling => "recycling",
        };
        f.write_str(name)
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "WASTE" => Ok(Self::Waste),
            "EXTRACTION" => Ok(Self::Extraction),
            "RECYCLING" => Ok(Self::Recycling),
            other => Err(format!("unknown entity kind: {}", other)),
        }
    }
}

/// Half-open key range `[start, end)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    pub start: String,
    pub end: String,
}
