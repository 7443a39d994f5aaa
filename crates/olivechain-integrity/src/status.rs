//! Waste status state machine
//!
//! ```text
//! COLLECTED ──extraction / update──► PROCESSED ──recycling / update──► RECYCLED
//!     │                                                                   ▲
//!     └─────────────────────── recycling / update ────────────────────────┘
//! ```
//!
//! Progression is forward-only: a status may only move to a later stage.
//! RECYCLED is terminal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ContractError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WasteStatus {
    Collected,
    Processed,
    Recycled,
}

impl WasteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collected => "COLLECTED",
            Self::Processed => "PROCESSED",
            Self::Recycled => "RECYCLED",
        }
    }

    fn stage(&self) -> u8 {
        match self {
            Self::Collected => 0,
            Self::Processed => 1,
            Self::Recycled => 2,
        }
    }

    /// Whether moving to `next` is a forward step
    pub fn can_advance_to(&self, next: WasteStatus) -> bool {
        next.stage() > self.stage()
    }

    /// Reject anything but a forward step
    pub fn check_transition(&self, next: WasteStatus) -> Result<()> {
        if self.can_advance_to(next) {
            Ok(())
        } else {
            Err(ContractError::InvalidTransition {
                from: *self,
                to: next,
            })
        }
    }
}

impl fmt::Display for WasteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WasteStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COLLECTED" => Ok(Self::Collected),
            "PROCESSED" => Ok(Self::Processed),
            "RECYCLED" => Ok(Self::Recycled),
            other => Err(format!(
                "unknown status '{}', expected COLLECTED, PROCESSED or RECYCLED",
                other
            )),
        }
    }
}

/// Status of an extraction record (set once at creation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtractionStatus {
    Processed,
}

/// Status of a recycling record (set once at creation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecyclingStatus {
    Completed,
}
