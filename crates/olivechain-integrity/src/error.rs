//! Error taxonomy of the ledger program
//!
//! `ContractError` is what the ledger program returns when it rejects an
//! invocation. It is serializable so a rejection crosses the gateway wire
//! unchanged and the client can tell a domain rejection (surface it) from a
//! transport failure (fall back).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keys::EntityKind;
use crate::status::WasteStatus;

/// Result type for ledger-program operations
pub type Result<T> = std::result::Result<T, ContractError>;

/// One rejected field of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Ledger-program rejection
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "camelCase")]
pub enum ContractError {
    /// Missing or malformed required field
    #[error("Validation failed: {}", join_details(.details))]
    Validation { details: Vec<FieldError> },

    /// Id collision on create
    #[error("{kind} {id} already exists")]
    Duplicate { kind: EntityKind, id: String },

    /// Extraction/recycling points at a waste that does not exist
    #[error("Source waste not found: {waste_id}")]
    ReferenceNotFound {
        #[serde(rename = "wasteId")]
        waste_id: String,
    },

    /// Read or update of a missing entity
    #[error("{kind} {id} does not exist")]
    NotFound { kind: EntityKind, id: String },

    /// Status update that would not move the waste forward
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: WasteStatus, to: WasteStatus },

    /// World state read/write failure inside the peer
    #[error("World state error: {message}")]
    State { message: String },

    /// Stored bytes did not decode into the expected entity
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

fn join_details(details: &[FieldError]) -> String {
    details
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Discriminant of [`ContractError`], handy for matching in callers and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Duplicate,
    ReferenceNotFound,
    NotFound,
    InvalidTransition,
    State,
    Serialization,
}

impl ContractError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            details: vec![FieldError::new(field, message)],
        }
    }

    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound { kind, id: id.into() }
    }

    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Duplicate { .. } => ErrorKind::Duplicate,
            Self::ReferenceNotFound { .. } => ErrorKind::ReferenceNotFound,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::State { .. } => ErrorKind::State,
            Self::Serialization { .. } => ErrorKind::Serialization,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<serde_json::Error> for ContractError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}
