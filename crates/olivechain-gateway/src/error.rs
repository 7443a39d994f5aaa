//! Error types for the ledger client
//!
//! Two layers, kept apart on purpose:
//! - `GatewayError` is what a transport reports: either the ledger program
//!   rejected the invocation (`Contract`) or the ledger could not be reached.
//! - `ClientError` is what callers of `ResilientClient` see. Transport
//!   failures never reach it directly; they are absorbed by the fallback
//!   policy or turned into `Internal`.

use std::time::Duration;

use olivechain_integrity::{ContractError, EntityKind, FieldError, WasteStatus};
use serde_json::{json, Value};
use thiserror::Error;

/// Failure of a single ledger round trip
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("ledger rejected invocation: {0}")]
    Contract(#[from] ContractError),

    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    #[error("ledger call timed out after {0:?}")]
    Timeout(Duration),

    #[error("ledger gateway not connected")]
    NotConnected,

    #[error("unexpected ledger response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Connection, identity or transport failure. These trigger fallback.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Unavailable(_) | Self::Timeout(_) | Self::NotConnected
        )
    }

    /// Worth another attempt under the retry policy
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout(_))
    }

    /// Map an error raised inside a ledger peer. Storage failures on the peer
    /// are the peer being unavailable, not a rejection of the invocation.
    pub fn from_peer(err: ContractError) -> Self {
        match err {
            ContractError::State { message } => Self::Unavailable(message),
            other => Self::Contract(other),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Unavailable(err.to_string())
        }
    }
}

/// Result type for gateway round trips
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

// =============================================================================
// Caller-facing errors
// =============================================================================

/// Error returned by `ResilientClient` operations
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("validation failed: {}", join_fields(.details))]
    Validation { details: Vec<FieldError> },

    #[error("{kind} {id} already exists")]
    Duplicate { kind: EntityKind, id: String },

    #[error("referenced waste {waste_id} not found")]
    ReferenceNotFound { waste_id: String },

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: WasteStatus, to: WasteStatus },

    #[error("internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// HTTP-equivalent status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::Duplicate { .. } => 409,
            Self::ReferenceNotFound { .. } => 404,
            Self::NotFound { .. } => 404,
            Self::InvalidTransition { .. } => 409,
            Self::Internal(_) => 500,
        }
    }

    /// JSON error body: `{error, details}` for validation failures and
    /// `{error, <idField>}` when an entity is missing or already present.
    pub fn payload(&self) -> Value {
        match self {
            Self::Validation { details } => json!({
                "error": "Validation failed",
                "details": details
                    .iter()
                    .map(|d| json!({ "field": d.field, "message": d.message }))
                    .collect::<Vec<_>>(),
            }),
            Self::Duplicate { kind, id } => {
                let mut body = json!({ "error": format!("{} already exists", title(*kind)) });
                body[kind.id_field()] = Value::String(id.clone());
                body
            }
            Self::ReferenceNotFound { waste_id } => json!({
                "error": "Referenced waste not found",
                "wasteId": waste_id,
            }),
            Self::NotFound { kind, id } => {
                let mut body = json!({ "error": format!("{} not found", title(*kind)) });
                body[kind.id_field()] = Value::String(id.clone());
                body
            }
            Self::InvalidTransition { from, to } => json!({
                "error": "Invalid status transition",
                "from": from,
                "to": to,
            }),
            Self::Internal(message) => json!({ "error": message }),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<ContractError> for ClientError {
    fn from(err: ContractError) -> Self {
        match err {
            ContractError::Validation { details } => Self::Validation { details },
            ContractError::Duplicate { kind, id } => Self::Duplicate { kind, id },
            ContractError::ReferenceNotFound { waste_id } => Self::ReferenceNotFound { waste_id },
            ContractError::NotFound { kind, id } => Self::NotFound { kind, id },
            ContractError::InvalidTransition { from, to } => Self::InvalidTransition { from, to },
            ContractError::State { message } => Self::Internal(message),
            ContractError::Serialization { message } => Self::Internal(message),
        }
    }
}

impl From<GatewayError> for ClientError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Contract(inner) => inner.into(),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = std::result::Result<T, ClientError>;

fn title(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Waste => "Waste",
        EntityKind::Extraction => "Extraction",
        EntityKind::Recycling => "Recycling",
    }
}

fn join_fields(details: &[FieldError]) -> String {
    details
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
