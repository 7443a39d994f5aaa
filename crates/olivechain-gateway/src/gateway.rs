//! Ledger gateway abstraction
//!
//! The transport boundary between the client and a ledger peer. Each call is
//! one independent round trip; implementations do not pool or reuse sessions
//! across calls.

use async_trait::async_trait;
use olivechain_integrity::Invocation;
use serde_json::Value;

use crate::error::{GatewayError, GatewayResult};

#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Establish the connection and identity. Called once at startup.
    async fn connect(&self) -> GatewayResult<()>;

    /// Submit a state-changing invocation for ordering and commit
    async fn submit(&self, invocation: &Invocation) -> GatewayResult<Value>;

    /// Evaluate a query against the peer's current world state
    async fn evaluate(&self, invocation: &Invocation) -> GatewayResult<Value>;

    /// Release the connection
    async fn close(&self);

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Gateway that never connects. Runs the client purely on its local mirror.
#[derive(Debug, Default, Clone)]
pub struct OfflineGateway;

#[async_trait]
impl LedgerGateway for OfflineGateway {
    async fn connect(&self) -> GatewayResult<()> {
        Err(GatewayError::Unavailable("offline mode".into()))
    }

    async fn submit(&self, _invocation: &Invocation) -> GatewayResult<Value> {
        Err(GatewayError::NotConnected)
    }

    async fn evaluate(&self, _invocation: &Invocation) -> GatewayResult<Value> {
        Err(GatewayError::NotConnected)
    }

    async fn close(&self) {}

    fn describe(&self) -> String {
        "offline".to_string()
    }
}
