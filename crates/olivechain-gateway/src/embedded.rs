//! In-process ledger peer
//!
//! Runs the ledger program directly against a sled world state. A session is
//! the peer lock held for exactly one invocation; submits are flushed to disk
//! before the session is released.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use olivechain_chaincode::{Contract, SledWorldState, TxContext};
use olivechain_integrity::Invocation;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::LedgerGateway;

#[derive(Debug, Clone)]
enum Storage {
    Path(PathBuf),
    Temporary,
}

pub struct EmbeddedGateway {
    storage: Storage,
    peer: Mutex<Option<Contract<SledWorldState>>>,
}

impl EmbeddedGateway {
    /// Peer whose world state lives at `path`, opened on `connect`
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            storage: Storage::Path(path.into()),
            peer: Mutex::new(None),
        }
    }

    /// Peer with a throwaway world state
    pub fn temporary() -> Self {
        Self {
            storage: Storage::Temporary,
            peer: Mutex::new(None),
        }
    }

    async fn run(&self, invocation: &Invocation, commit: bool) -> GatewayResult<Value> {
        let mut session = self.peer.lock().await;
        let contract = session.as_mut().ok_or(GatewayError::NotConnected)?;

        let ctx = TxContext::new(Uuid::new_v4().to_string(), Utc::now());
        debug!(tx_id = %ctx.tx_id, function = invocation.function(), commit, "Embedded ledger call");

        let value = contract
            .dispatch(&ctx, invocation)
            .map_err(GatewayError::from_peer)?;
        if commit {
            contract
                .store()
                .state()
                .flush()
                .map_err(GatewayError::from_peer)?;
        }
        Ok(value)
    }
}

#[async_trait]
impl LedgerGateway for EmbeddedGateway {
    async fn connect(&self) -> GatewayResult<()> {
        let mut peer = self.peer.lock().await;
        if peer.is_some() {
            return Ok(());
        }
        let state = match &self.storage {
            Storage::Path(path) => SledWorldState::open(path),
            Storage::Temporary => SledWorldState::temporary(),
        }
        .map_err(GatewayError::from_peer)?;

        *peer = Some(Contract::new(state));
        info!(peer = %self.describe(), "Embedded ledger peer ready");
        Ok(())
    }

    async fn submit(&self, invocation: &Invocation) -> GatewayResult<Value> {
        self.run(invocation, true).await
    }

    async fn evaluate(&self, invocation: &Invocation) -> GatewayResult<Value> {
        self.run(invocation, false).await
    }

    async fn close(&self) {
        if let Some(contract) = self.peer.lock().await.take() {
            if let Err(e) = contract.store().state().flush() {
                warn!(error = %e, "Failed to flush world state on close");
            }
            info!(peer = %self.describe(), "Embedded ledger peer closed");
        }
    }

    fn describe(&self) -> String {
        match &self.storage {
            Storage::Path(path) => format!("embedded:{}", path.display()),
            Storage::Temporary => "embedded:temporary".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use olivechain_integrity::{ContractError, NewWaste};

    fn create(id: &str) -> Invocation {
        Invocation::CreateWaste(NewWaste {
            id: id.into(),
            waste_type: "Pomace".into(),
            quantity: 8.0,
            harvest_date: "2025-11-02".into(),
            owner: "farmer3".into(),
            farm: None,
            location: None,
        })
    }

    #[tokio::test]
    async fn test_calls_before_connect_fail() {
        let gw = EmbeddedGateway::temporary();
        let err = gw.evaluate(&Invocation::GetAllWastes).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotConnected));
    }

    #[tokio::test]
    async fn test_submit_then_evaluate() {
        let gw = EmbeddedGateway::temporary();
        gw.connect().await.unwrap();

        let created = gw.submit(&create("w1")).await.unwrap();
        assert_eq!(created["status"], "COLLECTED");

        let all = gw.evaluate(&Invocation::GetAllWastes).await.unwrap();
        assert_eq!(all.as_array().unwrap().len(), 1);

        let err = gw.submit(&create("w1")).await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Contract(ContractError::Duplicate { .. })
        ));
    }

    #[tokio::test]
    async fn test_world_state_survives_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("peer");

        let gw = EmbeddedGateway::open(&path);
        gw.connect().await.unwrap();
        gw.submit(&create("w1")).await.unwrap();
        gw.close().await;

        let gw = EmbeddedGateway::open(&path);
        gw.connect().await.unwrap();
        let waste = gw
            .evaluate(&Invocation::ReadWaste { id: "w1".into() })
            .await
            .unwrap();
        assert_eq!(waste["id"], "w1");
    }
}
