//! Resilient ledger client
//!
//! Routes every operation to the ledger when it can and to the local mirror
//! when it cannot, and labels the result with where it came from.
//!
//! ## Write path
//!
//! ```text
//! initialized?  ── no ──► mirror write ─────────────────────► temporary
//!      │ yes
//!      ▼
//! ledger call ── ok ──► echo into mirror ───────────────────► ledger
//!      │ transport failure or undecodable reply
//!      └────────────────► mirror write ─────────────────────► fallback
//! ```
//!
//! ## Read path
//!
//! ```text
//! initialized?  ── no ──► mirror ───────────────────────────► temporary
//!      │ yes
//!      ▼
//! ledger call ── found / non-empty ─────────────────────────► ledger
//!      ├── not found / empty ──► mirror ────────────────────► temporary
//!      └── transport / decode ─► mirror (no data: Internal) ► fallback
//! ```
//!
//! Domain rejections (validation, duplicate, reference, transition) from the
//! ledger are surfaced as-is and never trigger a fallback.
//!
//! ## Link saga
//!
//! Creating an extraction or recycling is followed by a second, separate
//! ledger write that advances the referenced waste (PROCESSED / RECYCLED).
//! That write never fails the create. Transport failures are retried
//! `link_retries` times and then queued as a [`PendingLink`] for
//! [`ResilientClient::reconcile_links`]. On the mirror path both steps run
//! under one mirror lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use olivechain_chaincode::{Contract, MemoryWorldState, TxContext};
use olivechain_integrity::{
    ContractError, EntityKind, Extraction, HistoryEvent, Invocation, LedgerEntity, NewExtraction,
    NewRecycling, NewWaste, Recycling, Result as ContractResult, StatusUpdate, Traceability,
    Waste, WasteStatus,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult, GatewayError, GatewayResult};
use crate::gateway::LedgerGateway;
use crate::mirror::{Echo, LocalMirror};
use crate::policy::GatewayPolicy;
use crate::response::{Provenance, ServiceResponse};

type Mirrored = Contract<MemoryWorldState>;

// =============================================================================
// Create requests
// =============================================================================

/// A create request the client can route to either store
pub trait CreateRequest: Send + Sync + 'static {
    type Record: LedgerEntity + Echo;

    fn validate(&self) -> ContractResult<()>;

    fn invocation(&self) -> Invocation;

    /// Run the create against a mirror contract
    fn apply(&self, contract: &mut Mirrored, ctx: &TxContext) -> ContractResult<Self::Record>;

    /// Waste status advance that follows a successful create
    fn link(&self) -> Option<WasteLink> {
        None
    }
}

impl CreateRequest for NewWaste {
    type Record = Waste;

    fn validate(&self) -> ContractResult<()> {
        NewWaste::validate(self).map(|_| ())
    }

    fn invocation(&self) -> Invocation {
        Invocation::CreateWaste(self.clone())
    }

    fn apply(&self, contract: &mut Mirrored, ctx: &TxContext) -> ContractResult<Waste> {
        contract.create_waste(ctx, self)
    }
}

impl CreateRequest for NewExtraction {
    type Record = Extraction;

    fn validate(&self) -> ContractResult<()> {
        NewExtraction::validate(self)
    }

    fn invocation(&self) -> Invocation {
        Invocation::CreateExtraction(self.clone())
    }

    fn apply(&self, contract: &mut Mirrored, ctx: &TxContext) -> ContractResult<Extraction> {
        contract.create_extraction(ctx, self)
    }

    fn link(&self) -> Option<WasteLink> {
        Some(WasteLink {
            waste_id: self.waste_id.clone(),
            target: WasteStatus::Processed,
            actor: self.processor.clone(),
            source_kind: EntityKind::Extraction,
            source_id: self.id.clone(),
        })
    }
}

impl CreateRequest for NewRecycling {
    type Record = Recycling;

    fn validate(&self) -> ContractResult<()> {
        NewRecycling::validate(self)
    }

    fn invocation(&self) -> Invocation {
        Invocation::CreateRecycling(self.clone())
    }

    fn apply(&self, contract: &mut Mirrored, ctx: &TxContext) -> ContractResult<Recycling> {
        contract.create_recycling(ctx, self)
    }

    fn link(&self) -> Option<WasteLink> {
        Some(WasteLink {
            waste_id: self.waste_id.clone(),
            target: WasteStatus::Recycled,
            actor: self.recycler.clone(),
            source_kind: EntityKind::Recycling,
            source_id: self.id.clone(),
        })
    }
}

// =============================================================================
// Link saga
// =============================================================================

/// Waste status advance triggered by an extraction or recycling create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteLink {
    pub waste_id: String,
    pub target: WasteStatus,
    pub actor: String,
    pub source_kind: EntityKind,
    pub source_id: String,
}

impl WasteLink {
    fn update(&self) -> StatusUpdate {
        StatusUpdate::new(&self.waste_id, self.target, &self.actor, self.note())
    }

    fn note(&self) -> String {
        match self.source_kind {
            EntityKind::Extraction => format!("Extraction {} recorded", self.source_id),
            EntityKind::Recycling => format!("Recycling {} recorded", self.source_id),
            EntityKind::Waste => format!("Linked from waste {}", self.source_id),
        }
    }

    fn apply_local(&self, contract: &mut Mirrored, ctx: &TxContext) {
        match contract.advance_waste(ctx, &self.waste_id, self.target, &self.actor, &self.note()) {
            Ok(Some(_)) => debug!(waste_id = %self.waste_id, target = %self.target, "Linked waste in local mirror"),
            Ok(None) => debug!(waste_id = %self.waste_id, target = %self.target, "Mirror waste already at or past link target"),
            Err(e) => warn!(waste_id = %self.waste_id, error = %e, "Failed to link waste in local mirror"),
        }
    }
}

/// A link whose ledger write failed and awaits reconciliation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingLink {
    #[serde(flatten)]
    pub link: WasteLink,
    pub attempts: u32,
    pub last_error: String,
    pub recorded_at: DateTime<Utc>,
}

/// Result of one `reconcile_links` pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub applied: usize,
    pub skipped: usize,
    pub pending: usize,
}

enum LinkOutcome {
    Applied(Option<Waste>),
    Skipped,
    Rejected(ContractError),
    Pending { error: GatewayError, attempts: u32 },
}

// =============================================================================
// Routing
// =============================================================================

enum Route<T> {
    Ledger(T),
    Missing(ContractError),
    Unavailable(GatewayError),
    Offline,
}

pub struct ResilientClient {
    gateway: Arc<dyn LedgerGateway>,
    policy: GatewayPolicy,
    mirror: LocalMirror,
    initialized: AtomicBool,
    pending: Mutex<Vec<PendingLink>>,
}

impl ResilientClient {
    pub fn new(gateway: Arc<dyn LedgerGateway>, policy: GatewayPolicy) -> Self {
        Self {
            gateway,
            policy,
            mirror: LocalMirror::new(),
            initialized: AtomicBool::new(false),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn policy(&self) -> &GatewayPolicy {
        &self.policy
    }

    pub fn mirror(&self) -> &LocalMirror {
        &self.mirror
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Connect to the ledger, optionally seeding sample data.
    ///
    /// Returns whether the ledger is in use. A failed connection is not an
    /// error: the client keeps serving from its mirror.
    pub async fn init(&self, seed: bool) -> bool {
        info!(gateway = %self.gateway.describe(), "Connecting to ledger");
        let connected = match tokio::time::timeout(self.policy.timeout, self.gateway.connect()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(error = %e, "Ledger connection failed, serving from local mirror");
                false
            }
            Err(_) => {
                warn!(timeout = ?self.policy.timeout, "Ledger connection timed out, serving from local mirror");
                false
            }
        };
        self.initialized.store(connected, Ordering::SeqCst);
        if connected {
            info!("Ledger connection established");
        }

        if seed {
            match self.seed().await {
                Ok(response) => info!(
                    seeded = response.data.len(),
                    source = %response.source,
                    "Sample data seeded"
                ),
                Err(e) => warn!(error = %e, "Seeding sample data failed"),
            }
        }
        connected
    }

    pub fn is_ready(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub async fn shutdown(&self) {
        if self.initialized.swap(false, Ordering::SeqCst) {
            self.gateway.close().await;
            info!("Ledger connection closed");
        }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Seed the sample wastes (idempotent)
    pub async fn seed(&self) -> ClientResult<ServiceResponse<Vec<Waste>>> {
        self.write_through(Invocation::InitLedger, |c, ctx| c.init_ledger(ctx))
            .await
            .map(ServiceResponse::counted)
    }

    /// Create a waste, extraction or recycling record.
    ///
    /// Extractions and recyclings then advance their waste; see the module
    /// docs for how that second write behaves.
    pub async fn create<R: CreateRequest>(&self, req: R) -> ClientResult<ServiceResponse<R::Record>> {
        req.validate()?;
        let link = req.link();
        let local_link = link.clone();
        let invocation = req.invocation();

        let response = self
            .write_through(invocation, move |c, ctx| {
                let record = req.apply(c, ctx)?;
                if let Some(link) = local_link {
                    link.apply_local(c, ctx);
                }
                Ok(record)
            })
            .await?;

        match (response.source, link) {
            (Provenance::Ledger, Some(link)) => {
                let warning = self.run_link(link).await;
                Ok(response.warn_opt(warning))
            }
            _ => Ok(response),
        }
    }

    /// Advance a waste's status (forward-only)
    pub async fn update_waste_status(&self, req: StatusUpdate) -> ClientResult<ServiceResponse<Waste>> {
        req.validate()?;
        let invocation = Invocation::UpdateWasteStatus(req.clone());
        self.write_through(invocation, move |c, ctx| c.update_waste_status(ctx, &req))
            .await
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn get<E: LedgerEntity>(&self, id: &str) -> ClientResult<ServiceResponse<E>> {
        self.read_through(Invocation::read(E::KIND, id), any, any, |c| c.store().get::<E>(id))
            .await
    }

    pub async fn list<E: LedgerEntity>(&self) -> ClientResult<ServiceResponse<Vec<E>>> {
        self.read_through(
            Invocation::list(E::KIND),
            non_empty,
            non_empty,
            |c| c.store().range_all::<E>(),
        )
        .await
        .map(ServiceResponse::counted)
    }

    pub async fn waste_history(&self, waste_id: &str) -> ClientResult<ServiceResponse<Vec<HistoryEvent>>> {
        let invocation = Invocation::GetWasteHistory {
            id: waste_id.to_string(),
        };
        self.read_through(invocation, any, any, |c| c.get_waste_history(waste_id))
            .await
            .map(ServiceResponse::counted)
    }

    pub async fn exists(&self, kind: EntityKind, id: &str) -> ClientResult<ServiceResponse<bool>> {
        let invocation = Invocation::Exists {
            kind,
            id: id.to_string(),
        };
        // A ledger `false` is checked against the mirror; a mirror `false`
        // is an answer in its own right
        self.read_through(invocation, |found| *found, any, |c| c.exists(kind, id))
            .await
    }

    /// Traceability chain for one waste.
    ///
    /// Any chain not served by the ledger is assembled here from mirror
    /// records and labelled `constructed`.
    pub async fn traceability(&self, waste_id: &str) -> ClientResult<ServiceResponse<Traceability>> {
        let invocation = Invocation::GetTraceability {
            waste_id: waste_id.to_string(),
        };
        let mut response = self
            .read_through(invocation, any, any, |c| c.get_traceability(waste_id))
            .await?;

        if response.source != Provenance::Ledger {
            debug!(waste_id = %waste_id, served_by = %response.source, "Traceability constructed from local mirror");
            response.source = Provenance::Constructed;
            response = response.warn("traceability chain constructed from local mirror records");
        }
        Ok(response)
    }

    // =========================================================================
    // Link reconciliation
    // =========================================================================

    pub async fn pending_links(&self) -> Vec<PendingLink> {
        self.pending.lock().await.clone()
    }

    /// Replay every pending link once against the ledger
    pub async fn reconcile_links(&self) -> ReconcileReport {
        let queued = std::mem::take(&mut *self.pending.lock().await);
        let mut report = ReconcileReport::default();
        let mut still_pending = Vec::new();

        for mut pending in queued {
            if !self.is_ready() {
                still_pending.push(pending);
                continue;
            }
            match self.submit_link(&pending.link, 0).await {
                LinkOutcome::Applied(waste) => {
                    if let Some(waste) = waste {
                        self.mirror.echo(&waste).await;
                    }
                    report.applied += 1;
                }
                LinkOutcome::Skipped => report.skipped += 1,
                LinkOutcome::Rejected(e) => {
                    warn!(waste_id = %pending.link.waste_id, error = %e, "Pending link rejected by ledger, dropping");
                    report.skipped += 1;
                }
                LinkOutcome::Pending { error, attempts } => {
                    pending.attempts += attempts;
                    pending.last_error = error.to_string();
                    still_pending.push(pending);
                }
            }
        }

        report.pending = still_pending.len();
        let mut queue = self.pending.lock().await;
        still_pending.append(&mut queue);
        *queue = still_pending;

        info!(
            applied = report.applied,
            skipped = report.skipped,
            pending = report.pending,
            "Link reconciliation finished"
        );
        report
    }

    async fn run_link(&self, link: WasteLink) -> Option<String> {
        match self.submit_link(&link, self.policy.link_retries).await {
            LinkOutcome::Applied(waste) => {
                if let Some(waste) = waste {
                    self.mirror.echo(&waste).await;
                }
                debug!(waste_id = %link.waste_id, target = %link.target, "Waste linked on ledger");
                None
            }
            LinkOutcome::Skipped => {
                debug!(waste_id = %link.waste_id, target = %link.target, "Waste already at or past link target");
                None
            }
            LinkOutcome::Rejected(e) => {
                warn!(waste_id = %link.waste_id, error = %e, "Ledger rejected waste link");
                Some(format!("waste {} status link rejected: {}", link.waste_id, e))
            }
            LinkOutcome::Pending { error, attempts } => {
                warn!(
                    waste_id = %link.waste_id,
                    target = %link.target,
                    attempts,
                    error = %error,
                    "Waste link failed, queued for reconciliation"
                );
                let warning = format!(
                    "waste {} status link to {} pending: {}",
                    link.waste_id, link.target, error
                );
                self.pending.lock().await.push(PendingLink {
                    link,
                    attempts,
                    last_error: error.to_string(),
                    recorded_at: Utc::now(),
                });
                Some(warning)
            }
        }
    }

    async fn submit_link(&self, link: &WasteLink, retries: u32) -> LinkOutcome {
        let invocation = Invocation::UpdateWasteStatus(link.update());
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.call(&invocation).await {
                Ok(value) => return LinkOutcome::Applied(serde_json::from_value(value).ok()),
                Err(GatewayError::Contract(ContractError::InvalidTransition { .. })) => {
                    return LinkOutcome::Skipped
                }
                Err(GatewayError::Contract(e)) => return LinkOutcome::Rejected(e),
                Err(error) if error.is_transport() && attempts <= retries => {
                    debug!(waste_id = %link.waste_id, attempts, error = %error, "Retrying waste link");
                    tokio::time::sleep(self.policy.retry_backoff).await;
                }
                Err(error) => return LinkOutcome::Pending { error, attempts },
            }
        }
    }

    // =========================================================================
    // Provenance policy
    // =========================================================================

    async fn write_through<T, F>(&self, invocation: Invocation, local: F) -> ClientResult<ServiceResponse<T>>
    where
        T: DeserializeOwned + Echo + Send,
        F: FnOnce(&mut Mirrored, &TxContext) -> ContractResult<T> + Send,
    {
        let (source, warning) = match self.route::<T>(&invocation).await? {
            Route::Ledger(data) => {
                self.mirror.echo(&data).await;
                return Ok(ServiceResponse::new(data, Provenance::Ledger));
            }
            Route::Missing(e) => return Err(e.into()),
            Route::Unavailable(err) => (
                Provenance::Fallback,
                format!("ledger unavailable ({}); stored in local mirror only", err),
            ),
            Route::Offline => (
                Provenance::Temporary,
                "ledger not initialized; stored in local mirror only".to_string(),
            ),
        };

        let ctx = TxContext::now();
        let data = self
            .mirror
            .write(|c| local(c, &ctx))
            .await
            .map_err(|e| match source {
                Provenance::Fallback if lacks_local_data(&e) => no_local_data(&e),
                _ => e.into(),
            })?;
        Ok(ServiceResponse::new(data, source).warn(warning))
    }

    /// `on_ledger` decides whether a ledger answer counts as data;
    /// `in_mirror` does the same for the mirror when the ledger is down.
    async fn read_through<T, F>(
        &self,
        invocation: Invocation,
        on_ledger: fn(&T) -> bool,
        in_mirror: fn(&T) -> bool,
        local: F,
    ) -> ClientResult<ServiceResponse<T>>
    where
        T: DeserializeOwned + Send,
        F: FnOnce(&Mirrored) -> ContractResult<T> + Send,
    {
        let (source, warning) = match self.route::<T>(&invocation).await? {
            Route::Ledger(data) if on_ledger(&data) => {
                return Ok(ServiceResponse::new(data, Provenance::Ledger))
            }
            Route::Ledger(_) | Route::Missing(_) => (
                Provenance::Temporary,
                "no data on ledger; served from local mirror".to_string(),
            ),
            Route::Offline => (
                Provenance::Temporary,
                "ledger not initialized; served from local mirror".to_string(),
            ),
            Route::Unavailable(err) => (
                Provenance::Fallback,
                format!("ledger unavailable ({}); served from local mirror", err),
            ),
        };

        let local = self.mirror.read(local).await;
        if source == Provenance::Fallback {
            return match local {
                Ok(data) if in_mirror(&data) => Ok(ServiceResponse::new(data, source).warn(warning)),
                Ok(_) => Err(ClientError::Internal(
                    "ledger unavailable and no local data".to_string(),
                )),
                Err(e) if lacks_local_data(&e) => Err(no_local_data(&e)),
                Err(e) => Err(e.into()),
            };
        }
        Ok(ServiceResponse::new(local?, source).warn(warning))
    }

    async fn route<T: DeserializeOwned>(&self, invocation: &Invocation) -> ClientResult<Route<T>> {
        if !self.is_ready() {
            debug!(function = invocation.function(), "Ledger not initialized, using local mirror");
            return Ok(Route::Offline);
        }
        let outcome = self.call(invocation).await.and_then(|value| {
            serde_json::from_value(value).map_err(|e| {
                GatewayError::Decode(format!("{} response: {}", invocation.function(), e))
            })
        });
        match outcome {
            Ok(data) => Ok(Route::Ledger(data)),
            Err(GatewayError::Contract(e)) if e.is_not_found() => Ok(Route::Missing(e)),
            Err(err) if err.is_transport() || matches!(err, GatewayError::Decode(_)) => {
                warn!(function = invocation.function(), error = %err, "Ledger call failed, falling back to local mirror");
                Ok(Route::Unavailable(err))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// One ledger call under the timeout and retry policy.
    ///
    /// A timed-out submit is not retried: it may already have committed.
    async fn call(&self, invocation: &Invocation) -> GatewayResult<Value> {
        let submit = invocation.is_submit();
        let mut attempt = 0;
        loop {
            match self.call_once(invocation, submit).await {
                Err(err) if attempt < self.policy.retries && retryable(&err, submit) => {
                    attempt += 1;
                    debug!(function = invocation.function(), attempt, error = %err, "Retrying ledger call");
                    tokio::time::sleep(self.policy.retry_backoff).await;
                }
                result => return result,
            }
        }
    }

    async fn call_once(&self, invocation: &Invocation, submit: bool) -> GatewayResult<Value> {
        let round_trip = async {
            if submit {
                self.gateway.submit(invocation).await
            } else {
                self.gateway.evaluate(invocation).await
            }
        };
        tokio::time::timeout(self.policy.timeout, round_trip)
            .await
            .unwrap_or_else(|_| Err(GatewayError::Timeout(self.policy.timeout)))
    }
}

fn any<T>(_: &T) -> bool {
    true
}

#[allow(clippy::ptr_arg)]
fn non_empty<T>(records: &Vec<T>) -> bool {
    !records.is_empty()
}

fn retryable(err: &GatewayError, submit: bool) -> bool {
    err.is_transient() && !(submit && matches!(err, GatewayError::Timeout(_)))
}

fn lacks_local_data(err: &ContractError) -> bool {
    matches!(
        err,
        ContractError::NotFound { .. } | ContractError::ReferenceNotFound { .. }
    )
}

fn no_local_data(err: &ContractError) -> ClientError {
    ClientError::Internal(format!("ledger unavailable and no local data: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::OfflineGateway;

    fn offline_client() -> ResilientClient {
        ResilientClient::new(Arc::new(OfflineGateway), GatewayPolicy::default())
    }

    fn new_waste(id: &str) -> NewWaste {
        NewWaste {
            id: id.into(),
            waste_type: "Branches".into(),
            quantity: 50.0,
            harvest_date: "2025-06-01".into(),
            owner: "farmer1".into(),
            farm: None,
            location: None,
        }
    }

    #[test]
    fn test_link_targets() {
        let extraction = NewExtraction {
            id: "e1".into(),
            waste_id: "w1".into(),
            product_type: "Oil".into(),
            quantity: 1.0,
            quality: "A".into(),
            processor: "mill".into(),
        };
        let link = extraction.link().unwrap();
        assert_eq!(link.target, WasteStatus::Processed);
        assert_eq!(link.update().details, "Extraction e1 recorded");
        assert!(new_waste("w1").link().is_none());
    }

    #[test]
    fn test_timed_out_submits_are_not_retried() {
        let timeout = GatewayError::Timeout(std::time::Duration::from_secs(1));
        assert!(!retryable(&timeout, true));
        assert!(retryable(&timeout, false));
        assert!(retryable(&GatewayError::Unavailable("x".into()), true));
        assert!(!retryable(&GatewayError::NotConnected, false));
    }

    #[tokio::test]
    async fn test_offline_client_serves_temporary() {
        let client = offline_client();
        assert!(!client.init(false).await);
        assert!(!client.is_ready());

        let created = client.create(new_waste("w1")).await.unwrap();
        assert_eq!(created.source, Provenance::Temporary);
        assert!(created.warning.is_some());

        let listed = client.list::<Waste>().await.unwrap();
        assert_eq!(listed.source, Provenance::Temporary);
        assert_eq!(listed.count, Some(1));

        let missing = client.get::<Waste>("nope").await.unwrap_err();
        assert!(missing.is_not_found());
    }

    #[tokio::test]
    async fn test_validation_happens_before_routing() {
        let client = offline_client();
        let mut bad = new_waste("w1");
        bad.quantity = 0.0;
        let err = client.create(bad).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(client.mirror().is_empty().await);
    }
}
