//! Ledger-program operations
//!
//! Every operation validates its typed input first, then checks references
//! and duplicates, and only then writes. A rejected operation leaves the
//! world state untouched.

use chrono::{DateTime, Utc};
use olivechain_integrity::{
    ContractError, EntityKind, Extraction, ExtractionStatus, HistoryEvent, Invocation,
    LedgerEntity, NewExtraction, NewRecycling, NewWaste, Recycling, RecyclingStatus, Result,
    StatusUpdate, Traceability, Waste, WasteStatus,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::history::append_event;
use crate::seed::sample_wastes;
use crate::store::EntityStore;
use crate::traceability::assemble_traceability;
use crate::world_state::WorldState;

/// Transaction context supplied by the hosting peer
#[derive(Debug, Clone)]
pub struct TxContext {
    pub tx_id: String,
    pub timestamp: DateTime<Utc>,
}

impl TxContext {
    pub fn new(tx_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            tx_id: tx_id.into(),
            timestamp,
        }
    }

    /// Context stamped with the current time
    pub fn now() -> Self {
        let timestamp = Utc::now();
        let nanos = timestamp.timestamp_nanos_opt().unwrap_or_default();
        Self::new(format!("tx-{:x}", nanos), timestamp)
    }
}

/// The olive-waste ledger program over a world state `S`
pub struct Contract<S> {
    store: EntityStore<S>,
}

impl<S: WorldState> Contract<S> {
    pub fn new(state: S) -> Self {
        Self {
            store: EntityStore::new(state),
        }
    }

    pub fn store(&self) -> &EntityStore<S> {
        &self.store
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Seed the sample wastes that are not already present
    pub fn init_ledger(&mut self, ctx: &TxContext) -> Result<Vec<Waste>> {
        let mut seeded = Vec::new();
        for req in sample_wastes() {
            if self.store.exists(EntityKind::Waste, &req.id)? {
                continue;
            }
            seeded.push(self.create_waste(ctx, &req)?);
        }
        info!(count = seeded.len(), "Ledger initialized");
        Ok(seeded)
    }

    pub fn create_waste(&mut self, ctx: &TxContext, req: &NewWaste) -> Result<Waste> {
        let harvest_date = req.validate()?;
        self.ensure_absent(EntityKind::Waste, &req.id)?;

        let waste = Waste {
            id: req.id.clone(),
            waste_type: req.waste_type.trim().to_string(),
            quantity: req.quantity,
            harvest_date,
            status: WasteStatus::Collected,
            owner: req.owner.clone(),
            farm: non_blank(&req.farm),
            location: non_blank(&req.location),
            created_at: ctx.timestamp,
            updated_at: ctx.timestamp,
            history: vec![HistoryEvent::created(
                ctx.timestamp,
                &req.owner,
                format!(
                    "Waste collected: {}, Quantity: {:.2}",
                    req.waste_type.trim(),
                    req.quantity
                ),
            )],
        };

        self.store.put(&waste)?;
        debug!(tx_id = %ctx.tx_id, waste_id = %waste.id, "Created waste");
        Ok(waste)
    }

    pub fn create_extraction(&mut self, ctx: &TxContext, req: &NewExtraction) -> Result<Extraction> {
        req.validate()?;
        self.ensure_waste(&req.waste_id)?;
        self.ensure_absent(EntityKind::Extraction, &req.id)?;

        let extraction = Extraction {
            id: req.id.clone(),
            waste_id: req.waste_id.clone(),
            product_type: req.product_type.trim().to_string(),
            quantity: req.quantity,
            quality: req.quality.clone(),
            extraction_date: ctx.timestamp,
            processor: req.processor.clone(),
            status: ExtractionStatus::Processed,
            created_at: ctx.timestamp,
            history: vec![HistoryEvent::created(
                ctx.timestamp,
                &req.processor,
                format!(
                    "Extracted {} ({:.2} units) from waste {}",
                    req.product_type.trim(),
                    req.quantity,
                    req.waste_id
                ),
            )],
        };

        self.store.put(&extraction)?;
        debug!(tx_id = %ctx.tx_id, extraction_id = %extraction.id, waste_id = %extraction.waste_id, "Created extraction");
        Ok(extraction)
    }

    pub fn create_recycling(&mut self, ctx: &TxContext, req: &NewRecycling) -> Result<Recycling> {
        req.validate()?;
        self.ensure_waste(&req.waste_id)?;
        self.ensure_absent(EntityKind::Recycling, &req.id)?;

        let recycling = Recycling {
            id: req.id.clone(),
            waste_id: req.waste_id.clone(),
            recycled_product: req.recycled_product.trim().to_string(),
            quantity: req.quantity,
            method: req.method.clone(),
            recycling_date: ctx.timestamp,
            recycler: req.recycler.clone(),
            status: RecyclingStatus::Completed,
            created_at: ctx.timestamp,
            history: vec![HistoryEvent::created(
                ctx.timestamp,
                &req.recycler,
                format!(
                    "Recycled waste {} into {} ({:.2} units) using {}",
                    req.waste_id,
                    req.recycled_product.trim(),
                    req.quantity,
                    req.method
                ),
            )],
        };

        self.store.put(&recycling)?;
        debug!(tx_id = %ctx.tx_id, recycling_id = %recycling.id, waste_id = %recycling.waste_id, "Created recycling");
        Ok(recycling)
    }

    /// Move a waste forward and record a STATUS_CHANGED event.
    ///
    /// Anything but a forward step is rejected with `InvalidTransition`.
    pub fn update_waste_status(&mut self, ctx: &TxContext, req: &StatusUpdate) -> Result<Waste> {
        let next = req.validate()?;
        let current: Waste = self.store.get(&req.id)?;
        current.status.check_transition(next)?;

        let event = HistoryEvent::status_changed(
            ctx.timestamp,
            &req.actor,
            current.status,
            next,
            &req.details,
        );
        let updated = append_event(&mut self.store, &req.id, ctx.timestamp, event, |w: &mut Waste| {
            w.status = next;
        })?;

        debug!(tx_id = %ctx.tx_id, waste_id = %req.id, from = %current.status, to = %next, "Waste status changed");
        Ok(updated)
    }

    /// Like `update_waste_status`, but a non-forward target is a no-op
    /// returning `None` instead of an error.
    pub fn advance_waste(
        &mut self,
        ctx: &TxContext,
        waste_id: &str,
        target: WasteStatus,
        actor: &str,
        note: &str,
    ) -> Result<Option<Waste>> {
        let current: Waste = self.store.get(waste_id)?;
        if !current.status.can_advance_to(target) {
            return Ok(None);
        }
        let update = StatusUpdate::new(waste_id, target, actor, note);
        self.update_waste_status(ctx, &update).map(Some)
    }

    /// Store a record verbatim, replacing whatever is under its key.
    ///
    /// Bypasses every rule; only for copying records another authority
    /// already accepted.
    pub fn put_record<E: LedgerEntity>(&mut self, record: &E) -> Result<()> {
        self.store.put(record)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn read_waste(&self, id: &str) -> Result<Waste> {
        self.store.get(id)
    }

    pub fn read_extraction(&self, id: &str) -> Result<Extraction> {
        self.store.get(id)
    }

    pub fn read_recycling(&self, id: &str) -> Result<Recycling> {
        self.store.get(id)
    }

    pub fn get_all_wastes(&self) -> Result<Vec<Waste>> {
        self.store.range_all()
    }

    pub fn get_all_extractions(&self) -> Result<Vec<Extraction>> {
        self.store.range_all()
    }

    pub fn get_all_recyclings(&self) -> Result<Vec<Recycling>> {
        self.store.range_all()
    }

    pub fn get_traceability(&self, waste_id: &str) -> Result<Traceability> {
        assemble_traceability(&self.store, waste_id)
    }

    pub fn get_waste_history(&self, id: &str) -> Result<Vec<HistoryEvent>> {
        Ok(self.read_waste(id)?.history)
    }

    pub fn exists(&self, kind: EntityKind, id: &str) -> Result<bool> {
        self.store.exists(kind, id)
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Run one invocation and return its JSON result
    pub fn dispatch(&mut self, ctx: &TxContext, invocation: &Invocation) -> Result<Value> {
        debug!(tx_id = %ctx.tx_id, function = invocation.function(), "Dispatching invocation");
        let value = match invocation {
            Invocation::InitLedger => serde_json::to_value(self.init_ledger(ctx)?)?,
            Invocation::CreateWaste(req) => serde_json::to_value(self.create_waste(ctx, req)?)?,
            Invocation::CreateExtraction(req) => {
                serde_json::to_value(self.create_extraction(ctx, req)?)?
            }
            Invocation::CreateRecycling(req) => {
                serde_json::to_value(self.create_recycling(ctx, req)?)?
            }
            Invocation::UpdateWasteStatus(req) => {
                serde_json::to_value(self.update_waste_status(ctx, req)?)?
            }
            Invocation::ReadWaste { id } => serde_json::to_value(self.read_waste(id)?)?,
            Invocation::ReadExtraction { id } => serde_json::to_value(self.read_extraction(id)?)?,
            Invocation::ReadRecycling { id } => serde_json::to_value(self.read_recycling(id)?)?,
            Invocation::GetAllWastes => serde_json::to_value(self.get_all_wastes()?)?,
            Invocation::GetAllExtractions => serde_json::to_value(self.get_all_extractions()?)?,
            Invocation::GetAllRecyclings => serde_json::to_value(self.get_all_recyclings()?)?,
            Invocation::GetTraceability { waste_id } => {
                serde_json::to_value(self.get_traceability(waste_id)?)?
            }
            Invocation::GetWasteHistory { id } => {
                serde_json::to_value(self.get_waste_history(id)?)?
            }
            Invocation::Exists { kind, id } => Value::Bool(self.exists(*kind, id)?),
        };
        Ok(value)
    }

    // =========================================================================
    // Checks
    // =========================================================================

    fn ensure_absent(&self, kind: EntityKind, id: &str) -> Result<()> {
        if self.store.exists(kind, id)? {
            return Err(ContractError::Duplicate {
                kind,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    fn ensure_waste(&self, waste_id: &str) -> Result<()> {
        if !self.store.exists(EntityKind::Waste, waste_id)? {
            return Err(ContractError::ReferenceNotFound {
                waste_id: waste_id.to_string(),
            });
        }
        Ok(())
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
