//! Shared helpers for client integration tests

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use olivechain_chaincode::{Contract, MemoryWorldState, TxContext};
use olivechain_gateway::integrity::{
    Invocation, NewExtraction, NewRecycling, NewWaste, Waste,
};
use olivechain_gateway::{GatewayError, GatewayPolicy, GatewayResult, LedgerGateway, ResilientClient};
use serde_json::Value;

/// In-memory ledger peer whose availability tests can switch at will
pub struct ScriptedGateway {
    ledger: Mutex<Contract<MemoryWorldState>>,
    connectable: AtomicBool,
    available: AtomicBool,
    failing: Mutex<HashSet<&'static str>>,
    delay: Mutex<Option<Duration>>,
    reply_delay: Mutex<Option<Duration>>,
    garbled: AtomicBool,
    misshapen: AtomicBool,
    calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            ledger: Mutex::new(Contract::new(MemoryWorldState::new())),
            connectable: AtomicBool::new(true),
            available: AtomicBool::new(true),
            failing: Mutex::new(HashSet::new()),
            delay: Mutex::new(None),
            reply_delay: Mutex::new(None),
            garbled: AtomicBool::new(false),
            misshapen: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        })
    }

    /// Refuse the initial connection
    pub fn refuse_connect(&self) {
        self.connectable.store(false, Ordering::SeqCst);
    }

    /// Fail every call with a transport error while `false`
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Fail calls to one ledger function with a transport error
    pub fn fail_function(&self, function: &'static str) {
        self.failing.lock().unwrap().insert(function);
    }

    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
        self.set_available(true);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Commit the next call at once but hold its reply back for `delay`
    pub fn delay_next_reply(&self, delay: Duration) {
        *self.reply_delay.lock().unwrap() = Some(delay);
    }

    /// Answer every call with a payload that does not decode
    pub fn set_garbled(&self, garbled: bool) {
        self.garbled.store(garbled, Ordering::SeqCst);
    }

    /// Answer every call with well-formed JSON of the wrong shape
    pub fn set_misshapen(&self, misshapen: bool) {
        self.misshapen.store(misshapen, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Waste as the ledger itself holds it
    pub fn ledger_waste(&self, id: &str) -> Option<Waste> {
        self.ledger.lock().unwrap().read_waste(id).ok()
    }

    pub fn ledger_len(&self) -> usize {
        self.ledger.lock().unwrap().store().state().len()
    }

    async fn call(&self, invocation: &Invocation) -> GatewayResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if !self.available.load(Ordering::SeqCst)
            || self.failing.lock().unwrap().contains(invocation.function())
        {
            return Err(GatewayError::Unavailable("connection refused".into()));
        }
        if self.garbled.load(Ordering::SeqCst) {
            return Err(GatewayError::Decode("peer sent html".into()));
        }
        if self.misshapen.load(Ordering::SeqCst) {
            return Ok(Value::String("<html>maintenance</html>".into()));
        }
        let result = self
            .ledger
            .lock()
            .unwrap()
            .dispatch(&TxContext::now(), invocation)
            .map_err(GatewayError::Contract);

        let reply_delay = self.reply_delay.lock().unwrap().take();
        if let Some(delay) = reply_delay {
            tokio::time::sleep(delay).await;
        }
        result
    }
}

#[async_trait]
impl LedgerGateway for ScriptedGateway {
    async fn connect(&self) -> GatewayResult<()> {
        if self.connectable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(GatewayError::Unavailable("peer unreachable".into()))
        }
    }

    async fn submit(&self, invocation: &Invocation) -> GatewayResult<Value> {
        self.call(invocation).await
    }

    async fn evaluate(&self, invocation: &Invocation) -> GatewayResult<Value> {
        self.call(invocation).await
    }

    async fn close(&self) {}

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

pub fn fast_policy() -> GatewayPolicy {
    GatewayPolicy {
        timeout: Duration::from_millis(200),
        retries: 0,
        retry_backoff: Duration::from_millis(5),
        link_retries: 1,
    }
}

/// Client over `gateway`, connected unless the gateway refuses
pub async fn client(gateway: &Arc<ScriptedGateway>) -> ResilientClient {
    let client = ResilientClient::new(gateway.clone(), fast_policy());
    client.init(false).await;
    client
}

pub fn waste(id: &str) -> NewWaste {
    NewWaste {
        id: id.into(),
        waste_type: "Branches".into(),
        quantity: 50.0,
        harvest_date: "2025-06-01".into(),
        owner: "farmer1".into(),
        farm: Some("Olive Farm Alpha".into()),
        location: None,
    }
}

pub fn extraction(id: &str, waste_id: &str) -> NewExtraction {
    NewExtraction {
        id: id.into(),
        waste_id: waste_id.into(),
        product_type: "Olive Oil".into(),
        quantity: 10.0,
        quality: "Extra Virgin".into(),
        processor: "mill1".into(),
    }
}

pub fn recycling(id: &str, waste_id: &str) -> NewRecycling {
    NewRecycling {
        id: id.into(),
        waste_id: waste_id.into(),
        recycled_product: "Compost".into(),
        quantity: 30.0,
        method: "Aerobic composting".into(),
        recycler: "coop1".into(),
    }
}
