//! Ledger program integration tests over both world state backends

use chrono::{Duration, Utc};
use olivechain_chaincode::integrity::history::starts_with_created;
use olivechain_chaincode::integrity::{
    EntityKind, ErrorKind, HistoryAction, NewExtraction, NewRecycling,
    NewWaste, StatusUpdate, WasteStatus,
};
use olivechain_chaincode::{Contract, MemoryWorldState, SledWorldState, TxContext, WorldState};

fn waste_req(id: &str) -> NewWaste {
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

fn extraction_req(id: &str, waste_id: &str) -> NewExtraction {
    NewExtraction {
        id: id.into(),
        waste_id: waste_id.into(),
        product_type: "Olive Oil".into(),
        quantity: 10.0,
        quality: "Extra Virgin".into(),
        processor: "mill1".into(),
    }
}

fn recycling_req(id: &str, waste_id: &str) -> NewRecycling {
    NewRecycling {
        id: id.into(),
        waste_id: waste_id.into(),
        recycled_product: "Compost".into(),
        quantity: 30.0,
        method: "Aerobic composting".into(),
        recycler: "coop1".into(),
    }
}

/// Create an extraction and then link it the way the client does
fn extract_and_link<S: WorldState>(c: &mut Contract<S>, id: &str, waste_id: &str) {
    c.create_extraction(&TxContext::now(), &extraction_req(id, waste_id))
        .expect("extraction");
    c.update_waste_status(
        &TxContext::now(),
        &StatusUpdate::new(waste_id, WasteStatus::Processed, "mill1", ""),
    )
    .expect("link");
}

#[test]
fn test_full_chain_on_sled_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("world");

    {
        let mut c = Contract::new(SledWorldState::open(&path).unwrap());
        c.create_waste(&TxContext::now(), &waste_req("WASTE_A")).unwrap();
        extract_and_link(&mut c, "EXTR_A", "WASTE_A");
        c.store().state().flush().unwrap();
    }

    let c = Contract::new(SledWorldState::open(&path).unwrap());
    let waste = c.read_waste("WASTE_A").unwrap();
    assert_eq!(waste.status, WasteStatus::Processed);
    assert_eq!(waste.history.len(), 2);
    assert_eq!(waste.history[0].action, HistoryAction::Created);
    assert_eq!(waste.history[1].action, HistoryAction::StatusChanged);

    let trace = c.get_traceability("WASTE_A").unwrap();
    assert_eq!(trace.extraction.as_ref().unwrap().id, "EXTR_A");
    assert!(trace.recycling.is_none());
    assert_eq!(trace.chain.len(), 3);
    assert_eq!(trace.chain[..2], waste.history[..]);
}

#[test]
fn test_extraction_against_missing_waste_writes_nothing() {
    let mut c = Contract::new(MemoryWorldState::new());
    let err = c
        .create_extraction(&TxContext::now(), &extraction_req("EXTR_X", "WASTE_NONE"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ReferenceNotFound);
    assert!(!c.exists(EntityKind::Extraction, "EXTR_X").unwrap());
    assert!(c.get_all_extractions().unwrap().is_empty());
}

#[test]
fn test_duplicates_are_rejected_for_every_kind() {
    let mut c = Contract::new(MemoryWorldState::new());
    c.create_waste(&TxContext::now(), &waste_req("w1")).unwrap();
    c.create_extraction(&TxContext::now(), &extraction_req("e1", "w1")).unwrap();
    c.create_recycling(&TxContext::now(), &recycling_req("r1", "w1")).unwrap();

    let errs = [
        c.create_waste(&TxContext::now(), &waste_req("w1")).unwrap_err(),
        c.create_extraction(&TxContext::now(), &extraction_req("e1", "w1")).unwrap_err(),
        c.create_recycling(&TxContext::now(), &recycling_req("r1", "w1")).unwrap_err(),
    ];
    for err in errs {
        assert_eq!(err.kind(), ErrorKind::Duplicate);
    }
    assert_eq!(c.get_all_wastes().unwrap().len(), 1);
    assert_eq!(c.get_all_extractions().unwrap().len(), 1);
    assert_eq!(c.get_all_recyclings().unwrap().len(), 1);
}

#[test]
fn test_same_id_across_kinds_is_allowed() {
    let mut c = Contract::new(MemoryWorldState::new());
    c.create_waste(&TxContext::now(), &waste_req("X1")).unwrap();
    c.create_extraction(&TxContext::now(), &extraction_req("X1", "X1")).unwrap();
    c.create_recycling(&TxContext::now(), &recycling_req("X1", "X1")).unwrap();

    for kind in EntityKind::ALL {
        assert!(c.exists(kind, "X1").unwrap(), "{} X1 should exist", kind);
    }
}

#[test]
fn test_history_only_grows_and_starts_with_created() {
    let mut c = Contract::new(MemoryWorldState::new());
    let t0 = Utc::now();
    c.create_waste(&TxContext::new("t0", t0), &waste_req("w1")).unwrap();

    let attempts = [
        WasteStatus::Processed,
        WasteStatus::Collected,
        WasteStatus::Processed,
        WasteStatus::Recycled,
        WasteStatus::Processed,
    ];
    let mut last_len = 1;
    let mut last_updated = t0;
    for (i, target) in attempts.into_iter().enumerate() {
        let ctx = TxContext::new(format!("t{}", i + 1), t0 + Duration::seconds(i as i64 + 1));
        let _ = c.update_waste_status(&ctx, &StatusUpdate::new("w1", target, "actor", ""));

        let waste = c.read_waste("w1").unwrap();
        assert!(waste.history.len() >= last_len);
        assert!(waste.updated_at >= last_updated);
        assert!(starts_with_created(&waste.history));
        last_len = waste.history.len();
        last_updated = waste.updated_at;
    }

    let waste = c.read_waste("w1").unwrap();
    assert_eq!(waste.status, WasteStatus::Recycled);
    assert_eq!(waste.history.len(), 3);
}

#[test]
fn test_recycling_skips_processed() {
    let mut c = Contract::new(MemoryWorldState::new());
    c.create_waste(&TxContext::now(), &waste_req("w1")).unwrap();
    c.create_recycling(&TxContext::now(), &recycling_req("r1", "w1")).unwrap();

    let linked = c
        .advance_waste(&TxContext::now(), "w1", WasteStatus::Recycled, "coop1", "")
        .unwrap()
        .unwrap();
    assert_eq!(linked.status, WasteStatus::Recycled);
    assert!(linked.history[1].details.contains("from COLLECTED to RECYCLED"));

    let trace = c.get_traceability("w1").unwrap();
    assert!(trace.extraction.is_none());
    assert_eq!(trace.recycling.unwrap().id, "r1");
}

#[test]
fn test_invalid_waste_reports_every_field() {
    let mut c = Contract::new(MemoryWorldState::new());
    let bad = NewWaste {
        id: "".into(),
        waste_type: " ".into(),
        quantity: -1.0,
        harvest_date: "01/06/2025".into(),
        owner: "".into(),
        farm: None,
        location: None,
    };
    let err = c.create_waste(&TxContext::now(), &bad).unwrap_err();
    match err {
        olivechain_chaincode::integrity::ContractError::Validation { details } => {
            let fields: Vec<&str> = details.iter().map(|d| d.field.as_str()).collect();
            assert_eq!(fields, vec!["id", "type", "quantity", "owner", "harvestDate"]);
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(c.get_all_wastes().unwrap().is_empty());
}
