//! End-to-end runs over the embedded sled peer

use std::sync::Arc;

use olivechain_gateway::integrity::{EntityKind, Extraction, Waste, WasteStatus};
use olivechain_gateway::{EmbeddedGateway, GatewayPolicy, Provenance, ResilientClient};

mod common;

async fn embedded_client(path: &std::path::Path) -> ResilientClient {
    let client = ResilientClient::new(
        Arc::new(EmbeddedGateway::open(path)),
        GatewayPolicy::default(),
    );
    assert!(client.init(false).await);
    client
}

#[tokio::test]
async fn test_waste_to_extraction_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let client = embedded_client(&dir.path().join("ledger")).await;

    let mut req = common::waste("WASTE_A");
    req.farm = None;
    let created = client.create(req).await.unwrap();
    assert_eq!(created.source, Provenance::Ledger);
    assert_eq!(created.data.status, WasteStatus::Collected);

    client
        .create(common::extraction("EXTR_A", "WASTE_A"))
        .await
        .unwrap();

    let waste = client.get::<Waste>("WASTE_A").await.unwrap();
    assert_eq!(waste.source, Provenance::Ledger);
    assert_eq!(waste.data.status, WasteStatus::Processed);
    assert_eq!(waste.data.history.len(), 2);

    let trace = client.traceability("WASTE_A").await.unwrap();
    assert_eq!(trace.source, Provenance::Ledger);
    assert_eq!(trace.data.extraction.as_ref().unwrap().id, "EXTR_A");
    assert!(trace.data.recycling.is_none());
    assert_eq!(trace.data.chain[..2], waste.data.history[..]);

    client.shutdown().await;
}

#[tokio::test]
async fn test_extraction_for_unknown_waste_leaves_no_record() {
    let dir = tempfile::tempdir().unwrap();
    let client = embedded_client(&dir.path().join("ledger")).await;

    let err = client
        .create(common::extraction("EXTR_X", "WASTE_NONE"))
        .await
        .unwrap_err();
    assert_eq!(err.payload()["wasteId"], "WASTE_NONE");

    let exists = client.exists(EntityKind::Extraction, "EXTR_X").await.unwrap();
    assert!(!exists.data);
    assert!(client.list::<Extraction>().await.unwrap().data.is_empty());

    client.shutdown().await;
}

#[tokio::test]
async fn test_records_survive_client_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger");

    let client = embedded_client(&path).await;
    client.seed().await.unwrap();
    client.shutdown().await;
    drop(client);

    let client = embedded_client(&path).await;
    assert!(client.mirror().is_empty().await);
    let listed = client.list::<Waste>().await.unwrap();
    assert_eq!(listed.source, Provenance::Ledger);
    assert_eq!(listed.data[0].id, "waste1");
    client.shutdown().await;
}
