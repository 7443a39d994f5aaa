//! Green Olive Chain Gateway
//!
//! Client side of the olive-waste traceability ledger:
//! - **Gateways**: `LedgerGateway` with an embedded sled peer, a remote HTTP
//!   peer and an offline stand-in
//! - **Local mirror**: lock-guarded in-process copy used for fallback and echo
//! - **Resilient client**: one provenance policy for every entity type, plus
//!   the link saga that advances a waste after extraction and recycling
//! - **Responses**: `ServiceResponse` envelopes labelled with their `Provenance`
//!
//! ## Example
//!
//! ```rust,ignore
//! use olivechain_gateway::{EmbeddedGateway, GatewayPolicy, ResilientClient};
//!
//! let client = ResilientClient::new(
//!     Arc::new(EmbeddedGateway::open("./data/ledger")),
//!     GatewayPolicy::default(),
//! );
//! client.init(true).await;
//!
//! let trace = client.traceability("waste1").await?;
//! println!("{} ({})", trace.data.chain.len(), trace.source);
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod embedded;
pub mod error;
pub mod gateway;
pub mod http;
pub mod logging;
pub mod mirror;
pub mod policy;
pub mod response;

pub use client::{CreateRequest, PendingLink, ReconcileReport, ResilientClient, WasteLink};
pub use config::{Args, LedgerMode};
pub use embedded::EmbeddedGateway;
pub use error::{ClientError, ClientResult, GatewayError, GatewayResult};
pub use gateway::{LedgerGateway, OfflineGateway};
pub use http::{HttpGateway, HttpGatewayConfig};
pub use mirror::LocalMirror;
pub use policy::GatewayPolicy;
pub use response::{Provenance, ServiceResponse};

pub use olivechain_integrity as integrity;
