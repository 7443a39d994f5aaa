//! Configuration for the olivechain client
//!
//! CLI arguments and environment variable handling using clap. Every flag
//! can also be set from the environment (or a `.env` file).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::cli::Command;
use crate::embedded::EmbeddedGateway;
use crate::error::GatewayResult;
use crate::gateway::{LedgerGateway, OfflineGateway};
use crate::http::{HttpGateway, HttpGatewayConfig};
use crate::logging::LogFormat;
use crate::policy::GatewayPolicy;

/// Where ledger calls go
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LedgerMode {
    /// In-process peer over a local sled world state
    Embedded,
    /// Remote peer over HTTP
    Remote,
    /// No ledger; the local mirror serves everything
    Offline,
}

/// Green Olive Chain - olive-waste traceability on a ledger
#[derive(Parser, Debug, Clone)]
#[command(name = "olivechain")]
#[command(about = "Record and trace olive-waste collection, extraction and recycling")]
pub struct Args {
    /// Ledger backend
    #[arg(long, env = "LEDGER_MODE", value_enum, default_value = "embedded", global = true)]
    pub ledger_mode: LedgerMode,

    /// World state directory for the embedded peer
    #[arg(long, env = "LEDGER_PATH", default_value = "./data/ledger", global = true)]
    pub ledger_path: PathBuf,

    /// Base URL of the remote peer gateway (required in remote mode)
    #[arg(long, env = "LEDGER_URL", global = true)]
    pub ledger_url: Option<String>,

    /// Channel the ledger program is deployed on
    #[arg(long, env = "LEDGER_CHANNEL", default_value = "mychannel", global = true)]
    pub ledger_channel: String,

    /// Name of the deployed ledger program
    #[arg(long, env = "LEDGER_CHAINCODE", default_value = "olivechain", global = true)]
    pub ledger_chaincode: String,

    /// Identity forwarded to the remote peer
    #[arg(long, env = "LEDGER_IDENTITY", global = true)]
    pub ledger_identity: Option<String>,

    /// Timeout for one ledger round trip in milliseconds
    #[arg(long, env = "LEDGER_TIMEOUT_MS", default_value = "10000", global = true)]
    pub ledger_timeout_ms: u64,

    /// Extra attempts after a transient ledger failure
    #[arg(long, env = "LEDGER_RETRIES", default_value = "0", global = true)]
    pub ledger_retries: u32,

    /// Pause between ledger attempts in milliseconds
    #[arg(long, env = "LEDGER_RETRY_BACKOFF_MS", default_value = "200", global = true)]
    pub ledger_retry_backoff_ms: u64,

    /// Extra attempts for the waste status link after a create
    #[arg(long, env = "LINK_RETRIES", default_value = "1", global = true)]
    pub link_retries: u32,

    /// Seed sample data on startup
    #[arg(long, env = "SEED_LEDGER", default_value = "false", global = true)]
    pub seed_ledger: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.ledger_mode == LedgerMode::Remote {
            match self.ledger_url.as_deref() {
                None | Some("") => {
                    return Err("LEDGER_URL is required in remote mode".to_string())
                }
                Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                    return Err(format!("LEDGER_URL must be an http(s) URL, got {}", url))
                }
                Some(_) => {}
            }
        }

        if self.ledger_timeout_ms == 0 {
            return Err("LEDGER_TIMEOUT_MS must be greater than zero".to_string());
        }

        Ok(())
    }

    pub fn policy(&self) -> GatewayPolicy {
        GatewayPolicy {
            timeout: Duration::from_millis(self.ledger_timeout_ms),
            retries: self.ledger_retries,
            retry_backoff: Duration::from_millis(self.ledger_retry_backoff_ms),
            link_retries: self.link_retries,
        }
    }

    /// Gateway for the configured ledger mode
    pub fn gateway(&self) -> GatewayResult<Arc<dyn LedgerGateway>> {
        Ok(match self.ledger_mode {
            LedgerMode::Embedded => Arc::new(EmbeddedGateway::open(&self.ledger_path)),
            LedgerMode::Remote => Arc::new(HttpGateway::new(HttpGatewayConfig {
                base_url: self.ledger_url.clone().unwrap_or_default(),
                channel: self.ledger_channel.clone(),
                chaincode: self.ledger_chaincode.clone(),
                identity: self.ledger_identity.clone(),
                timeout: Duration::from_millis(self.ledger_timeout_ms),
            })?),
            LedgerMode::Offline => Arc::new(OfflineGateway),
        })
    }
}
