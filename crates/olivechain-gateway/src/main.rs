//! olivechain - olive-waste traceability client

use clap::Parser;
use tracing::{debug, error, warn};

use olivechain_gateway::{cli, logging, Args, ResilientClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    logging::init_tracing(&args.log_level, args.log_format);

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(2);
    }
    debug!(mode = ?args.ledger_mode, "Starting olivechain");

    let gateway = args.gateway()?;
    let client = ResilientClient::new(gateway, args.policy());
    client.init(args.seed_ledger).await;

    let outcome = cli::run(&client, args.command.clone()).await;

    if !client.pending_links().await.is_empty() {
        let report = client.reconcile_links().await;
        if report.pending > 0 {
            warn!(count = report.pending, "Waste links still pending at exit");
        }
    }
    client.shutdown().await;

    match outcome {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(e) => {
            println!("{}", serde_json::to_string_pretty(&e.payload())?);
            std::process::exit(if e.status_code() >= 500 { 2 } else { 1 });
        }
    }
}
