//! `olivechain` subcommands

use clap::Subcommand;
use olivechain_integrity::{
    EntityKind, Extraction, NewExtraction, NewRecycling, NewWaste, Recycling, StatusUpdate, Waste,
    WasteStatus,
};
use serde::Serialize;
use serde_json::Value;

use crate::client::ResilientClient;
use crate::error::{ClientError, ClientResult};
use crate::response::ServiceResponse;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Seed sample data (idempotent)
    Seed,

    /// Collected waste records
    #[command(subcommand)]
    Waste(WasteCommand),

    /// Extraction records
    #[command(subcommand)]
    Extraction(ExtractionCommand),

    /// Recycling records
    #[command(subcommand)]
    Recycling(RecyclingCommand),

    /// Traceability chain of one waste
    Trace { waste_id: String },

    /// Whether a record exists (kind: waste, extraction or recycling)
    Exists { kind: EntityKind, id: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum WasteCommand {
    Create {
        #[arg(long)]
        id: String,
        #[arg(long = "type")]
        waste_type: String,
        #[arg(long)]
        quantity: f64,
        /// YYYY-MM-DD
        #[arg(long)]
        harvest_date: String,
        #[arg(long)]
        owner: String,
        #[arg(long)]
        farm: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    Get {
        id: String,
    },
    List,
    /// Advance the waste status (forward only)
    Status {
        id: String,
        status: WasteStatus,
        #[arg(long)]
        actor: String,
        #[arg(long, default_value = "")]
        details: String,
    },
    History {
        id: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ExtractionCommand {
    Create {
        #[arg(long)]
        id: String,
        #[arg(long)]
        waste_id: String,
        #[arg(long)]
        product_type: String,
        #[arg(long)]
        quantity: f64,
        #[arg(long)]
        quality: String,
        #[arg(long)]
        processor: String,
    },
    Get {
        id: String,
    },
    List,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RecyclingCommand {
    Create {
        #[arg(long)]
        id: String,
        #[arg(long)]
        waste_id: String,
        #[arg(long)]
        recycled_product: String,
        #[arg(long)]
        quantity: f64,
        #[arg(long)]
        method: String,
        #[arg(long)]
        recycler: String,
    },
    Get {
        id: String,
    },
    List,
}

/// Run one command and return the response envelope as JSON
pub async fn run(client: &ResilientClient, command: Command) -> ClientResult<Value> {
    match command {
        Command::Seed => render(client.seed().await?),
        Command::Waste(cmd) => run_waste(client, cmd).await,
        Command::Extraction(cmd) => match cmd {
            ExtractionCommand::Create {
                id,
                waste_id,
                product_type,
                quantity,
                quality,
                processor,
            } => render(
                client
                    .create(NewExtraction {
                        id,
                        waste_id,
                        product_type,
                        quantity,
                        quality,
                        processor,
                    })
                    .await?,
            ),
            ExtractionCommand::Get { id } => render(client.get::<Extraction>(&id).await?),
            ExtractionCommand::List => render(client.list::<Extraction>().await?),
        },
        Command::Recycling(cmd) => match cmd {
            RecyclingCommand::Create {
                id,
                waste_id,
                recycled_product,
                quantity,
                method,
                recycler,
            } => render(
                client
                    .create(NewRecycling {
                        id,
                        waste_id,
                        recycled_product,
                        quantity,
                        method,
                        recycler,
                    })
                    .await?,
            ),
            RecyclingCommand::Get { id } => render(client.get::<Recycling>(&id).await?),
            RecyclingCommand::List => render(client.list::<Recycling>().await?),
        },
        Command::Trace { waste_id } => render(client.traceability(&waste_id).await?),
        Command::Exists { kind, id } => render(client.exists(kind, &id).await?),
    }
}

async fn run_waste(client: &ResilientClient, cmd: WasteCommand) -> ClientResult<Value> {
    match cmd {
        WasteCommand::Create {
            id,
            waste_type,
            quantity,
            harvest_date,
            owner,
            farm,
            location,
        } => render(
            client
                .create(NewWaste {
                    id,
                    waste_type,
                    quantity,
                    harvest_date,
                    owner,
                    farm,
                    location,
                })
                .await?,
        ),
        WasteCommand::Get { id } => render(client.get::<Waste>(&id).await?),
        WasteCommand::List => render(client.list::<Waste>().await?),
        WasteCommand::Status {
            id,
            status,
            actor,
            details,
        } => render(
            client
                .update_waste_status(StatusUpdate::new(id, status, actor, details))
                .await?,
        ),
        WasteCommand::History { id } => render(client.waste_history(&id).await?),
    }
}

fn render<T: Serialize>(response: ServiceResponse<T>) -> ClientResult<Value> {
    serde_json::to_value(response).map_err(|e| ClientError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::OfflineGateway;
    use crate::policy::GatewayPolicy;
    use clap::Parser;
    use std::sync::Arc;

    #[derive(Parser)]
    struct TestCli {
        #[command(subcommand)]
        command: Command,
    }

    fn parse(argv: &[&str]) -> Command {
        TestCli::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn test_parse_exists_is_case_insensitive() {
        match parse(&["olivechain", "exists", "EXTRACTION", "EXTR_X"]) {
            Command::Exists { kind, id } => {
                assert_eq!(kind, EntityKind::Extraction);
                assert_eq!(id, "EXTR_X");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_status() {
        assert!(TestCli::try_parse_from([
            "olivechain", "waste", "status", "w1", "BURNED", "--actor", "x"
        ])
        .is_err());
    }

    #[tokio::test]
    async fn test_run_against_offline_client() {
        let client = ResilientClient::new(Arc::new(OfflineGateway), GatewayPolicy::default());

        let created = run(
            &client,
            parse(&[
                "olivechain",
                "waste",
                "create",
                "--id",
                "WASTE_A",
                "--type",
                "Branches",
                "--quantity",
                "50",
                "--harvest-date",
                "2025-06-01",
                "--owner",
                "farmer1",
            ]),
        )
        .await
        .unwrap();
        assert_eq!(created["source"], "temporary");
        assert_eq!(created["data"]["status"], "COLLECTED");

        let exists = run(&client, parse(&["olivechain", "exists", "waste", "WASTE_A"]))
            .await
            .unwrap();
        assert_eq!(exists["data"], true);

        let trace = run(&client, parse(&["olivechain", "trace", "WASTE_A"]))
            .await
            .unwrap();
        assert_eq!(trace["source"], "constructed");

        let err = run(&client, parse(&["olivechain", "extraction", "get", "EXTR_X"]))
            .await
            .unwrap_err();
        assert_eq!(err.payload()["extractionId"], "EXTR_X");
    }
}
