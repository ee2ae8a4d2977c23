//! Fieldrep CLI - capture field work offline and sync it later
//!
//! Every write lands in the local replica first; `fieldrep sync` or
//! `fieldrep watch` pushes the queue to the configured remote.

mod cli;
mod commands;
mod error;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::catalog::{run_clients, run_products, run_reasons};
use crate::commands::common::resolve_db_path;
use crate::commands::order::{run_order, Pricing};
use crate::commands::status::{run_queue, run_status};
use crate::commands::sync::{run_sync, run_watch};
use crate::commands::tasks::{run_complete_task, run_tasks};
use crate::commands::visit::{run_discard_visit, run_visit};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "fieldrep=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let db_path = resolve_db_path(cli.db_path)?;

    match cli.command {
        Commands::Status { rep, json } => run_status(rep.as_deref(), json, &db_path).await?,
        Commands::Queue { json } => run_queue(json, &db_path).await?,
        Commands::Sync => run_sync(&db_path).await?,
        Commands::Watch => run_watch(&db_path).await?,
        Commands::Clients {
            region,
            search,
            json,
        } => {
            run_clients(region.as_deref(), search.as_deref(), json, &db_path).await?;
        }
        Commands::Products { json } => run_products(json, &db_path).await?,
        Commands::Visit {
            rep,
            client,
            outcome,
            notes,
        } => {
            run_visit(&rep, &client, outcome.map(Into::into), notes, &db_path).await?;
        }
        Commands::DiscardVisit { id } => run_discard_visit(&id, &db_path).await?,
        Commands::Order {
            rep,
            client,
            visit,
            items,
            discount,
            reason,
            free_stock,
        } => {
            let pricing = Pricing::from_args(discount, reason.as_deref(), free_stock)?;
            run_order(&rep, &client, visit.as_deref(), &items, pricing, &db_path).await?;
        }
        Commands::Reasons { json } => run_reasons(json, &db_path).await?,
        Commands::Tasks { rep, refresh, json } => {
            run_tasks(&rep, refresh, json, &db_path).await?;
        }
        Commands::CompleteTask { id, notes } => run_complete_task(&id, notes, &db_path).await?,
    }

    Ok(())
}
