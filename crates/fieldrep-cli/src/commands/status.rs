use std::path::Path;

use fieldrep_core::services::DashboardStats;
use serde::Serialize;

use crate::commands::common::{
    format_queue_lines, format_sync_timestamp, normalize_identifier, open_service,
    queue_entry_to_item, QueueEntryItem,
};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct StatusItem {
    pending_sync: usize,
    last_full_pull_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dashboard: Option<DashboardStats>,
}

pub async fn run_status(rep: Option<&str>, as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let service = open_service(db_path).await?;
    let dashboard = match rep {
        Some(rep) => {
            let rep_id = normalize_identifier(rep, "Representative ID")?;
            Some(service.dashboard_stats(&rep_id).await?)
        }
        None => None,
    };
    let status = StatusItem {
        pending_sync: service.pending_count().await?,
        last_full_pull_at: service.last_full_pull_at().await?,
        dashboard,
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("Waiting to sync: {}", status.pending_sync);
    println!(
        "Last full pull:  {}",
        status
            .last_full_pull_at
            .map_or_else(|| "never".to_string(), format_sync_timestamp)
    );
    if let Some(stats) = status.dashboard {
        println!("Visits today:    {}", stats.visits_today);
        println!("Orders placed:   {}", stats.orders_placed);
        println!("Open tasks:      {}", stats.open_tasks);
    }
    Ok(())
}

pub async fn run_queue(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let entries = open_service(db_path).await?.sync_queue().await?;

    if as_json {
        let json_items = entries
            .iter()
            .map(queue_entry_to_item)
            .collect::<Vec<QueueEntryItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("Nothing waiting to sync.");
        return Ok(());
    }

    for line in format_queue_lines(&entries) {
        println!("{line}");
    }
    Ok(())
}
