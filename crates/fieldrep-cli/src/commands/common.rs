use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use fieldrep_core::config::EngineConfig;
use fieldrep_core::models::{Client, Product, RepTask, StockDiscountReason};
use fieldrep_core::services::FieldDataService;
use fieldrep_core::sync::{ConnectivityMonitor, PostgrestGateway, SyncCoordinator};
use fieldrep_core::{RecordId, SyncQueueEntry};
use serde::Serialize;

use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct QueueEntryItem {
    pub id: String,
    pub table: String,
    pub record_id: String,
    pub operation: String,
    pub retry_count: u32,
    pub created_at: i64,
    pub created_at_iso: String,
    pub last_attempt: Option<i64>,
}

pub fn queue_entry_to_item(entry: &SyncQueueEntry) -> QueueEntryItem {
    QueueEntryItem {
        id: entry.id.to_string(),
        table: entry.table_name.to_string(),
        record_id: entry.record_id.to_string(),
        operation: entry.operation.to_string(),
        retry_count: entry.retry_count,
        created_at: entry.created_at,
        created_at_iso: format_sync_timestamp(entry.created_at),
        last_attempt: entry.last_attempt,
    }
}

pub fn format_queue_lines(entries: &[SyncQueueEntry]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    entries
        .iter()
        .map(|entry| {
            let record = short_id(entry.record_id.as_str());
            let age = format_relative_time(entry.created_at, now_ms);
            let line = format!(
                "{:<6}  {:<22}  {record:<13}  {age}",
                entry.operation.as_str(),
                entry.table_name.name()
            );
            if entry.retry_count == 0 {
                line
            } else {
                format!("{line:<56}  retries={}", entry.retry_count)
            }
        })
        .collect()
}

pub fn format_client_lines(clients: &[Client]) -> Vec<String> {
    clients
        .iter()
        .map(|client| {
            let contact = client.contact_person.as_deref().unwrap_or("-");
            format!(
                "{:<13}  {:<30}  {:<12}  {contact}",
                short_id(client.id.as_str()),
                truncate(&client.name, 30),
                client.region
            )
        })
        .collect()
}

pub fn format_product_lines(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .map(|product| {
            let stock = if product.in_stock { "" } else { "  (out of stock)" };
            format!(
                "{:<13}  {:<12}  {:<30}  {:>9.2}{stock}",
                short_id(product.id.as_str()),
                product.sku,
                truncate(&product.name, 30),
                product.unit_price
            )
        })
        .collect()
}

pub fn format_reason_lines(reasons: &[StockDiscountReason]) -> Vec<String> {
    reasons
        .iter()
        .map(|reason| {
            format!(
                "{:<13}  up to {:>5.1}%  {}",
                short_id(reason.id.as_str()),
                reason.max_discount_percentage,
                truncate(&reason.reason, 40)
            )
        })
        .collect()
}

pub fn format_task_lines(tasks: &[RepTask]) -> Vec<String> {
    tasks
        .iter()
        .map(|task| {
            let status = serde_json::to_value(task.status)
                .ok()
                .and_then(|value| value.as_str().map(str::to_string))
                .unwrap_or_default();
            let due = task
                .due_date
                .map_or_else(|| "-".to_string(), |date| date.to_string());
            format!(
                "{:<13}  {status:<11}  {due:<10}  {}",
                short_id(task.id.as_str()),
                truncate(&task.title, 40)
            )
        })
        .collect()
}

pub fn short_id(id: &str) -> String {
    id.chars().take(13).collect()
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let mut truncated = collapsed
            .chars()
            .take(max_chars.saturating_sub(3))
            .collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_sync_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else {
        format!("{}d ago", diff / day)
    }
}

pub fn normalize_identifier(value: &str, what: &'static str) -> Result<RecordId, CliError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyArgument(what))
    } else {
        Ok(RecordId::from(trimmed))
    }
}

pub fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|notes| notes.trim().to_string())
        .filter(|notes| !notes.is_empty())
}

/// Parse `PRODUCT_ID:QUANTITY`.
pub fn parse_order_line(raw: &str) -> Result<(RecordId, u32), CliError> {
    let invalid = || CliError::InvalidOrderLine(raw.to_string());
    let (product, quantity) = raw.rsplit_once(':').ok_or_else(invalid)?;
    let product = product.trim();
    let quantity = quantity.trim().parse::<u32>().map_err(|_| invalid())?;
    if product.is_empty() || quantity == 0 {
        return Err(invalid());
    }
    Ok((RecordId::from(product), quantity))
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(path) = cli_db_path.or_else(|| env::var_os("FIELDREP_DB_PATH").map(PathBuf::from))
    {
        return Ok(path);
    }
    default_db_path()
}

pub fn default_db_path() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join("fieldrep").join("fieldrep.db"))
        .ok_or(CliError::NoDataDir)
}

pub async fn open_service(path: &Path) -> Result<FieldDataService, CliError> {
    Ok(FieldDataService::open_path(path).await?)
}

/// Coordinator for one CLI invocation. The CLI has no platform reachability
/// signal, so the network is assumed reachable and failures surface per entry.
pub async fn open_coordinator(path: &Path) -> Result<(SyncCoordinator, EngineConfig), CliError> {
    let config = EngineConfig::from_env()?;
    let Some(gateway) = PostgrestGateway::from_config(&config)? else {
        return Err(CliError::SyncNotConfigured);
    };

    let store = open_service(path).await?;
    let coordinator = SyncCoordinator::new(
        store,
        Arc::new(gateway),
        ConnectivityMonitor::new(true),
        config.sync_interval(),
    );
    Ok((coordinator, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldrep_core::models::Operation;
    use fieldrep_core::Table;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_order_line_accepts_product_and_quantity() {
        let (product, quantity) = parse_order_line(" sku-1 : 3 ").unwrap();
        assert_eq!(product, RecordId::from("sku-1"));
        assert_eq!(quantity, 3);
    }

    #[test]
    fn parse_order_line_rejects_bad_input() {
        for raw in ["sku-1", "sku-1:", ":3", "sku-1:0", "sku-1:-2", "sku-1:two"] {
            assert!(
                matches!(parse_order_line(raw), Err(CliError::InvalidOrderLine(_))),
                "accepted {raw}"
            );
        }
    }

    #[test]
    fn normalize_identifier_rejects_blank() {
        assert!(matches!(
            normalize_identifier("  ", "Visit ID"),
            Err(CliError::EmptyArgument("Visit ID"))
        ));
        assert_eq!(
            normalize_identifier(" v-1 ", "Visit ID").unwrap(),
            RecordId::from("v-1")
        );
    }

    #[test]
    fn normalize_notes_drops_blank() {
        assert_eq!(normalize_notes(Some("  ".to_string())), None);
        assert_eq!(
            normalize_notes(Some(" ok ".to_string())),
            Some("ok".to_string())
        );
    }

    #[test]
    fn truncate_collapses_and_shortens() {
        assert_eq!(truncate("Acme   Stores", 30), "Acme Stores");
        assert_eq!(truncate("abcdefghij", 6), "abc...");
    }

    #[test]
    fn format_relative_time_units() {
        let now = 10_000_000;
        assert_eq!(format_relative_time(now - 30_000, now), "just now");
        assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
        assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
        assert_eq!(format_relative_time(now - 3 * 24 * 60 * 60_000, now), "3d ago");
    }

    #[test]
    fn format_sync_timestamp_renders_utc() {
        assert_eq!(format_sync_timestamp(0), "1970-01-01 00:00:00 UTC");
    }

    #[test]
    fn queue_item_and_line_show_retries() {
        let mut entry = SyncQueueEntry::new(
            Table::Visits,
            RecordId::from("visit-1"),
            Operation::Insert,
            serde_json::json!({ "id": "visit-1" }),
        );
        entry.retry_count = 2;

        let item = queue_entry_to_item(&entry);
        assert_eq!(item.table, "visits");
        assert_eq!(item.operation, "insert");

        let lines = format_queue_lines(&[entry]);
        assert!(lines[0].starts_with("insert  visits"));
        assert!(lines[0].ends_with("retries=2"));
    }

    #[test]
    fn reason_line_shows_ceiling() {
        let lines = format_reason_lines(&[StockDiscountReason {
            id: RecordId::from("loyalty"),
            reason: "Loyal customer".to_string(),
            max_discount_percentage: 12.5,
            created_at: Utc::now(),
        }]);
        assert_eq!(lines, vec!["loyalty        up to  12.5%  Loyal customer"]);
    }

    #[test]
    fn explicit_db_path_wins() {
        let path = resolve_db_path(Some(PathBuf::from("/tmp/x.db"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/x.db"));
    }
}
