//! Field data service: the replica surface used by UI consumers and the
//! sync coordinator.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use rusqlite::{params, Connection};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::db::{
    Database, MetaRepository, Query, RecordRepository, SqliteMetaRepository,
    SqliteRecordRepository, SqliteSyncQueueRepository, SyncQueueRepository,
};
use crate::models::{
    Client, LocalRecord, Operation, Order, OrderItem, Product, Record, RecordId, RepTask,
    StockDiscountReason, SyncQueueEntry, SyncStatus, Table, TaskType, TaskUpdate, Visit,
};
use crate::{Error, Result};

/// Counters shown on the representative's home screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub visits_today: usize,
    pub orders_placed: usize,
    pub open_tasks: usize,
    pub pending_sync: usize,
}

/// Thread-safe handle to the local replica.
///
/// Every pending write stores the record and its queue entry in one
/// transaction. The lock is held only for the duration of a single local
/// operation, so reads are never blocked by an in-flight sync cycle.
#[derive(Clone)]
pub struct FieldDataService {
    db: Arc<Mutex<Database>>,
    db_path: Option<PathBuf>,
}

impl FieldDataService {
    /// Open the replica at the given filesystem path, creating parent directories.
    pub async fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let path = db_path.clone();
        let db = tokio::task::spawn_blocking(move || Database::open(&path))
            .await
            .map_err(|error| Error::Io(std::io::Error::other(error)))??;

        tracing::info!("Opened local replica at {}", db_path.display());
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: Some(db_path),
        })
    }

    /// Open an in-memory replica (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: None,
        })
    }

    /// File backing this replica, `None` when in memory.
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    // ------------------------------------------------------------------
    // Generic store operations
    // ------------------------------------------------------------------

    /// Fetch a record by id.
    pub async fn get<T: Record>(&self, id: &RecordId) -> Result<Option<T>> {
        let db = self.db.lock().await;
        SqliteRecordRepository::new(db.connection()).get(id)
    }

    /// Records matching an index query.
    pub async fn query<T: Record>(&self, query: &Query) -> Result<Vec<T>> {
        let db = self.db.lock().await;
        SqliteRecordRepository::new(db.connection()).query(query)
    }

    /// Store a local edit to a locally originated record.
    ///
    /// The stored copy is stamped pending and exactly one queue entry carrying
    /// its full snapshot is appended in the same transaction, whatever status
    /// the caller's copy held. Returns that entry.
    pub async fn save_local<T: LocalRecord>(
        &self,
        record: &T,
        operation: Operation,
    ) -> Result<SyncQueueEntry> {
        if operation == Operation::Delete {
            return Err(Error::InvalidInput(
                "use delete_local to queue a delete".to_string(),
            ));
        }

        let mut db = self.db.lock().await;
        db.transaction(|conn| put_local(conn, record, operation))
    }

    /// Remove a locally originated record and queue its remote delete, using
    /// the last stored snapshot as payload. `None` when the record is unknown.
    pub async fn delete_local<T: LocalRecord>(
        &self,
        id: &RecordId,
    ) -> Result<Option<SyncQueueEntry>> {
        let mut db = self.db.lock().await;
        db.transaction(|conn| {
            let records = SqliteRecordRepository::new(conn);
            let Some(snapshot) = records.get_raw(T::TABLE, id)? else {
                return Ok(None);
            };
            records.delete(T::TABLE, id)?;
            SqliteSyncQueueRepository::new(conn)
                .enqueue(T::TABLE, id, Operation::Delete, &snapshot)
                .map(Some)
        })
    }

    /// Store locally originated records the remote authority already holds,
    /// stamped synced and without queue entries. Records with outstanding
    /// queue entries keep their local copy. Returns how many were stored.
    pub async fn seed_synced<T: LocalRecord>(&self, records: &[T]) -> Result<usize> {
        let rows = records
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut db = self.db.lock().await;
        db.transaction(|conn| put_synced_rows(conn, T::TABLE, &rows))
    }

    /// Store reference records wholesale. They never enter the sync queue.
    pub async fn save_reference<T: Record>(&self, records: &[T]) -> Result<usize> {
        if T::TABLE.is_locally_originated() {
            return Err(Error::InvalidInput(format!(
                "{} records must be saved through the sync queue",
                T::TABLE
            )));
        }

        let db = self.db.lock().await;
        SqliteRecordRepository::new(db.connection()).bulk_put(records)
    }

    // ------------------------------------------------------------------
    // Reference data
    // ------------------------------------------------------------------

    /// Save one client.
    pub async fn save_client(&self, client: &Client) -> Result<()> {
        self.save_reference(std::slice::from_ref(client)).await?;
        Ok(())
    }

    /// Save many clients.
    pub async fn save_clients(&self, clients: &[Client]) -> Result<usize> {
        self.save_reference(clients).await
    }

    /// Save the product catalog.
    pub async fn save_products(&self, products: &[Product]) -> Result<usize> {
        self.save_reference(products).await
    }

    /// Clients ordered by name, optionally limited to one region.
    pub async fn clients(&self, region: Option<&str>) -> Result<Vec<Client>> {
        let query = region.map_or_else(Query::all, |region| Query::eq("region", region));
        self.query(&query.order_by("name")).await
    }

    /// Clients whose name or contact person contains `term`, ignoring case.
    pub async fn search_clients(&self, term: &str) -> Result<Vec<Client>> {
        let clients = self.clients(None).await?;
        Ok(clients
            .into_iter()
            .filter(|client| client.matches_search(term))
            .collect())
    }

    /// Product catalog ordered by name.
    pub async fn products(&self) -> Result<Vec<Product>> {
        self.query(&Query::all().order_by("name")).await
    }

    /// Task types ordered by name.
    pub async fn task_types(&self) -> Result<Vec<TaskType>> {
        self.query(&Query::all().order_by("name")).await
    }

    /// Discount reasons ordered by label.
    pub async fn discount_reasons(&self) -> Result<Vec<StockDiscountReason>> {
        self.query(&Query::all().order_by("reason")).await
    }

    // ------------------------------------------------------------------
    // Locally originated data
    // ------------------------------------------------------------------

    /// Log a visit and queue its insert.
    pub async fn save_visit(&self, visit: &Visit) -> Result<SyncQueueEntry> {
        self.save_local(visit, Operation::Insert).await
    }

    /// Discard a visit locally and queue its remote delete.
    pub async fn delete_visit(&self, id: &RecordId) -> Result<Option<SyncQueueEntry>> {
        self.delete_local::<Visit>(id).await
    }

    /// A representative's visits, newest first.
    pub async fn visits_for_rep(&self, rep_id: &RecordId) -> Result<Vec<Visit>> {
        let mut visits: Vec<Visit> = self.query(&Query::eq("rep_id", rep_id)).await?;
        visits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(visits)
    }

    /// Store an order and its lines in one transaction.
    ///
    /// Both are stamped pending. The order is queued first, then each line,
    /// so the remote receives the parent before its children.
    pub async fn save_order(
        &self,
        order: &Order,
        items: &[OrderItem],
    ) -> Result<Vec<SyncQueueEntry>> {
        if let Some(stray) = items.iter().find(|item| item.order_id != order.id) {
            return Err(Error::InvalidInput(format!(
                "order item {} belongs to order {}, not {}",
                stray.id, stray.order_id, order.id
            )));
        }

        let mut db = self.db.lock().await;
        db.transaction(|conn| {
            let mut entries = Vec::with_capacity(items.len() + 1);
            entries.push(put_local(conn, order, Operation::Insert)?);
            for item in items {
                entries.push(put_local(conn, item, Operation::Insert)?);
            }
            Ok(entries)
        })
    }

    /// Lines of one order.
    pub async fn order_items(&self, order_id: &RecordId) -> Result<Vec<OrderItem>> {
        self.query(&Query::eq("order_id", order_id)).await
    }

    /// Merge `update` into a task, mark it pending and queue an update.
    /// `None` when no such task exists locally.
    pub async fn update_task(
        &self,
        task_id: &RecordId,
        update: TaskUpdate,
    ) -> Result<Option<RepTask>> {
        let mut db = self.db.lock().await;
        db.transaction(|conn| {
            let Some(mut task) = SqliteRecordRepository::new(conn).get::<RepTask>(task_id)? else {
                return Ok(None);
            };
            task.apply(update);
            task.set_sync_status(SyncStatus::Pending);
            put_local(conn, &task, Operation::Update)?;
            Ok(Some(task))
        })
    }

    /// Tasks assigned to a representative.
    pub async fn tasks_for_rep(&self, rep_id: &RecordId) -> Result<Vec<RepTask>> {
        self.query(&Query::eq("rep_id", rep_id)).await
    }

    // ------------------------------------------------------------------
    // Sync visibility
    // ------------------------------------------------------------------

    /// Number of mutations waiting to sync.
    pub async fn pending_count(&self) -> Result<usize> {
        let db = self.db.lock().await;
        SqliteSyncQueueRepository::new(db.connection()).count()
    }

    /// Read-only view of the queue, oldest first.
    pub async fn sync_queue(&self) -> Result<Vec<SyncQueueEntry>> {
        let db = self.db.lock().await;
        SqliteSyncQueueRepository::new(db.connection()).list()
    }

    /// When every reference collection was last refreshed (Unix ms).
    pub async fn last_full_pull_at(&self) -> Result<Option<i64>> {
        let db = self.db.lock().await;
        SqliteMetaRepository::new(db.connection()).last_full_pull_at()
    }

    /// Home screen counters for one representative.
    pub async fn dashboard_stats(&self, rep_id: &RecordId) -> Result<DashboardStats> {
        let today = Utc::now().date_naive();
        let db = self.db.lock().await;
        let records = SqliteRecordRepository::new(db.connection());

        let visits_today = records
            .query::<Visit>(&Query::eq("rep_id", rep_id))?
            .iter()
            .filter(|visit| visit.created_at.date_naive() == today)
            .count();
        let orders_placed = records.count(Table::Orders, &Query::eq("rep_id", rep_id))?;
        let open_tasks = records
            .query::<RepTask>(&Query::eq("rep_id", rep_id))?
            .iter()
            .filter(|task| task.is_open())
            .count();
        let pending_sync = SqliteSyncQueueRepository::new(db.connection()).count()?;

        Ok(DashboardStats {
            visits_today,
            orders_placed,
            open_tasks,
            pending_sync,
        })
    }

    // ------------------------------------------------------------------
    // Coordinator hooks
    // ------------------------------------------------------------------

    /// The queue as of now; entries added later belong to the next cycle.
    pub(crate) async fn queue_snapshot(&self) -> Result<Vec<SyncQueueEntry>> {
        self.sync_queue().await
    }

    /// Drop a confirmed entry. When it was the record's last outstanding
    /// mutation, the local row (if any) is stamped synced in the same
    /// transaction.
    pub(crate) async fn confirm_entry(&self, entry: &SyncQueueEntry) -> Result<()> {
        let mut db = self.db.lock().await;
        db.transaction(|conn| {
            let queue = SqliteSyncQueueRepository::new(conn);
            queue.remove(&entry.id)?;
            if entry.table_name.is_locally_originated()
                && queue.count_for_record(entry.table_name, &entry.record_id)? == 0
            {
                stamp_sync_status(conn, entry.table_name, &entry.record_id, SyncStatus::Synced)?;
            }
            Ok(())
        })
    }

    /// Count a failed attempt on the entry and flag the local row as failed.
    pub(crate) async fn record_failure(&self, entry: &SyncQueueEntry) -> Result<()> {
        let mut db = self.db.lock().await;
        db.transaction(|conn| {
            SqliteSyncQueueRepository::new(conn).mark_failed(&entry.id)?;
            if entry.table_name.is_locally_originated() {
                stamp_sync_status(conn, entry.table_name, &entry.record_id, SyncStatus::Failed)?;
            }
            Ok(())
        })
    }

    /// Overwrite local copies of a reference collection with remote rows.
    pub(crate) async fn apply_pull(&self, table: Table, rows: &[Value]) -> Result<usize> {
        let db = self.db.lock().await;
        SqliteRecordRepository::new(db.connection()).bulk_put_raw(table, rows)
    }

    /// Store a representative's tasks as fetched from the remote authority.
    /// Tasks with unsynced local edits are left untouched.
    pub(crate) async fn apply_task_refresh(&self, rows: &[Value]) -> Result<usize> {
        let mut db = self.db.lock().await;
        db.transaction(|conn| put_synced_rows(conn, Table::RepTasks, rows))
    }

    pub(crate) async fn set_last_full_pull_at(&self, timestamp: i64) -> Result<()> {
        let db = self.db.lock().await;
        SqliteMetaRepository::new(db.connection()).set_last_full_pull_at(timestamp)
    }
}

/// Put a local record stamped pending and append its queue entry.
fn put_local<T: LocalRecord>(
    conn: &Connection,
    record: &T,
    operation: Operation,
) -> Result<SyncQueueEntry> {
    let mut record = record.clone();
    record.set_sync_status(SyncStatus::Pending);
    SqliteRecordRepository::new(conn).put(&record)?;

    let payload = serde_json::to_value(&record)?;
    SqliteSyncQueueRepository::new(conn).enqueue(T::TABLE, record.id(), operation, &payload)
}

/// Put authority-held rows stamped synced, skipping records that still have
/// queue entries.
fn put_synced_rows(conn: &Connection, table: Table, rows: &[Value]) -> Result<usize> {
    let records = SqliteRecordRepository::new(conn);
    let queue = SqliteSyncQueueRepository::new(conn);

    let mut stored = 0;
    for row in rows {
        let Some(id) = row.get("id").and_then(Value::as_str) else {
            return Err(Error::InvalidInput(format!("{table} row without id")));
        };
        if queue.count_for_record(table, &RecordId::from(id))? > 0 {
            tracing::debug!("Keeping local {}/{} with unsynced edits", table, id);
            continue;
        }

        let mut row = row.clone();
        if let Some(fields) = row.as_object_mut() {
            fields.insert(
                "sync_status".to_string(),
                Value::from(SyncStatus::Synced.as_str()),
            );
        }
        records.put_raw(table, &row)?;
        stored += 1;
    }
    Ok(stored)
}

fn stamp_sync_status(
    conn: &Connection,
    table: Table,
    id: &RecordId,
    status: SyncStatus,
) -> Result<()> {
    conn.execute(
        &format!("UPDATE {table} SET data = json_set(data, '$.sync_status', ?) WHERE id = ?"),
        params![status.as_str(), id.as_str()],
    )?;
    Ok(())
}
