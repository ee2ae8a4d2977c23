//! Sync queue log: durable record of mutations not yet confirmed remotely

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Error, Result};
use crate::models::{EntryId, Operation, RecordId, SyncQueueEntry, Table};
use crate::util::unix_millis_now;

const ENTRY_COLUMNS: &str =
    "id, table_name, record_id, operation, payload, retry_count, last_attempt, created_at";

/// Trait for sync queue operations
pub trait SyncQueueRepository {
    /// Append a new entry. Never merges with existing entries for the same record.
    fn enqueue(
        &self,
        table: Table,
        record_id: &RecordId,
        operation: Operation,
        payload: &serde_json::Value,
    ) -> Result<SyncQueueEntry>;

    /// All entries, oldest first
    fn list(&self) -> Result<Vec<SyncQueueEntry>>;

    /// Get an entry by id
    fn get(&self, id: &EntryId) -> Result<Option<SyncQueueEntry>>;

    /// Delete a confirmed entry, returning whether it existed
    fn remove(&self, id: &EntryId) -> Result<bool>;

    /// Record a failed remote attempt: bump `retry_count`, stamp `last_attempt`
    fn mark_failed(&self, id: &EntryId) -> Result<bool>;

    /// Number of entries waiting
    fn count(&self) -> Result<usize>;

    /// Number of entries waiting for one record
    fn count_for_record(&self, table: Table, record_id: &RecordId) -> Result<usize>;
}

/// `SQLite` implementation of `SyncQueueRepository`
pub struct SqliteSyncQueueRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteSyncQueueRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse an entry from a database row
    fn parse_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEntry> {
        Ok(RawEntry {
            id: row.get(0)?,
            table_name: row.get(1)?,
            record_id: row.get(2)?,
            operation: row.get(3)?,
            payload: row.get(4)?,
            retry_count: row.get(5)?,
            last_attempt: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

/// Row as stored, before the typed fields are validated
struct RawEntry {
    id: String,
    table_name: String,
    record_id: String,
    operation: String,
    payload: String,
    retry_count: u32,
    last_attempt: Option<i64>,
    created_at: i64,
}

impl TryFrom<RawEntry> for SyncQueueEntry {
    type Error = Error;

    fn try_from(raw: RawEntry) -> Result<Self> {
        Ok(Self {
            id: raw
                .id
                .parse()
                .map_err(|_| Error::InvalidInput(format!("Invalid queue entry id: {}", raw.id)))?,
            table_name: raw.table_name.parse()?,
            record_id: RecordId::from(raw.record_id),
            operation: raw.operation.parse()?,
            payload: serde_json::from_str(&raw.payload)?,
            retry_count: raw.retry_count,
            last_attempt: raw.last_attempt,
            created_at: raw.created_at,
        })
    }
}

impl SyncQueueRepository for SqliteSyncQueueRepository<'_> {
    fn enqueue(
        &self,
        table: Table,
        record_id: &RecordId,
        operation: Operation,
        payload: &serde_json::Value,
    ) -> Result<SyncQueueEntry> {
        let entry = SyncQueueEntry::new(table, record_id.clone(), operation, payload.clone());

        self.conn.execute(
            "INSERT INTO sync_queue (id, table_name, record_id, operation, payload, retry_count, last_attempt, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                entry.id.as_str(),
                entry.table_name.name(),
                entry.record_id.as_str(),
                entry.operation.as_str(),
                serde_json::to_string(&entry.payload)?,
                entry.retry_count,
                entry.last_attempt,
                entry.created_at
            ],
        )?;

        tracing::debug!(
            "Enqueued {} on {}/{} as {}",
            entry.operation,
            entry.table_name,
            entry.record_id,
            entry.id
        );
        Ok(entry)
    }

    fn list(&self) -> Result<Vec<SyncQueueEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM sync_queue ORDER BY created_at ASC, seq ASC"
        ))?;

        let raw = stmt
            .query_map([], Self::parse_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        raw.into_iter().map(SyncQueueEntry::try_from).collect()
    }

    fn get(&self, id: &EntryId) -> Result<Option<SyncQueueEntry>> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {ENTRY_COLUMNS} FROM sync_queue WHERE id = ?"),
                params![id.as_str()],
                Self::parse_entry,
            )
            .optional()?;

        raw.map(SyncQueueEntry::try_from).transpose()
    }

    fn remove(&self, id: &EntryId) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM sync_queue WHERE id = ?", params![id.as_str()])?;
        Ok(rows > 0)
    }

    fn mark_failed(&self, id: &EntryId) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE sync_queue SET retry_count = retry_count + 1, last_attempt = ? WHERE id = ?",
            params![unix_millis_now(), id.as_str()],
        )?;
        Ok(rows > 0)
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sync_queue", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn count_for_record(&self, table: Table, record_id: &RecordId) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sync_queue WHERE table_name = ? AND record_id = ?",
            params![table.name(), record_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}
