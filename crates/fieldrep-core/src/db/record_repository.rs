//! Local replica store: per-table record storage keyed by id

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde_json::Value;

use super::query::Query;
use crate::error::{Error, Result};
use crate::models::{Record, RecordId, Table};
use crate::util::unix_millis_now;

/// Trait for record storage operations
pub trait RecordRepository {
    /// Insert or replace a record by id
    fn put<T: Record>(&self, record: &T) -> Result<()>;

    /// Insert or replace many records atomically, returning how many were written
    fn bulk_put<T: Record>(&self, records: &[T]) -> Result<usize>;

    /// Get a record by id
    fn get<T: Record>(&self, id: &RecordId) -> Result<Option<T>>;

    /// Records matching an index query; an empty result is not an error
    fn query<T: Record>(&self, query: &Query) -> Result<Vec<T>>;

    /// Count records matching an index query
    fn count(&self, table: Table, query: &Query) -> Result<usize>;

    /// Remove a record, returning whether it existed
    fn delete(&self, table: Table, id: &RecordId) -> Result<bool>;

    /// Insert or replace an untyped row; the row must carry a string `id`
    fn put_raw(&self, table: Table, row: &Value) -> Result<()>;

    /// Insert or replace many untyped rows atomically
    fn bulk_put_raw(&self, table: Table, rows: &[Value]) -> Result<usize>;

    /// Get an untyped row by id
    fn get_raw(&self, table: Table, id: &RecordId) -> Result<Option<Value>>;
}

/// `SQLite` implementation of `RecordRepository`
pub struct SqliteRecordRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteRecordRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn upsert_row(&self, table: Table, id: &str, data: &str) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO {table} (id, data, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at"
            ),
            params![id, data, unix_millis_now()],
        )?;
        Ok(())
    }

    /// Run `f` inside a savepoint so a batch lands entirely or not at all,
    /// whether or not the caller already opened a transaction.
    fn in_savepoint<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        self.conn.execute_batch("SAVEPOINT bulk_put")?;
        match f() {
            Ok(value) => {
                self.conn.execute_batch("RELEASE bulk_put")?;
                Ok(value)
            }
            Err(error) => {
                self.conn
                    .execute_batch("ROLLBACK TO bulk_put; RELEASE bulk_put")
                    .ok();
                Err(error)
            }
        }
    }

    fn select_data(&self, table: Table, query: &Query) -> Result<Vec<String>> {
        let (tail, params) = query.to_sql_tail(table)?;
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT data FROM {table}{tail}"))?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

fn row_id(table: Table, row: &Value) -> Result<&str> {
    row.get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| Error::InvalidInput(format!("Row for {table} has no string id")))
}

impl RecordRepository for SqliteRecordRepository<'_> {
    fn put<T: Record>(&self, record: &T) -> Result<()> {
        let data = serde_json::to_string(record)?;
        self.upsert_row(T::TABLE, record.id().as_str(), &data)
    }

    fn bulk_put<T: Record>(&self, records: &[T]) -> Result<usize> {
        self.in_savepoint(|| {
            for record in records {
                self.put(record)?;
            }
            Ok(records.len())
        })
    }

    fn get<T: Record>(&self, id: &RecordId) -> Result<Option<T>> {
        let data: Option<String> = self
            .conn
            .query_row(
                &format!("SELECT data FROM {} WHERE id = ?", T::TABLE),
                params![id.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        data.map(|data| serde_json::from_str(&data).map_err(Error::from))
            .transpose()
    }

    fn query<T: Record>(&self, query: &Query) -> Result<Vec<T>> {
        self.select_data(T::TABLE, query)?
            .iter()
            .map(|data| serde_json::from_str(data).map_err(Error::from))
            .collect()
    }

    fn count(&self, table: Table, query: &Query) -> Result<usize> {
        let (tail, params) = query.to_sql_tail(table)?;
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM (SELECT id FROM {table}{tail})"),
            params_from_iter(params.iter()),
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn delete(&self, table: Table, id: &RecordId) -> Result<bool> {
        let rows = self.conn.execute(
            &format!("DELETE FROM {table} WHERE id = ?"),
            params![id.as_str()],
        )?;
        Ok(rows > 0)
    }

    fn put_raw(&self, table: Table, row: &Value) -> Result<()> {
        let id = row_id(table, row)?;
        let data = serde_json::to_string(row)?;
        self.upsert_row(table, id, &data)
    }

    fn bulk_put_raw(&self, table: Table, rows: &[Value]) -> Result<usize> {
        self.in_savepoint(|| {
            for row in rows {
                self.put_raw(table, row)?;
            }
            Ok(rows.len())
        })
    }

    fn get_raw(&self, table: Table, id: &RecordId) -> Result<Option<Value>> {
        let data: Option<String> = self
            .conn
            .query_row(
                &format!("SELECT data FROM {table} WHERE id = ?"),
                params![id.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        data.map(|data| serde_json::from_str(&data).map_err(Error::from))
            .transpose()
    }
}
