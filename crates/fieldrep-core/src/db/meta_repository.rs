//! Process-wide metadata kept outside the entity tables

use crate::error::{Error, Result};
use rusqlite::{params, Connection, OptionalExtension};

const LAST_FULL_PULL_AT: &str = "last_full_pull_at";

/// Trait for metadata storage operations
pub trait MetaRepository {
    /// When every reference collection was last refreshed (Unix ms)
    fn last_full_pull_at(&self) -> Result<Option<i64>>;

    /// Record a successful full pull
    fn set_last_full_pull_at(&self, timestamp: i64) -> Result<()>;
}

/// `SQLite` implementation of `MetaRepository`
pub struct SqliteMetaRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteMetaRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn get_value(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row("SELECT value FROM meta WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?)
    }

    fn set_value(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES (?, ?)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl MetaRepository for SqliteMetaRepository<'_> {
    fn last_full_pull_at(&self) -> Result<Option<i64>> {
        self.get_value(LAST_FULL_PULL_AT)?
            .map(|value| {
                value.parse().map_err(|_| {
                    Error::InvalidInput(format!("Invalid {LAST_FULL_PULL_AT} value: {value}"))
                })
            })
            .transpose()
    }

    fn set_last_full_pull_at(&self, timestamp: i64) -> Result<()> {
        self.set_value(LAST_FULL_PULL_AT, &timestamp.to_string())
    }
}
