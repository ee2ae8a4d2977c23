//! Sync queue entry model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{RecordId, Table};

/// Identifier of a queue entry, distinct from the record it describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Create a new unique entry ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Kind of mutation recorded in the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Insert,
    Update,
    Delete,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insert" => Ok(Self::Insert),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(crate::Error::InvalidInput(format!(
                "Unknown operation: {other}"
            ))),
        }
    }
}

/// One outstanding mutation awaiting confirmation by the remote authority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncQueueEntry {
    /// Entry identifier
    pub id: EntryId,
    /// Collection the mutation targets
    pub table_name: Table,
    /// Affected record
    pub record_id: RecordId,
    /// Mutation kind
    pub operation: Operation,
    /// Full record snapshot replayed remotely
    pub payload: serde_json::Value,
    /// Failed remote-apply attempts so far
    pub retry_count: u32,
    /// Most recent failed attempt (Unix ms)
    pub last_attempt: Option<i64>,
    /// Enqueue timestamp (Unix ms), the FIFO key
    pub created_at: i64,
}

impl SyncQueueEntry {
    /// Build a fresh entry stamped now
    #[must_use]
    pub fn new(
        table_name: Table,
        record_id: RecordId,
        operation: Operation,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: EntryId::new(),
            table_name,
            record_id,
            operation,
            payload,
            retry_count: 0,
            last_attempt: None,
            created_at: crate::util::unix_millis_now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_has_no_attempts() {
        let entry = SyncQueueEntry::new(
            Table::Visits,
            RecordId::from("visit-1"),
            Operation::Insert,
            serde_json::json!({ "id": "visit-1" }),
        );
        assert_eq!(entry.retry_count, 0);
        assert!(entry.last_attempt.is_none());
        assert!(entry.created_at > 0);
    }

    #[test]
    fn test_operation_parse() {
        assert_eq!("update".parse::<Operation>().unwrap(), Operation::Update);
        assert!("upsert".parse::<Operation>().is_err());
    }

    #[test]
    fn test_entry_id_parse() {
        let id = EntryId::new();
        let parsed: EntryId = id.as_str().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
