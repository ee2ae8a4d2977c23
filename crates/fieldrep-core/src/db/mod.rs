//! Database layer for Fieldrep

mod connection;
mod meta_repository;
mod migrations;
mod query;
mod queue_repository;
mod record_repository;

pub use connection::Database;
pub use meta_repository::{MetaRepository, SqliteMetaRepository};
pub use query::{Direction, FieldValue, Query};
pub use queue_repository::{SqliteSyncQueueRepository, SyncQueueRepository};
pub use record_repository::{RecordRepository, SqliteRecordRepository};
