//! fieldrep-core - Core library for Fieldrep
//!
//! This crate contains the offline replica and synchronization engine used by
//! Fieldrep clients: the entity models, the local replica store and sync queue
//! log (both backed by one `SQLite` file), the connectivity monitor, and the
//! sync coordinator that reconciles the replica with the remote authority.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{Operation, RecordId, SyncQueueEntry, SyncStatus, Table};
