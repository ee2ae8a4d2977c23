//! Contract with the remote authority.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::models::{RecordId, Table};

/// Failure reported by a [`RemoteGateway`].
///
/// The coordinator treats every variant as a plain failure of the entry or
/// collection at hand.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid gateway configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Remote unavailable: {0}")]
    Unavailable(String),
    #[error("Remote rejected request: {0}")]
    Rejected(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Equality filter applied remotely by [`RemoteGateway::fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFilter {
    pub column: String,
    pub value: String,
}

impl FetchFilter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Remote authority operations the sync engine depends on.
///
/// `upsert` must be idempotent by primary key: retries replay the same payload.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Insert or update `record` by its `id`, returning the stored copy.
    async fn upsert(&self, table: Table, record: &Value) -> GatewayResult<Value>;

    /// Current authoritative rows of `table`.
    async fn fetch(&self, table: Table, filter: Option<&FetchFilter>) -> GatewayResult<Vec<Value>>;

    /// Delete the row with `record_id`.
    async fn delete(&self, table: Table, record_id: &RecordId) -> GatewayResult<()>;
}
