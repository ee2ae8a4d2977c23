//! Traits shared by every stored entity

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{RecordId, Table};

/// Whether the remote authority has confirmed a locally originated record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Written locally, waiting in the sync queue
    #[default]
    Pending,
    /// Accepted by the remote authority
    Synced,
    /// Last push attempt was refused; still queued for retry
    Failed,
}

impl SyncStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Synced => "synced",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entity stored in one of the replica's tables.
pub trait Record: Serialize + DeserializeOwned {
    /// Table holding this entity kind
    const TABLE: Table;

    /// Primary key
    fn id(&self) -> &RecordId;
}

/// A record created on the client whose changes travel through the sync queue.
pub trait LocalRecord: Record + Clone {
    fn sync_status(&self) -> SyncStatus;

    fn set_sync_status(&mut self, status: SyncStatus);
}

/// Implement [`Record`] (and optionally [`LocalRecord`]) for a model with
/// `id` and `sync_status` fields.
macro_rules! impl_record {
    ($model:ty, $table:expr) => {
        impl $crate::models::Record for $model {
            const TABLE: $crate::models::Table = $table;

            fn id(&self) -> &$crate::models::RecordId {
                &self.id
            }
        }
    };
    ($model:ty, $table:expr, local) => {
        impl_record!($model, $table);

        impl $crate::models::LocalRecord for $model {
            fn sync_status(&self) -> $crate::models::SyncStatus {
                self.sync_status
            }

            fn set_sync_status(&mut self, status: $crate::models::SyncStatus) {
                self.sync_status = status;
            }
        }
    };
}

pub(crate) use impl_record;
