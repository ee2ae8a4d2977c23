//! Data models for Fieldrep

mod client;
mod discount_reason;
mod id;
mod order;
mod product;
mod record;
mod sync_queue;
mod table;
mod task;
mod visit;

pub use client::Client;
pub use discount_reason::StockDiscountReason;
pub use id::RecordId;
pub use order::{Order, OrderItem};
pub use product::Product;
pub use record::{LocalRecord, Record, SyncStatus};
pub use sync_queue::{EntryId, Operation, SyncQueueEntry};
pub use table::Table;
pub use task::{RepTask, TaskStatus, TaskType, TaskUpdate};
pub use visit::{Visit, VisitOutcome};
