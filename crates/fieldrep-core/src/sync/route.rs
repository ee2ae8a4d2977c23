//! Mapping from queued mutations to remote calls.

use crate::models::{Operation, Table};

/// Remote call that replays a queued mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushRoute {
    /// `RemoteGateway::upsert` with the entry payload
    Upsert,
    /// `RemoteGateway::delete` with the entry's record id
    Delete,
    /// No push handler: the collection is owned by the remote authority
    Unsupported,
}

impl PushRoute {
    /// Handler for a `table x operation` pair.
    ///
    /// Adding a [`Table`] or [`Operation`] variant fails to compile until it is
    /// routed here.
    pub const fn for_entry(table: Table, operation: Operation) -> Self {
        match (table, operation) {
            (
                Table::Visits | Table::Orders | Table::OrderItems | Table::RepTasks,
                Operation::Insert | Operation::Update,
            ) => Self::Upsert,
            (
                Table::Visits | Table::Orders | Table::OrderItems | Table::RepTasks,
                Operation::Delete,
            ) => Self::Delete,
            (
                Table::Clients | Table::Products | Table::TaskTypes | Table::StockDiscountReasons,
                Operation::Insert | Operation::Update | Operation::Delete,
            ) => Self::Unsupported,
        }
    }
}
