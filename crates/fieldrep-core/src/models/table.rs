//! Entity collections kept in the local replica

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One entity collection, stored locally as one table and addressed remotely
/// by the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Clients,
    Products,
    Visits,
    Orders,
    OrderItems,
    RepTasks,
    TaskTypes,
    StockDiscountReasons,
}

impl Table {
    /// Every collection, in migration order.
    pub const ALL: [Self; 8] = [
        Self::Clients,
        Self::Products,
        Self::Visits,
        Self::Orders,
        Self::OrderItems,
        Self::RepTasks,
        Self::TaskTypes,
        Self::StockDiscountReasons,
    ];

    /// Read-mostly collections refreshed wholesale by the pull phase.
    pub const REFERENCE: [Self; 4] = [
        Self::Clients,
        Self::Products,
        Self::TaskTypes,
        Self::StockDiscountReasons,
    ];

    /// Table name, shared by the local schema and the remote API.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Products => "products",
            Self::Visits => "visits",
            Self::Orders => "orders",
            Self::OrderItems => "order_items",
            Self::RepTasks => "rep_tasks",
            Self::TaskTypes => "task_types",
            Self::StockDiscountReasons => "stock_discount_reasons",
        }
    }

    /// Whether records of this collection originate on the client and reach
    /// the authority only through the sync queue.
    pub const fn is_locally_originated(self) -> bool {
        match self {
            Self::Visits | Self::Orders | Self::OrderItems | Self::RepTasks => true,
            Self::Clients | Self::Products | Self::TaskTypes | Self::StockDiscountReasons => false,
        }
    }

    /// Payload fields that carry a local index and may be used in queries.
    pub const fn indexed_fields(self) -> &'static [&'static str] {
        match self {
            Self::Clients => &["name", "region"],
            Self::Products => &["name", "sku", "category"],
            Self::Visits => &["rep_id", "client_id", "check_in_time", "sync_status"],
            Self::Orders => &["rep_id", "client_id", "visit_id", "sync_status", "created_at"],
            Self::OrderItems => &["order_id", "product_id", "sync_status"],
            Self::RepTasks => &["rep_id", "task_type_id", "status", "due_date", "sync_status"],
            Self::TaskTypes => &["name"],
            Self::StockDiscountReasons => &["reason"],
        }
    }

    /// Check whether `field` is declared as indexed for this table.
    pub fn is_indexed(self, field: &str) -> bool {
        self.indexed_fields().contains(&field)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|table| table.name() == s)
            .ok_or_else(|| crate::Error::InvalidInput(format!("Unknown table: {s}")))
    }
}
