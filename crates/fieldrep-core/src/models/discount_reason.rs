//! Stock discount reason model (reference data)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::impl_record;
use super::{RecordId, Table};

/// An approved reason for discounting an order, with its ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockDiscountReason {
    pub id: RecordId,
    pub reason: String,
    pub max_discount_percentage: f64,
    pub created_at: DateTime<Utc>,
}

impl_record!(StockDiscountReason, Table::StockDiscountReasons);

impl StockDiscountReason {
    /// Whether `percentage` is within the ceiling for this reason.
    #[must_use]
    pub fn allows(&self, percentage: f64) -> bool {
        (0.0..=self.max_discount_percentage).contains(&percentage)
    }
}
