//! Order and order line models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::impl_record;
use super::{RecordId, SyncStatus, Table};

/// An order placed at a client, usually during a visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: RecordId,
    pub rep_id: RecordId,
    pub client_id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_id: Option<RecordId>,
    pub total_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_reason_id: Option<RecordId>,
    pub is_free_stock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    pub sync_status: SyncStatus,
    pub created_at: DateTime<Utc>,
}

impl_record!(Order, Table::Orders, local);

/// One product line of an [`Order`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: RecordId,
    pub order_id: RecordId,
    pub product_id: RecordId,
    pub quantity: u32,
    pub unit_price: f64,
    pub line_total: f64,
    pub sync_status: SyncStatus,
    pub created_at: DateTime<Utc>,
}

impl_record!(OrderItem, Table::OrderItems, local);

impl OrderItem {
    /// Create a pending line for `quantity` units at `unit_price`
    #[must_use]
    pub fn new(order_id: RecordId, product_id: RecordId, quantity: u32, unit_price: f64) -> Self {
        Self {
            id: RecordId::new(),
            order_id,
            product_id,
            quantity,
            unit_price,
            line_total: f64::from(quantity) * unit_price,
            sync_status: SyncStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

impl Order {
    /// Create a pending order whose total is the sum of `items`, less any
    /// discount. Free-stock orders total zero.
    #[must_use]
    pub fn new(
        rep_id: RecordId,
        client_id: RecordId,
        visit_id: Option<RecordId>,
        items: &[OrderItem],
    ) -> Self {
        Self {
            id: RecordId::new(),
            rep_id,
            client_id,
            visit_id,
            total_amount: items.iter().map(|item| item.line_total).sum(),
            discount_percentage: None,
            discount_reason_id: None,
            is_free_stock: false,
            pdf_url: None,
            sync_status: SyncStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Apply a percentage discount justified by `reason_id`
    #[must_use]
    pub fn with_discount(mut self, percentage: f64, reason_id: RecordId) -> Self {
        self.total_amount *= 1.0 - percentage / 100.0;
        self.discount_percentage = Some(percentage);
        self.discount_reason_id = Some(reason_id);
        self
    }

    /// Mark the order as free stock
    #[must_use]
    pub fn as_free_stock(mut self) -> Self {
        self.is_free_stock = true;
        self.total_amount = 0.0;
        self
    }
}
