//! Product catalog model (reference data)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::impl_record;
use super::{RecordId, Table};

/// A catalog entry that can be ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: RecordId,
    pub name: String,
    pub sku: String,
    pub unit_price: f64,
    pub category: String,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
}

impl_record!(Product, Table::Products);
