//! Service facades shared across clients.

mod field_data;

pub use field_data::{DashboardStats, FieldDataService};
