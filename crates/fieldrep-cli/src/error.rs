use std::io;

use fieldrep_core::sync::GatewayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] fieldrep_core::Error),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("{0} cannot be empty")]
    EmptyArgument(&'static str),
    #[error("Invalid order line '{0}'; expected PRODUCT_ID:QUANTITY")]
    InvalidOrderLine(String),
    #[error("Product not found locally: {0}. Run `fieldrep sync` to refresh the catalog.")]
    ProductNotFound(String),
    #[error("Discount reason not found locally: {0}. Run `fieldrep reasons` to list them.")]
    DiscountReasonNotFound(String),
    #[error("Discount of {percentage}% is outside the 0-{max}% allowed for '{reason}'")]
    DiscountNotAllowed {
        percentage: f64,
        reason: String,
        max: f64,
    },
    #[error("Task not found: {0}")]
    TaskNotFound(String),
    #[error("Visit not found: {0}")]
    VisitNotFound(String),
    #[error("Failed to resolve CLI data directory")]
    NoDataDir,
    #[error("Sync is not configured. Set FIELDREP_REMOTE_URL and FIELDREP_REMOTE_KEY.")]
    SyncNotConfigured,
}
