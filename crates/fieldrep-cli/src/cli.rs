use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use fieldrep_core::models::VisitOutcome;

#[derive(Parser)]
#[command(name = "fieldrep")]
#[command(about = "Capture field visits, orders and tasks offline and sync them later")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show queue length and last pull time
    Status {
        /// Include home screen counters for this representative
        #[arg(long, value_name = "REP_ID")]
        rep: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List mutations waiting to sync
    Queue {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run one sync cycle against the configured remote
    Sync,
    /// Keep syncing on a timer until interrupted
    Watch,
    /// List clients
    Clients {
        /// Only clients in this region
        #[arg(long)]
        region: Option<String>,
        /// Match name or contact person
        #[arg(long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the product catalog
    Products {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log a client visit
    Visit {
        #[arg(long, value_name = "REP_ID")]
        rep: String,
        #[arg(long, value_name = "CLIENT_ID")]
        client: String,
        /// Check out immediately with this outcome
        #[arg(long, value_enum)]
        outcome: Option<OutcomeArg>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Discard a logged visit
    DiscardVisit {
        /// Visit ID
        id: String,
    },
    /// Place an order
    Order {
        #[arg(long, value_name = "REP_ID")]
        rep: String,
        #[arg(long, value_name = "CLIENT_ID")]
        client: String,
        /// Visit the order was taken during
        #[arg(long, value_name = "VISIT_ID")]
        visit: Option<String>,
        /// Order line as PRODUCT_ID:QUANTITY (repeatable)
        #[arg(long = "item", value_name = "PRODUCT_ID:QTY", required = true)]
        items: Vec<String>,
        /// Discount percentage; needs --reason
        #[arg(long, value_name = "PCT", requires = "reason", conflicts_with = "free_stock")]
        discount: Option<f64>,
        /// Discount reason justifying --discount
        #[arg(long, value_name = "REASON_ID", requires = "discount")]
        reason: Option<String>,
        /// Deliver as free stock; the order totals zero
        #[arg(long)]
        free_stock: bool,
    },
    /// List discount reasons and their ceilings
    Reasons {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List a representative's tasks
    Tasks {
        #[arg(long, value_name = "REP_ID")]
        rep: String,
        /// Fetch this representative's tasks from the remote first
        #[arg(long)]
        refresh: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a task completed
    CompleteTask {
        /// Task ID
        id: String,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutcomeArg {
    Good,
    Missed,
    Problem,
    Bad,
}

impl From<OutcomeArg> for VisitOutcome {
    fn from(value: OutcomeArg) -> Self {
        match value {
            OutcomeArg::Good => Self::Good,
            OutcomeArg::Missed => Self::Missed,
            OutcomeArg::Problem => Self::Problem,
            OutcomeArg::Bad => Self::Bad,
        }
    }
}
