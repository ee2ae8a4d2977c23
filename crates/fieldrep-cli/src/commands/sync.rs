use std::path::Path;
use std::sync::Arc;

use fieldrep_core::sync::{SkipReason, SyncOutcome, SyncReport};

use crate::commands::common::open_coordinator;
use crate::error::CliError;

pub async fn run_sync(db_path: &Path) -> Result<(), CliError> {
    let (coordinator, _) = open_coordinator(db_path).await?;
    let outcome = coordinator.sync_now().await;
    println!("{}", describe_outcome(&outcome));

    let remaining = coordinator.store().pending_count().await?;
    if remaining > 0 {
        println!("{remaining} change(s) still waiting to sync");
    }
    Ok(())
}

pub async fn run_watch(db_path: &Path) -> Result<(), CliError> {
    let (coordinator, config) = open_coordinator(db_path).await?;
    let coordinator = Arc::new(coordinator);

    println!("{}", describe_outcome(&coordinator.sync_now().await));
    coordinator.init().await;
    println!(
        "Syncing every {}s; press Ctrl-C to stop",
        config.sync_interval_secs
    );

    tokio::signal::ctrl_c().await?;
    coordinator.dispose().await;
    println!("Stopped");
    Ok(())
}

pub fn describe_outcome(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::NotRun(SkipReason::Offline) => "Sync skipped: offline".to_string(),
        SyncOutcome::NotRun(SkipReason::AlreadySyncing) => {
            "Sync skipped: already running".to_string()
        }
        SyncOutcome::NotRun(SkipReason::Disposed) => "Sync skipped: stopped".to_string(),
        SyncOutcome::Completed(report) => describe_report(report),
    }
}

fn describe_report(report: &SyncReport) -> String {
    let mut summary = format!(
        "Sync completed in {}ms: {} pushed, {} failed, {} collection(s) pulled",
        report.duration.as_millis(),
        report.pushed,
        report.failed,
        report.collections_pulled
    );
    if report.pull_failures > 0 {
        summary.push_str(&format!(", {} pull failure(s)", report.pull_failures));
    }
    if report.storage_errors > 0 {
        summary.push_str(&format!(", {} local storage error(s)", report.storage_errors));
    }
    summary
}
