//! Sync cycle orchestration: push the queue, then pull reference data.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use tokio::sync::{oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::connectivity::ConnectivityMonitor;
use super::gateway::{FetchFilter, GatewayError, GatewayResult, RemoteGateway};
use super::route::PushRoute;
use crate::models::{RecordId, SyncQueueEntry, Table};
use crate::services::FieldDataService;
use crate::util::unix_millis_now;

/// What asked for a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    Timer,
    Reconnected,
    Manual,
}

/// Coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Syncing,
}

/// Why a requested cycle did not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Offline,
    AlreadySyncing,
    Disposed,
}

/// Counters for one completed cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Entries confirmed by the remote and removed from the queue
    pub pushed: usize,
    /// Entries the remote refused or could not be reached for
    pub failed: usize,
    pub collections_pulled: usize,
    pub pull_failures: usize,
    /// Local storage failures hit while applying results
    pub storage_errors: usize,
    pub duration: Duration,
}

impl SyncReport {
    /// Nothing failed during the cycle.
    pub const fn is_clean(&self) -> bool {
        self.failed == 0 && self.pull_failures == 0 && self.storage_errors == 0
    }
}

/// Result of a sync request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    NotRun(SkipReason),
    Completed(SyncReport),
}

struct TriggerTask {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Reconciles the local replica with the remote authority.
///
/// At most one cycle runs at a time. A cycle pushes a snapshot of the queue
/// in FIFO order, one entry at a time, then refreshes every reference
/// collection. Failures are isolated per entry and per collection, and a
/// cycle never returns an error: its [`SyncReport`] carries the counts.
pub struct SyncCoordinator {
    store: FieldDataService,
    gateway: Arc<dyn RemoteGateway>,
    connectivity: ConnectivityMonitor,
    interval: Duration,
    syncing: AtomicBool,
    disposed: AtomicBool,
    triggers: Mutex<Option<TriggerTask>>,
}

impl SyncCoordinator {
    pub fn new(
        store: FieldDataService,
        gateway: Arc<dyn RemoteGateway>,
        connectivity: ConnectivityMonitor,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            gateway,
            connectivity,
            interval,
            syncing: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
            triggers: Mutex::new(None),
        }
    }

    /// Start the periodic timer and the reconnect listener.
    ///
    /// Calling it again while the triggers run, or after [`Self::dispose`],
    /// does nothing.
    pub async fn init(self: &Arc<Self>) {
        if self.disposed.load(Ordering::Acquire) {
            return;
        }

        let mut triggers = self.triggers.lock().await;
        if triggers.is_some() {
            return;
        }

        let (shutdown, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(run_triggers(
            Arc::downgrade(self),
            self.interval,
            self.connectivity.subscribe(),
            shutdown_rx,
        ));
        *triggers = Some(TriggerTask { shutdown, handle });
        info!("Sync triggers started (every {}s)", self.interval.as_secs());
    }

    /// Stop the triggers. Later requests return [`SkipReason::Disposed`].
    ///
    /// A cycle already in progress runs to completion first.
    pub async fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);

        let task = self.triggers.lock().await.take();
        if let Some(TriggerTask { shutdown, handle }) = task {
            let _ = shutdown.send(());
            if let Err(error) = handle.await {
                warn!("Sync trigger task ended abnormally: {}", error);
            }
            info!("Sync triggers stopped");
        }
    }

    /// Run a cycle now if the coordinator is idle and the network reachable.
    pub async fn sync_now(&self) -> SyncOutcome {
        self.request_sync(SyncTrigger::Manual).await
    }

    /// Single entry point shared by every trigger.
    pub async fn request_sync(&self, trigger: SyncTrigger) -> SyncOutcome {
        if self.disposed.load(Ordering::Acquire) {
            return SyncOutcome::NotRun(SkipReason::Disposed);
        }
        if !self.connectivity.is_reachable() {
            debug!(?trigger, "Sync skipped: offline");
            return SyncOutcome::NotRun(SkipReason::Offline);
        }
        let Some(_cycle) = CycleGuard::acquire(&self.syncing) else {
            debug!(?trigger, "Sync skipped: cycle already running");
            return SyncOutcome::NotRun(SkipReason::AlreadySyncing);
        };

        info!(?trigger, "Sync started");
        let report = self.run_cycle().await;
        info!(
            "Sync finished in {}ms: {} pushed, {} failed, {} collections pulled, {} pull failures",
            report.duration.as_millis(),
            report.pushed,
            report.failed,
            report.collections_pulled,
            report.pull_failures,
        );
        SyncOutcome::Completed(report)
    }

    /// Fetch a representative's tasks from the remote and store them as
    /// synced. Tasks with unsynced local edits keep their local copy.
    ///
    /// Returns how many tasks were stored, or `None` when offline or disposed.
    pub async fn refresh_tasks(&self, rep_id: &RecordId) -> crate::Result<Option<usize>> {
        if self.disposed.load(Ordering::Acquire) || !self.connectivity.is_reachable() {
            debug!("Task refresh for {} skipped", rep_id);
            return Ok(None);
        }

        let filter = FetchFilter::eq("rep_id", rep_id.as_str());
        let rows = self.gateway.fetch(Table::RepTasks, Some(&filter)).await?;
        let stored = self.store.apply_task_refresh(&rows).await?;
        info!("Refreshed {} of {} tasks for {}", stored, rows.len(), rep_id);
        Ok(Some(stored))
    }

    pub fn state(&self) -> SyncPhase {
        if self.syncing.load(Ordering::Acquire) {
            SyncPhase::Syncing
        } else {
            SyncPhase::Idle
        }
    }

    pub const fn connectivity(&self) -> &ConnectivityMonitor {
        &self.connectivity
    }

    pub const fn store(&self) -> &FieldDataService {
        &self.store
    }

    async fn run_cycle(&self) -> SyncReport {
        let started = Instant::now();
        let mut report = SyncReport::default();
        self.push_pending(&mut report).await;
        self.pull_reference(&mut report).await;
        report.duration = started.elapsed();
        report
    }

    async fn push_pending(&self, report: &mut SyncReport) {
        let entries = match self.store.queue_snapshot().await {
            Ok(entries) => entries,
            Err(error) => {
                error!("Failed to read sync queue: {}", error);
                report.storage_errors += 1;
                return;
            }
        };

        for entry in &entries {
            match self.push_entry(entry).await {
                Ok(()) => match self.store.confirm_entry(entry).await {
                    Ok(()) => report.pushed += 1,
                    Err(error) => {
                        // Left queued; the next cycle replays it idempotently.
                        error!("Failed to confirm sync entry {}: {}", entry.id, error);
                        report.storage_errors += 1;
                    }
                },
                Err(error) => {
                    warn!(
                        "Push of {} {}/{} failed (attempt {}): {}",
                        entry.operation,
                        entry.table_name,
                        entry.record_id,
                        entry.retry_count + 1,
                        error
                    );
                    report.failed += 1;
                    if let Err(error) = self.store.record_failure(entry).await {
                        error!("Failed to record sync failure for {}: {}", entry.id, error);
                        report.storage_errors += 1;
                    }
                }
            }
        }
    }

    async fn push_entry(&self, entry: &SyncQueueEntry) -> GatewayResult<()> {
        let route = PushRoute::for_entry(entry.table_name, entry.operation);
        debug!(
            "Pushing {} {}/{} via {:?}",
            entry.operation, entry.table_name, entry.record_id, route
        );
        match route {
            PushRoute::Upsert => self
                .gateway
                .upsert(entry.table_name, &entry.payload)
                .await
                .map(|_| ()),
            PushRoute::Delete => self.gateway.delete(entry.table_name, &entry.record_id).await,
            PushRoute::Unsupported => Err(GatewayError::Rejected(format!(
                "no push handler for {} on {}",
                entry.operation, entry.table_name
            ))),
        }
    }

    async fn pull_reference(&self, report: &mut SyncReport) {
        let mut complete = true;
        for table in Table::REFERENCE {
            let rows = match self.gateway.fetch(table, None).await {
                Ok(rows) => rows,
                Err(error) => {
                    warn!("Pull of {} failed: {}", table, error);
                    report.pull_failures += 1;
                    complete = false;
                    continue;
                }
            };

            match self.store.apply_pull(table, &rows).await {
                Ok(count) => {
                    debug!("Pulled {} rows into {}", count, table);
                    report.collections_pulled += 1;
                }
                Err(error) => {
                    error!("Failed to store pulled {}: {}", table, error);
                    report.storage_errors += 1;
                    complete = false;
                }
            }
        }

        if complete {
            if let Err(error) = self.store.set_last_full_pull_at(unix_millis_now()).await {
                error!("Failed to record pull time: {}", error);
                report.storage_errors += 1;
            }
        }
    }
}

/// Holds the single-flight flag for the duration of a cycle.
struct CycleGuard<'a>(&'a AtomicBool);

impl<'a> CycleGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

async fn run_triggers(
    coordinator: Weak<SyncCoordinator>,
    interval: Duration,
    mut reachability: watch::Receiver<bool>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let trigger = tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => SyncTrigger::Timer,
            changed = reachability.changed() => {
                if changed.is_err() {
                    break;
                }
                if !*reachability.borrow_and_update() {
                    continue;
                }
                SyncTrigger::Reconnected
            }
        };

        let Some(coordinator) = coordinator.upgrade() else {
            break;
        };
        coordinator.request_sync(trigger).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Client, Operation, RepTask, SyncStatus, TaskStatus, TaskUpdate, Visit, VisitOutcome,
    };
    use crate::sync::testing::ScriptedGateway;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const INTERVAL: Duration = Duration::from_secs(300);

    async fn setup(
        gateway: ScriptedGateway,
        reachable: bool,
    ) -> (Arc<SyncCoordinator>, Arc<ScriptedGateway>, FieldDataService) {
        let store = FieldDataService::open_in_memory().await.unwrap();
        let gateway = Arc::new(gateway);
        let coordinator = Arc::new(SyncCoordinator::new(
            store.clone(),
            Arc::clone(&gateway) as Arc<dyn RemoteGateway>,
            ConnectivityMonitor::new(reachable),
            INTERVAL,
        ));
        (coordinator, gateway, store)
    }

    async fn log_visit(store: &FieldDataService) -> Visit {
        let visit = Visit::check_in(RecordId::from("rep-1"), RecordId::new());
        store.save_visit(&visit).await.unwrap();
        visit
    }

    fn completed(outcome: SyncOutcome) -> SyncReport {
        match outcome {
            SyncOutcome::Completed(report) => report,
            SyncOutcome::NotRun(reason) => panic!("cycle did not run: {reason:?}"),
        }
    }

    async fn wait_until_drained(store: &FieldDataService) {
        for _ in 0..200 {
            if store.pending_count().await.unwrap() == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("queue never drained");
    }

    #[tokio::test]
    async fn offline_request_does_not_run() {
        let (coordinator, gateway, store) = setup(ScriptedGateway::new(), false).await;
        log_visit(&store).await;

        assert_eq!(
            coordinator.sync_now().await,
            SyncOutcome::NotRun(SkipReason::Offline)
        );
        assert_eq!(store.pending_count().await.unwrap(), 1);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_entry_does_not_block_the_rest() {
        let (coordinator, gateway, store) = setup(ScriptedGateway::new(), true).await;
        let first = log_visit(&store).await;
        let second = log_visit(&store).await;
        let third = log_visit(&store).await;
        gateway.fail_record(&second.id);

        let report = completed(coordinator.sync_now().await);
        assert_eq!(report.pushed, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.storage_errors, 0);

        let queue = store.sync_queue().await.unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].record_id, second.id);
        assert_eq!(queue[0].retry_count, 1);
        assert!(queue[0].last_attempt.is_some());

        assert_eq!(gateway.rows(Table::Visits).len(), 2);
        for (visit, expected) in [
            (&first, SyncStatus::Synced),
            (&second, SyncStatus::Failed),
            (&third, SyncStatus::Synced),
        ] {
            let stored: Visit = store.get(&visit.id).await.unwrap().unwrap();
            assert_eq!(stored.sync_status, expected);
        }
        assert_eq!(coordinator.state(), SyncPhase::Idle);
    }

    #[tokio::test]
    async fn failed_entry_keeps_its_place_across_cycles() {
        let (coordinator, gateway, store) = setup(ScriptedGateway::new(), true).await;
        let stuck = log_visit(&store).await;
        gateway.fail_record(&stuck.id);
        completed(coordinator.sync_now().await);
        completed(coordinator.sync_now().await);

        gateway.heal_record(&stuck.id);
        let later = log_visit(&store).await;
        let report = completed(coordinator.sync_now().await);
        assert_eq!(report.pushed, 2);

        let upserts: Vec<String> = gateway
            .calls()
            .into_iter()
            .filter(|call| call.starts_with("upsert"))
            .collect();
        assert_eq!(
            upserts,
            vec![
                format!("upsert visits/{}", stuck.id),
                format!("upsert visits/{}", stuck.id),
                format!("upsert visits/{}", stuck.id),
                format!("upsert visits/{}", later.id),
            ]
        );
        assert_eq!(store.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn edit_of_failed_record_reaches_remote_after_recovery() {
        let (coordinator, gateway, store) = setup(ScriptedGateway::new(), true).await;
        let visit = log_visit(&store).await;
        gateway.fail_record(&visit.id);
        completed(coordinator.sync_now().await);

        let stored: Visit = store.get(&visit.id).await.unwrap().unwrap();
        assert_eq!(stored.sync_status, SyncStatus::Failed);
        let edited = stored.check_out(VisitOutcome::Good, Some("Restocked shelf".to_string()));
        store.save_local(&edited, Operation::Update).await.unwrap();
        assert_eq!(store.pending_count().await.unwrap(), 2);

        gateway.heal_record(&visit.id);
        let report = completed(coordinator.sync_now().await);
        assert_eq!(report.pushed, 2);
        assert_eq!(report.failed, 0);

        let remote = gateway.rows(Table::Visits);
        assert_eq!(remote.len(), 1);
        assert!(!remote[0]["check_out_time"].is_null());
        assert_eq!(remote[0]["notes"], "Restocked shelf");

        let local: Visit = store.get(&visit.id).await.unwrap().unwrap();
        assert_eq!(local.sync_status, SyncStatus::Synced);
        assert_eq!(store.pending_count().await.unwrap(), 0);
    }

    fn remote_task(rep: &str, title: &str) -> serde_json::Value {
        json!({
            "id": RecordId::new(),
            "rep_id": rep,
            "task_type_id": "type-1",
            "title": title,
            "status": "pending",
            "sync_status": "pending",
            "created_at": Utc::now(),
        })
    }

    #[tokio::test]
    async fn refresh_tasks_stores_the_reps_tasks_as_synced() {
        let (coordinator, gateway, store) = setup(ScriptedGateway::new(), true).await;
        gateway.seed(
            Table::RepTasks,
            vec![
                remote_task("rep-1", "Photograph display"),
                remote_task("rep-2", "Count stock"),
            ],
        );

        let rep = RecordId::from("rep-1");
        assert_eq!(coordinator.refresh_tasks(&rep).await.unwrap(), Some(1));

        let tasks = store.tasks_for_rep(&rep).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Photograph display");
        assert_eq!(tasks[0].sync_status, SyncStatus::Synced);
        assert!(store
            .tasks_for_rep(&RecordId::from("rep-2"))
            .await
            .unwrap()
            .is_empty());
        assert_eq!(store.pending_count().await.unwrap(), 0);
        assert!(gateway.calls().contains(&"fetch rep_tasks".to_string()));
    }

    #[tokio::test]
    async fn refresh_tasks_keeps_unsynced_local_edits() {
        let (coordinator, gateway, store) = setup(ScriptedGateway::new(), true).await;
        let row = remote_task("rep-1", "Photograph display");
        gateway.seed(Table::RepTasks, vec![row.clone()]);
        let rep = RecordId::from("rep-1");
        coordinator.refresh_tasks(&rep).await.unwrap();

        let task: RepTask = serde_json::from_value(row).unwrap();
        store
            .update_task(
                &task.id,
                TaskUpdate {
                    status: Some(TaskStatus::Completed),
                    completed_at: Some(Utc::now()),
                    ..TaskUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(coordinator.refresh_tasks(&rep).await.unwrap(), Some(0));
        let kept: RepTask = store.get(&task.id).await.unwrap().unwrap();
        assert_eq!(kept.status, TaskStatus::Completed);
        assert_eq!(kept.sync_status, SyncStatus::Pending);
        assert_eq!(store.pending_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn refresh_tasks_offline_or_failing() {
        let (coordinator, gateway, _store) = setup(ScriptedGateway::new(), false).await;
        let rep = RecordId::from("rep-1");
        assert_eq!(coordinator.refresh_tasks(&rep).await.unwrap(), None);
        assert!(gateway.calls().is_empty());

        coordinator.connectivity().set_reachable(true);
        gateway.fail_fetch(Table::RepTasks);
        assert!(matches!(
            coordinator.refresh_tasks(&rep).await,
            Err(crate::Error::Remote(GatewayError::Unavailable(_)))
        ));
    }

    #[tokio::test]
    async fn replay_after_lost_confirmation_is_idempotent() {
        let (coordinator, gateway, store) = setup(ScriptedGateway::new(), true).await;
        let visit = log_visit(&store).await;
        // The remote applied the write but the device never recorded it.
        gateway.seed(Table::Visits, vec![serde_json::to_value(&visit).unwrap()]);

        let report = completed(coordinator.sync_now().await);
        assert_eq!(report.pushed, 1);
        assert_eq!(gateway.rows(Table::Visits).len(), 1);
        assert_eq!(store.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_entries_use_the_delete_route() {
        let (coordinator, gateway, store) = setup(ScriptedGateway::new(), true).await;
        let visit = log_visit(&store).await;
        completed(coordinator.sync_now().await);
        assert_eq!(gateway.rows(Table::Visits).len(), 1);

        store.delete_visit(&visit.id).await.unwrap();
        let report = completed(coordinator.sync_now().await);
        assert_eq!(report.pushed, 1);
        assert!(gateway.rows(Table::Visits).is_empty());
        assert!(gateway
            .calls()
            .contains(&format!("delete visits/{}", visit.id)));
    }

    #[tokio::test]
    async fn pull_overwrites_reference_rows() {
        let (coordinator, gateway, store) = setup(ScriptedGateway::new(), true).await;
        let id = RecordId::new();
        let local = Client {
            id: id.clone(),
            name: "Old Name".to_string(),
            address: "1 Main St".to_string(),
            region: "north".to_string(),
            phone: None,
            email: None,
            contact_person: None,
            created_at: Utc::now(),
        };
        store.save_client(&local).await.unwrap();

        let remote = json!({
            "id": id,
            "name": "New Name",
            "address": "2 High St",
            "region": "south",
            "created_at": Utc::now(),
            "credit_limit": 1500,
        });
        gateway.seed(Table::Clients, vec![remote]);

        let report = completed(coordinator.sync_now().await);
        assert_eq!(report.collections_pulled, Table::REFERENCE.len());
        assert!(report.is_clean());

        let stored: Client = store.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.name, "New Name");
        assert_eq!(stored.region, "south");
        assert!(store.last_full_pull_at().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn failed_collection_is_skipped_alone() {
        let (coordinator, gateway, store) = setup(ScriptedGateway::new(), true).await;
        gateway.seed(
            Table::Clients,
            vec![json!({
                "id": "c-1",
                "name": "Acme",
                "address": "1 Main St",
                "region": "north",
                "created_at": Utc::now(),
            })],
        );
        gateway.fail_fetch(Table::Products);

        let report = completed(coordinator.sync_now().await);
        assert_eq!(report.pull_failures, 1);
        assert_eq!(report.collections_pulled, Table::REFERENCE.len() - 1);
        assert_eq!(store.clients(None).await.unwrap().len(), 1);
        assert!(store.last_full_pull_at().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_request_is_rejected_while_syncing() {
        let (gateway, gate) = ScriptedGateway::gated();
        let (coordinator, _gateway, store) = setup(gateway, true).await;
        log_visit(&store).await;

        let running = tokio::spawn({
            let coordinator = Arc::clone(&coordinator);
            async move { coordinator.sync_now().await }
        });
        gate.entered.notified().await;

        assert_eq!(coordinator.state(), SyncPhase::Syncing);
        let queue_before = store.sync_queue().await.unwrap();
        assert_eq!(
            coordinator.sync_now().await,
            SyncOutcome::NotRun(SkipReason::AlreadySyncing)
        );
        assert_eq!(store.sync_queue().await.unwrap(), queue_before);

        gate.release.notify_one();
        let report = completed(running.await.unwrap());
        assert_eq!(report.pushed, 1);
        assert_eq!(coordinator.state(), SyncPhase::Idle);
    }

    #[tokio::test]
    async fn reconnecting_triggers_a_cycle() {
        let (coordinator, _gateway, store) = setup(ScriptedGateway::new(), false).await;
        log_visit(&store).await;
        coordinator.init().await;

        coordinator.connectivity().set_reachable(true);
        wait_until_drained(&store).await;

        coordinator.dispose().await;
    }

    #[tokio::test(start_paused = true)]
    async fn timer_triggers_a_cycle() {
        let (coordinator, gateway, store) = setup(ScriptedGateway::new(), true).await;
        log_visit(&store).await;
        coordinator.init().await;

        tokio::time::sleep(INTERVAL + Duration::from_secs(1)).await;
        wait_until_drained(&store).await;
        assert_eq!(gateway.rows(Table::Visits).len(), 1);

        coordinator.dispose().await;
    }

    #[tokio::test]
    async fn disposed_coordinator_refuses_requests() {
        let (coordinator, gateway, store) = setup(ScriptedGateway::new(), false).await;
        coordinator.init().await;
        coordinator.dispose().await;
        log_visit(&store).await;

        coordinator.connectivity().set_reachable(true);
        assert_eq!(
            coordinator.sync_now().await,
            SyncOutcome::NotRun(SkipReason::Disposed)
        );

        coordinator.init().await;
        tokio::task::yield_now().await;
        assert!(gateway.calls().is_empty());
        assert_eq!(store.pending_count().await.unwrap(), 1);
    }
}
