//! Network reachability flag with transition notifications.

use std::sync::Arc;

use tokio::sync::watch;

/// Tracks the host's raw reachability signal.
///
/// The host calls [`ConnectivityMonitor::set_reachable`] whenever its
/// platform signal changes; subscribers observe only actual transitions.
/// Clones share the same flag.
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    state: Arc<watch::Sender<bool>>,
}

impl ConnectivityMonitor {
    pub fn new(reachable: bool) -> Self {
        let (state, _) = watch::channel(reachable);
        Self {
            state: Arc::new(state),
        }
    }

    /// Current value of the reachability flag.
    pub fn is_reachable(&self) -> bool {
        *self.state.borrow()
    }

    /// Feed the latest platform signal. Returns `true` when the flag changed.
    pub fn set_reachable(&self, reachable: bool) -> bool {
        let changed = self.state.send_if_modified(|current| {
            if *current == reachable {
                false
            } else {
                *current = reachable;
                true
            }
        });

        if changed {
            if reachable {
                tracing::info!("Network reachable");
            } else {
                tracing::info!("Network unreachable; working offline");
            }
        }
        changed
    }

    /// Receiver notified on every transition.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
