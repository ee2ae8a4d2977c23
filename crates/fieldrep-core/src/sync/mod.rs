//! Synchronization with the remote authority
//!
//! Local writes land in the replica and the sync queue first. The
//! [`SyncCoordinator`] later replays the queue through a [`RemoteGateway`]
//! and refreshes the reference collections, whenever the
//! [`ConnectivityMonitor`] reports the network as reachable.

mod connectivity;
mod coordinator;
mod gateway;
mod postgrest;
mod route;

#[cfg(test)]
pub(crate) mod testing;

pub use connectivity::ConnectivityMonitor;
pub use coordinator::{SkipReason, SyncCoordinator, SyncOutcome, SyncPhase, SyncReport, SyncTrigger};
pub use gateway::{FetchFilter, GatewayError, GatewayResult, RemoteGateway};
pub use postgrest::PostgrestGateway;
pub use route::PushRoute;
