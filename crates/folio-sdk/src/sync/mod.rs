//! Remote → local cache synchronization
//!
//! Best-effort read-through caching for a single writer: no conflict
//! resolution and no queued offline writes. Concurrent syncs of the same class
//! are last-write-wins.

mod degrade;
mod fetch;
mod mirror;
mod orchestrator;
mod report;

pub use fetch::{EntityFetcher, Snapshot};
pub use orchestrator::SyncOrchestrator;
pub use report::{Notification, NotificationLevel, SyncReport, SyncState};
