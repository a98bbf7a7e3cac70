//! Sync states and the report handed back to callers

use serde::Serialize;
use std::fmt;

use crate::cache::CacheKey;
use crate::error::SyncError;
use crate::model::EntityKind;

/// Orchestrator states
///
/// `Idle → Fetching → Normalizing → Persisting → {Done, Degrading → {DonePartial, DoneMinimal, Failed}}`;
/// `Failed` is also reachable directly from the first three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SyncState {
    Idle,
    Fetching,
    Normalizing,
    Persisting,
    Degrading,
    /// Full snapshot stored
    Done,
    /// Other snapshots dropped, reduced snapshot stored
    DonePartial,
    /// Everything but the critical keys dropped
    DoneMinimal,
    Failed,
}

impl SyncState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SyncState::Done | SyncState::DonePartial | SyncState::DoneMinimal | SyncState::Failed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Idle => "idle",
            SyncState::Fetching => "fetching",
            SyncState::Normalizing => "normalizing",
            SyncState::Persisting => "persisting",
            SyncState::Degrading => "degrading",
            SyncState::Done => "done",
            SyncState::DonePartial => "done_partial",
            SyncState::DoneMinimal => "done_minimal",
            SyncState::Failed => "failed",
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one `sync_entity_class` run
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub kind: EntityKind,
    /// Terminal state
    pub state: SyncState,
    /// Every state entered, in order, starting at `Idle`
    pub transitions: Vec<SyncState>,
    /// Records fetched
    pub records: usize,
    /// Bytes written under the canonical key (0 when nothing was)
    pub bytes: usize,
    /// Keys removed while degrading
    ///
    /// Removal is immediate in the cache's view. A file-backed cache that
    /// cannot rewrite its file logs a warning and stores the removal with its
    /// next successful write, so a reopen before then can still see these keys.
    pub dropped: Vec<CacheKey>,
    /// Keys written individually by the minimal tier
    pub retained: Vec<CacheKey>,
    pub error: Option<SyncError>,
}

impl SyncReport {
    pub(crate) fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            state: SyncState::Idle,
            transitions: vec![SyncState::Idle],
            records: 0,
            bytes: 0,
            dropped: Vec::new(),
            retained: Vec::new(),
            error: None,
        }
    }

    pub(crate) fn enter(&mut self, state: SyncState) {
        tracing::debug!(kind = %self.kind, from = %self.state, to = %state, "Sync transition");
        self.state = state;
        self.transitions.push(state);
    }

    pub(crate) fn fail(mut self, error: SyncError) -> Self {
        tracing::error!(kind = %self.kind, from = %self.state, "Sync failed: {}", error);
        self.enter(SyncState::Failed);
        self.error = Some(error);
        self
    }

    pub(crate) fn finish(mut self, state: SyncState) -> Self {
        self.enter(state);
        match state {
            SyncState::Done => {
                tracing::info!(kind = %self.kind, records = self.records, bytes = self.bytes, "Sync complete")
            }
            _ => tracing::warn!(
                kind = %self.kind,
                state = %state,
                dropped = ?self.dropped,
                retained = ?self.retained,
                "Sync completed with reduced cache"
            ),
        }
        self
    }

    pub fn is_success(&self) -> bool {
        self.state == SyncState::Done
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.state, SyncState::DonePartial | SyncState::DoneMinimal)
    }

    pub fn is_failed(&self) -> bool {
        self.state == SyncState::Failed
    }

    /// True when the run passed through `state`
    pub fn visited(&self, state: SyncState) -> bool {
        self.transitions.contains(&state)
    }

    /// User-facing notification for this outcome
    pub fn notification(&self) -> Notification {
        let label = display_name(self.kind);

        match self.state {
            SyncState::Done => Notification {
                level: NotificationLevel::Success,
                title: format!("{} saved", label),
                message: format!("{} is cached for offline viewing.", label),
            },
            SyncState::DonePartial | SyncState::DoneMinimal => {
                let dropped: Vec<&str> = self.dropped.iter().map(CacheKey::as_str).collect();
                let kept = if self.state == SyncState::DoneMinimal {
                    "Only the profile photo and resume links were kept."
                } else {
                    "A reduced copy was kept."
                };
                let removed = if dropped.is_empty() {
                    "nothing else".to_string()
                } else {
                    dropped.join(", ")
                };
                Notification {
                    level: NotificationLevel::Degraded,
                    title: format!("{} saved with limited offline data", label),
                    message: format!(
                        "Local storage is full. Removed cached {}. {}",
                        removed, kept
                    ),
                }
            }
            _ => Notification {
                level: NotificationLevel::Failure,
                title: format!("Could not cache {}", label.to_lowercase()),
                message: format!(
                    "{} Cached data may be stale; live data will be used instead.",
                    self.error
                        .as_ref()
                        .map(|e| format!("{}.", e))
                        .unwrap_or_default()
                )
                .trim_start()
                .to_string(),
            },
        }
    }
}

fn display_name(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Profile => "Profile",
        EntityKind::Connections => "Connections",
        EntityKind::FamilyMembers => "Family members",
        EntityKind::StoryMilestones => "Story milestones",
    }
}

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Degraded,
    Failure,
}

/// Toast text for a sync outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;

    #[test]
    fn test_three_distinct_notification_levels() {
        let done = SyncReport::new(EntityKind::Profile).finish(SyncState::Done);
        assert_eq!(done.notification().level, NotificationLevel::Success);

        let mut partial = SyncReport::new(EntityKind::Profile);
        partial.dropped = vec![CacheKey::Connections, CacheKey::FamilyMembers];
        let partial = partial.finish(SyncState::DonePartial);
        let note = partial.notification();
        assert_eq!(note.level, NotificationLevel::Degraded);
        assert!(note.message.contains("connections, familyMembers"));

        let failed = SyncReport::new(EntityKind::Connections)
            .fail(RemoteError::NetworkFailure("offline".into()).into());
        let note = failed.notification();
        assert_eq!(note.level, NotificationLevel::Failure);
        assert!(note.message.contains("live data will be used"));
        assert!(note.message.starts_with("Fetch failed"));
    }

    #[test]
    fn test_transitions_recorded_from_idle() {
        let mut report = SyncReport::new(EntityKind::FamilyMembers);
        report.enter(SyncState::Fetching);
        let report = report.finish(SyncState::Done);
        assert_eq!(
            report.transitions,
            vec![SyncState::Idle, SyncState::Fetching, SyncState::Done]
        );
        assert!(report.state.is_terminal());
        assert!(report.visited(SyncState::Fetching));
        assert!(!report.visited(SyncState::Degrading));
    }
}
