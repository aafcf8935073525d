//! Process-local activity feed for the admin workspace.
//!
//! Entries live as long as the workspace that owns the log. Nothing here is
//! persisted.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of entries kept before the oldest are dropped.
pub const ACTIVITY_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    System,
    Created,
    Updated,
    Deleted,
    Published,
    Unpublished,
    Featured,
    Unfeatured,
    Imported,
    Exported,
}

/// One line of the activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: Uuid,
    pub kind: ActivityKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    pub at: DateTime<Utc>,
}

/// Bounded, newest-first activity log.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log holding the entry written when a workspace opens.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let mut log = Self::new();
        log.push_at(ActivityKind::System, "Workspace opened", None, now);
        log
    }

    pub fn record(&mut self, kind: ActivityKind, message: impl Into<String>, post_id: Option<&str>) {
        self.push_at(kind, message, post_id, Utc::now());
    }

    fn push_at(
        &mut self,
        kind: ActivityKind,
        message: impl Into<String>,
        post_id: Option<&str>,
        at: DateTime<Utc>,
    ) {
        self.entries.push_front(ActivityEntry {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            post_id: post_id.map(str::to_string),
            at,
        });
        self.entries.truncate(ACTIVITY_CAPACITY);
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_entry_comes_first() {
        let mut log = ActivityLog::seeded(Utc::now());
        log.record(ActivityKind::Created, "Created \"Hello\"", Some("p1"));

        let kinds: Vec<_> = log.entries().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ActivityKind::Created, ActivityKind::System]);
    }

    #[test]
    fn log_is_bounded() {
        let mut log = ActivityLog::new();
        for i in 0..ACTIVITY_CAPACITY + 5 {
            log.record(ActivityKind::Updated, format!("update {i}"), None);
        }

        assert_eq!(log.len(), ACTIVITY_CAPACITY);
        let newest = log.entries().next().unwrap();
        assert_eq!(newest.message, format!("update {}", ACTIVITY_CAPACITY + 4));
    }
}
