// ── Event log domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the daemon's event log.
///
/// Sequence numbers are strictly increasing across the log's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub seqno: u64,
    /// Project the entry belongs to; `None` for daemon-wide entries.
    pub project: Option<String>,
    pub priority: i32,
    pub body: String,
    /// Unix seconds.
    pub timestamp: i64,
}

impl EventLogEntry {
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    /// Whether the entry is attributed to one of the given project names.
    pub fn is_from_any<'a>(&self, projects: impl IntoIterator<Item = &'a str>) -> bool {
        self.project
            .as_deref()
            .is_some_and(|p| projects.into_iter().any(|excluded| excluded == p))
    }
}
