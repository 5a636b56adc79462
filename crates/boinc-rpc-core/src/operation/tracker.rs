// Poll evaluation
//
// Pure pieces of the coordinator: the event-log cursor (watermark plus
// excluded projects) and the decision taken from one poll reply and the
// log entries that arrived since the previous poll.

use std::collections::HashSet;

use crate::lookup::{Category, ERR_IN_PROGRESS};
use crate::model::{EventLogEntry, PollReply};

use super::OperationSpec;

/// Outcome of one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Pending,
    /// Carries the confirming log entry, if any.
    Success { confirmation: Option<String> },
    Failure { reason: String },
}

/// Position in the event log plus the projects whose entries are ignored.
#[derive(Debug, Clone)]
pub struct LogCursor {
    watermark: u64,
    exclusions: HashSet<String>,
}

impl LogCursor {
    pub fn new(watermark: u64, exclusions: HashSet<String>) -> Self {
        Self { watermark, exclusions }
    }

    /// Highest sequence number already consumed.
    pub fn watermark(&self) -> u64 {
        self.watermark
    }

    pub fn exclusions(&self) -> &HashSet<String> {
        &self.exclusions
    }

    /// Keep entries newer than the watermark, advance the watermark over
    /// them, then drop entries from excluded projects. Arrival order is
    /// preserved.
    pub fn accept(&mut self, entries: Vec<EventLogEntry>) -> Vec<EventLogEntry> {
        let fresh: Vec<EventLogEntry> = entries
            .into_iter()
            .filter(|e| e.seqno > self.watermark)
            .collect();
        if let Some(max) = fresh.iter().map(|e| e.seqno).max() {
            self.watermark = max;
        }
        fresh
            .into_iter()
            .filter(|e| !e.is_from_any(self.exclusions.iter().map(String::as_str)))
            .collect()
    }
}

/// Decide the outcome of one poll.
///
/// - in-progress status: pending, the log is not consulted
/// - first entry matching a failure or success marker decides
/// - otherwise a non-zero status fails with the daemon's message
/// - otherwise success only if the operation settles on status
pub fn evaluate(
    spec: &OperationSpec,
    status: &PollReply,
    entries: &[EventLogEntry],
) -> PollOutcome {
    if status.error_num == ERR_IN_PROGRESS {
        return PollOutcome::Pending;
    }

    for entry in entries {
        if spec.failure_markers.iter().any(|m| entry.body.contains(m.as_str())) {
            return PollOutcome::Failure {
                reason: entry.body.clone(),
            };
        }
        if spec.success_markers.iter().any(|m| entry.body.contains(m.as_str())) {
            return PollOutcome::Success {
                confirmation: Some(entry.body.clone()),
            };
        }
    }

    if status.error_num != 0 {
        let reason = status
            .message_text()
            .unwrap_or_else(|| Category::Freturn.label(status.error_num).to_owned());
        return PollOutcome::Failure { reason };
    }

    if spec.settle_on_status {
        PollOutcome::Success { confirmation: None }
    } else {
        PollOutcome::Pending
    }
}
