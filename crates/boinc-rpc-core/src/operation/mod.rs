// ── Long-running operations ──
//
// Project attach and account-manager attach/detach return immediately
// from the daemon and finish in the background. Completion is inferred
// by polling a status command and scanning the event log for entries
// newer than a watermark captured before the operation started. One
// parameterised state machine (`OperationSpec`) covers all three.

mod coordinator;
pub mod spec;
pub mod tracker;

use std::time::Duration;

use serde::Serialize;
use tokio::sync::{oneshot, watch};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::error::CoreError;
use crate::model::AccountManagerInfo;

pub(crate) use coordinator::spawn;
pub use spec::OperationSpec;
pub use tracker::{LogCursor, PollOutcome};

// ── Kind / state ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
pub enum OperationKind {
    #[strum(to_string = "project attach")]
    ProjectAttach,
    #[strum(to_string = "account manager attach")]
    AccountManagerAttach,
    #[strum(to_string = "account manager detach")]
    AccountManagerDetach,
}

/// Observable progress of one operation.
///
/// `Initiating -> Polling -> {Succeeded | Failed | TimedOut | Cancelled}`.
/// Terminal states never change again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationState {
    Initiating,
    Polling { polls: u32 },
    Succeeded,
    Failed { reason: String },
    TimedOut,
    Cancelled,
}

impl OperationState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Failed { .. } | Self::TimedOut | Self::Cancelled
        )
    }
}

// ── Options / report ─────────────────────────────────────────────

/// Timing for one operation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationOptions {
    /// Overall deadline, measured from the start of initiation.
    pub timeout: Duration,
    /// Delay between status polls.
    pub poll_interval: Duration,
}

/// Longest deadline an operation accepts; larger timeouts are cut to it.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Shortest delay between polls.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

impl OperationOptions {
    /// Bring the timeout and interval into the range the coordinator
    /// can schedule.
    pub fn clamped(self) -> Self {
        Self {
            timeout: self.timeout.min(MAX_TIMEOUT),
            poll_interval: self.poll_interval.max(MIN_POLL_INTERVAL),
        }
    }
}

impl Default for OperationOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// Summary of a successful operation.
#[derive(Debug, Clone, Serialize)]
pub struct OperationReport {
    pub kind: OperationKind,
    pub polls: u32,
    pub elapsed_ms: u64,
    /// Event-log entry that confirmed success, if one did.
    pub confirmation: Option<String>,
    /// Account manager as seen after an account-manager operation.
    pub account_manager: Option<AccountManagerInfo>,
}

// ── Handle ───────────────────────────────────────────────────────

/// Caller's side of a running operation.
///
/// Dropping the handle cancels the operation.
#[derive(Debug)]
pub struct OperationHandle {
    kind: OperationKind,
    state: watch::Receiver<OperationState>,
    result: oneshot::Receiver<Result<OperationReport, CoreError>>,
    cancel: CancellationToken,
    _guard: DropGuard,
}

impl OperationHandle {
    pub(crate) fn new(
        kind: OperationKind,
        state: watch::Receiver<OperationState>,
        result: oneshot::Receiver<Result<OperationReport, CoreError>>,
        cancel: CancellationToken,
    ) -> Self {
        let guard = cancel.clone().drop_guard();
        Self {
            kind,
            state,
            result,
            cancel,
            _guard: guard,
        }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Subscribe to state changes.
    pub fn state(&self) -> watch::Receiver<OperationState> {
        self.state.clone()
    }

    /// Stop polling. The operation resolves as `OperationCancelled` at the
    /// next checkpoint; an exchange already on the wire completes first.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the operation to resolve.
    pub async fn wait(self) -> Result<OperationReport, CoreError> {
        let Self { kind, result, _guard, .. } = self;
        result.await.map_err(|_| {
            CoreError::Internal(format!("{kind} task ended without reporting a result"))
        })?
    }
}
