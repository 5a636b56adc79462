// Operation driver
//
// Runs one `OperationSpec` as its own task. Every exchange goes through
// the client's facade, so polls queue on the same single-flight gate as
// any other caller. Cancellation and the deadline are checked between
// exchanges only; an exchange already on the wire is allowed to finish
// so its reply cannot be mistaken for the next one.

use std::collections::HashSet;

use tokio::sync::{oneshot, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::Client;
use crate::error::CoreError;
use crate::model::PollReply;

use super::tracker::{LogCursor, PollOutcome, evaluate};
use super::{
    MAX_TIMEOUT, OperationHandle, OperationKind, OperationOptions, OperationReport, OperationSpec,
    OperationState,
};

/// Start `spec` in the background and return the caller's handle.
pub(crate) fn spawn(
    client: Client,
    spec: OperationSpec,
    options: OperationOptions,
) -> OperationHandle {
    let kind = spec.kind;
    let options = options.clamped();
    let cancel = client.cancel_token().child_token();
    let (state_tx, state_rx) = watch::channel(OperationState::Initiating);
    let (result_tx, result_rx) = oneshot::channel();

    let task_cancel = cancel.clone();
    tokio::spawn(async move {
        let mut run = Run {
            client,
            spec,
            options,
            cancel: task_cancel,
            state: state_tx,
            started: Instant::now(),
            polls: 0,
        };
        let result = run.drive().await;
        run.finish(&result);
        // The caller may have dropped the handle; nothing to report then.
        let _ = result_tx.send(result);
    });

    OperationHandle::new(kind, state_rx, result_rx, cancel)
}

struct Run {
    client: Client,
    spec: OperationSpec,
    options: OperationOptions,
    cancel: CancellationToken,
    state: watch::Sender<OperationState>,
    started: Instant,
    polls: u32,
}

impl Run {
    fn kind(&self) -> OperationKind {
        self.spec.kind
    }

    fn deadline(&self) -> Instant {
        self.started
            .checked_add(self.options.timeout)
            .or_else(|| self.started.checked_add(MAX_TIMEOUT))
            .unwrap_or(self.started)
    }

    fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn timed_out(&self) -> CoreError {
        CoreError::OperationTimedOut {
            kind: self.kind(),
            elapsed_ms: self.elapsed_ms(),
        }
    }

    /// Fail fast between exchanges if cancelled or past the deadline.
    fn checkpoint(&self) -> Result<(), CoreError> {
        if self.cancel.is_cancelled() {
            return Err(CoreError::OperationCancelled { kind: self.kind() });
        }
        if Instant::now() >= self.deadline() {
            return Err(self.timed_out());
        }
        Ok(())
    }

    /// An exchange failing because the client was torn down is a
    /// cancellation, not a daemon error.
    fn exchange_error(&self, err: CoreError) -> CoreError {
        if self.cancel.is_cancelled() {
            CoreError::OperationCancelled { kind: self.kind() }
        } else {
            err
        }
    }

    async fn drive(&mut self) -> Result<OperationReport, CoreError> {
        let kind = self.kind();
        debug!(%kind, "initiating operation");

        // Capture the log position and the already-attached projects
        // before the start command so nothing it triggers is missed.
        self.checkpoint()?;
        let watermark = self
            .client
            .get_message_count()
            .await
            .map_err(|e| self.exchange_error(e))?;
        self.checkpoint()?;
        let mut exclusions: HashSet<String> = self
            .client
            .get_project_status()
            .await
            .map_err(|e| self.exchange_error(e))?
            .into_iter()
            .map(|p| p.project_name)
            .filter(|name| !name.is_empty())
            .collect();
        exclusions.extend(self.spec.exclusions.iter().cloned());
        let mut cursor = LogCursor::new(watermark, exclusions);
        debug!(%kind, watermark, excluded = cursor.exclusions().len(), "captured log position");

        self.checkpoint()?;
        match self.client.execute_action(self.spec.start.clone()).await {
            Ok(_) => {}
            Err(CoreError::Rejected { message }) => {
                return Err(CoreError::OperationFailed { kind, reason: message });
            }
            Err(e) => return Err(self.exchange_error(e)),
        }

        let confirmation = self.poll(&mut cursor).await?;
        let account_manager = self.refresh_after_success().await;

        Ok(OperationReport {
            kind,
            polls: self.polls,
            elapsed_ms: self.elapsed_ms(),
            confirmation,
            account_manager,
        })
    }

    /// Poll until the outcome is known. Returns the confirming log entry.
    async fn poll(&mut self, cursor: &mut LogCursor) -> Result<Option<String>, CoreError> {
        let kind = self.kind();
        let mut interval = tokio::time::interval(self.options.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await; // consume the immediate first tick

        let deadline = self.deadline();
        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    return Err(CoreError::OperationCancelled { kind });
                }
                () = tokio::time::sleep_until(deadline) => {
                    return Err(self.timed_out());
                }
                _ = interval.tick() => {}
            }

            self.polls += 1;
            self.state.send_replace(OperationState::Polling { polls: self.polls });

            let status = self.poll_status().await.map_err(|e| self.exchange_error(e))?;
            let entries = if status.error_num == crate::lookup::ERR_IN_PROGRESS {
                Vec::new()
            } else {
                let fetched = self
                    .client
                    .get_messages(cursor.watermark(), false)
                    .await
                    .map_err(|e| self.exchange_error(e))?;
                cursor.accept(fetched)
            };

            match evaluate(&self.spec, &status, &entries) {
                PollOutcome::Pending => {
                    debug!(
                        %kind,
                        polls = self.polls,
                        error_num = status.error_num,
                        watermark = cursor.watermark(),
                        "still pending"
                    );
                }
                PollOutcome::Success { confirmation } => return Ok(confirmation),
                PollOutcome::Failure { reason } => {
                    return Err(CoreError::OperationFailed { kind, reason });
                }
            }
        }
    }

    async fn poll_status(&self) -> Result<PollReply, CoreError> {
        let reply = self.client.execute(self.spec.poll.clone()).await?;
        Ok(reply.decode(&self.spec.poll_reply)?)
    }

    /// Re-read what the operation changed. Failures here do not undo a
    /// successful operation.
    async fn refresh_after_success(&self) -> Option<crate::model::AccountManagerInfo> {
        match self.kind() {
            OperationKind::ProjectAttach => {
                if let Err(e) = self.client.get_state().await {
                    warn!(error = %e, "state refresh after project attach failed");
                }
                None
            }
            OperationKind::AccountManagerAttach | OperationKind::AccountManagerDetach => {
                match self.client.account_manager_info().await {
                    Ok(info) => Some(info),
                    Err(e) => {
                        warn!(error = %e, "account manager refresh failed");
                        None
                    }
                }
            }
        }
    }

    /// Publish the terminal state exactly once.
    fn finish(&self, result: &Result<OperationReport, CoreError>) {
        let kind = self.kind();
        let terminal = match result {
            Ok(report) => {
                info!(
                    %kind,
                    polls = report.polls,
                    elapsed_ms = report.elapsed_ms,
                    "operation succeeded"
                );
                OperationState::Succeeded
            }
            Err(CoreError::OperationTimedOut { elapsed_ms, .. }) => {
                warn!(%kind, polls = self.polls, elapsed_ms, "operation timed out");
                OperationState::TimedOut
            }
            Err(CoreError::OperationCancelled { .. }) => {
                info!(%kind, polls = self.polls, "operation cancelled");
                OperationState::Cancelled
            }
            Err(CoreError::OperationFailed { reason, .. }) => {
                warn!(%kind, polls = self.polls, %reason, "operation failed");
                OperationState::Failed {
                    reason: reason.clone(),
                }
            }
            Err(other) => {
                warn!(%kind, polls = self.polls, error = %other, "operation aborted");
                OperationState::Failed {
                    reason: other.to_string(),
                }
            }
        };
        self.state.send_replace(terminal);
    }
}
