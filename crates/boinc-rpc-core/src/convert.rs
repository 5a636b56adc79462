// ── Wire-to-domain conversions ──
//
// Bridges raw `boinc_rpc_api` reply models into `boinc_rpc_core::model`
// types: codes gain their lookup labels, epoch floats become timestamps,
// and tasks pick up names from the session's state snapshot.

use chrono::{DateTime, Utc};

use boinc_rpc_api::rpc::models::{CcStatus, ClientState, Message, TaskResult, VersionInfo};

use crate::lookup::Category;
use crate::model::{
    DaemonStatus, EventLogEntry, RunModeSetting, ServerVersion, TaskActivity, WorkUnit,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Epoch seconds as sent by the daemon (`%f`), zero meaning "unset".
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn epoch_to_datetime(epoch: Option<f64>) -> Option<DateTime<Utc>> {
    epoch
        .filter(|ts| ts.is_finite() && *ts > 0.0)
        .and_then(|ts| DateTime::from_timestamp(ts.trunc() as i64, 0))
}

fn run_mode(current: i32, selected: i32, delay_secs: f64) -> RunModeSetting {
    RunModeSetting {
        current,
        current_label: Category::RunMode.label(current),
        selected,
        selected_label: Category::RunMode.label(selected),
        delay_secs,
    }
}

// ── Event log ──────────────────────────────────────────────────────

impl From<Message> for EventLogEntry {
    fn from(m: Message) -> Self {
        Self {
            seqno: m.seqno,
            project: m.project,
            priority: m.pri,
            // Bodies arrive wrapped across lines.
            body: m.body.replace('\n', "").trim().to_owned(),
            timestamp: m.time,
        }
    }
}

// ── Status / version ───────────────────────────────────────────────

impl From<CcStatus> for DaemonStatus {
    fn from(s: CcStatus) -> Self {
        Self {
            network_status: s.network_status,
            network_status_label: Category::NetworkStatus.label(s.network_status),
            task_suspend_reason: s.task_suspend_reason,
            task_suspend_label: Category::SuspendReason.label(s.task_suspend_reason),
            network_suspend_reason: s.network_suspend_reason,
            network_suspend_label: Category::SuspendReason.label(s.network_suspend_reason),
            gpu_suspend_reason: s.gpu_suspend_reason,
            gpu_suspend_label: Category::SuspendReason.label(s.gpu_suspend_reason),
            task_mode: run_mode(s.task_mode, s.task_mode_perm, s.task_mode_delay),
            gpu_mode: run_mode(s.gpu_mode, s.gpu_mode_perm, s.gpu_mode_delay),
            network_mode: run_mode(s.network_mode, s.network_mode_perm, s.network_mode_delay),
            ams_password_error: s.ams_password_error,
        }
    }
}

impl From<VersionInfo> for ServerVersion {
    fn from(v: VersionInfo) -> Self {
        Self {
            major: v.major,
            minor: v.minor,
            release: v.release,
        }
    }
}

// ── Tasks ──────────────────────────────────────────────────────────

/// Label a task and resolve its app and project names.
///
/// The app is the first one whose short name occurs in the work-unit
/// name; the project is the first whose master URL occurs in the task's
/// project URL. Without a snapshot both names stay unresolved.
pub fn work_unit(r: TaskResult, snapshot: Option<&ClientState>) -> WorkUnit {
    let app = snapshot.and_then(|s| s.app_for_workunit(&r.wu_name));
    let project = snapshot.and_then(|s| s.project_for_url(&r.project_url));

    let active = r.active_task.map(|t| TaskActivity {
        scheduler_state: t.scheduler_state,
        scheduler_state_label: Category::SchedulerState.label(t.scheduler_state),
        task_state: t.active_task_state,
        task_state_label: Category::TaskState.label(t.active_task_state),
        fraction_done: t.fraction_done,
        elapsed_secs: t.elapsed_time,
        cpu_secs: t.current_cpu_time,
    });

    WorkUnit {
        app_name: app
            .map(|a| a.user_friendly_name.clone())
            .filter(|n| !n.is_empty()),
        non_cpu_intensive: app.is_some_and(|a| a.non_cpu_intensive),
        project_name: project
            .map(|p| p.project_name.clone())
            .filter(|n| !n.is_empty()),
        state: r.state,
        state_label: Category::State.label(r.state),
        ready_to_report: r.ready_to_report,
        suspended_via_gui: r.suspended_via_gui,
        estimated_remaining_secs: r.estimated_cpu_time_remaining,
        final_cpu_secs: r.final_cpu_time,
        report_deadline: epoch_to_datetime(r.report_deadline),
        received: epoch_to_datetime(r.received_time),
        active,
        name: r.name,
        wu_name: r.wu_name,
        project_url: r.project_url,
    }
}
