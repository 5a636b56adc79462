// ── Task domain types ──

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A task with its state labels and the names resolved from the
/// session's state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkUnit {
    pub name: String,
    pub wu_name: String,
    pub project_url: String,
    /// Project name from the snapshot, when the URL matches an attached project.
    pub project_name: Option<String>,
    /// User-facing application name from the snapshot.
    pub app_name: Option<String>,
    pub non_cpu_intensive: bool,

    pub state: i32,
    pub state_label: &'static str,
    pub ready_to_report: bool,
    pub suspended_via_gui: bool,

    pub estimated_remaining_secs: Option<f64>,
    pub final_cpu_secs: Option<f64>,
    pub report_deadline: Option<DateTime<Utc>>,
    pub received: Option<DateTime<Utc>>,

    /// Present while a process exists for the task.
    pub active: Option<TaskActivity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskActivity {
    pub scheduler_state: i32,
    pub scheduler_state_label: &'static str,
    pub task_state: i32,
    pub task_state_label: &'static str,
    pub fraction_done: Option<f64>,
    pub elapsed_secs: Option<f64>,
    pub cpu_secs: Option<f64>,
}

impl WorkUnit {
    /// Display name: the friendly app name when known, else the task name.
    pub fn display_name(&self) -> &str {
        self.app_name.as_deref().unwrap_or(&self.name)
    }

    pub fn progress(&self) -> Option<f64> {
        self.active.as_ref().and_then(|a| a.fraction_done)
    }
}
