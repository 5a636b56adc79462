// ── Daemon status domain types ──

use serde::Serialize;

/// Current and user-selected value of one run mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunModeSetting {
    pub current: i32,
    pub current_label: &'static str,
    pub selected: i32,
    pub selected_label: &'static str,
    /// Seconds until a temporary mode reverts to the selected one.
    pub delay_secs: f64,
}

/// `cc_status` with every code resolved to its label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaemonStatus {
    pub network_status: i32,
    pub network_status_label: &'static str,

    pub task_suspend_reason: i32,
    pub task_suspend_label: &'static str,
    pub network_suspend_reason: i32,
    pub network_suspend_label: &'static str,
    pub gpu_suspend_reason: i32,
    pub gpu_suspend_label: &'static str,

    pub task_mode: RunModeSetting,
    pub gpu_mode: RunModeSetting,
    pub network_mode: RunModeSetting,

    /// The account manager rejected the stored password.
    pub ams_password_error: bool,
}

impl DaemonStatus {
    pub fn tasks_suspended(&self) -> bool {
        self.task_suspend_reason != 0
    }

    pub fn network_suspended(&self) -> bool {
        self.network_suspend_reason != 0
    }

    pub fn gpu_suspended(&self) -> bool {
        self.gpu_suspend_reason != 0
    }
}
