// GUI RPC wire models
//
// Every value in a reply arrives as element text, so numeric fields go
// through `serde_helpers`. Fields the daemon omits on older versions are
// `#[serde(default)]`; unknown elements are ignored.

use serde::{Deserialize, Serialize};

use crate::serde_helpers::{flag, list, number, opt_number, opt_text};

// ── Client state ─────────────────────────────────────────────────────

/// `<client_state>` from `get_state`, reduced to what lookups need.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientState {
    #[serde(default, deserialize_with = "list")]
    pub project: Vec<Project>,
    #[serde(default, deserialize_with = "list")]
    pub app: Vec<App>,
    #[serde(default)]
    pub host_info: Option<HostInfo>,
    #[serde(default, deserialize_with = "opt_text")]
    pub platform_name: Option<String>,
    #[serde(default, deserialize_with = "opt_number")]
    pub core_client_major_version: Option<u32>,
    #[serde(default, deserialize_with = "opt_number")]
    pub core_client_minor_version: Option<u32>,
    #[serde(default, deserialize_with = "opt_number")]
    pub core_client_release: Option<u32>,
}

impl ClientState {
    /// First app whose name occurs in the given work-unit name.
    pub fn app_for_workunit(&self, wu_name: &str) -> Option<&App> {
        self.app.iter().find(|a| !a.name.is_empty() && wu_name.contains(&a.name))
    }

    /// First project whose master URL occurs in the given project URL.
    pub fn project_for_url(&self, project_url: &str) -> Option<&Project> {
        self.project
            .iter()
            .find(|p| !p.master_url.is_empty() && project_url.contains(&p.master_url))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostInfo {
    #[serde(default, deserialize_with = "opt_text")]
    pub domain_name: Option<String>,
    #[serde(default, deserialize_with = "opt_number")]
    pub p_ncpus: Option<u32>,
    #[serde(default, deserialize_with = "opt_text")]
    pub os_name: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub os_version: Option<String>,
}

/// A project the daemon is attached to.
///
/// Appears in `client_state` and in `get_project_status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub master_url: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(default, deserialize_with = "opt_text")]
    pub user_name: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub team_name: Option<String>,
    #[serde(default, deserialize_with = "opt_number")]
    pub user_total_credit: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub host_total_credit: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub resource_share: Option<f64>,
    #[serde(default, deserialize_with = "flag")]
    pub suspended_via_gui: bool,
    #[serde(default, deserialize_with = "flag")]
    pub dont_request_more_work: bool,
    #[serde(default, deserialize_with = "flag")]
    pub attached_via_acct_mgr: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct App {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub user_friendly_name: String,
    #[serde(default, deserialize_with = "flag")]
    pub non_cpu_intensive: bool,
}

// ── Results ──────────────────────────────────────────────────────────

/// One `<result>` from `get_results`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub wu_name: String,
    #[serde(default)]
    pub project_url: String,
    #[serde(default, deserialize_with = "number")]
    pub state: i32,
    #[serde(default, deserialize_with = "opt_number")]
    pub version_num: Option<u32>,
    #[serde(default, deserialize_with = "opt_number")]
    pub exit_status: Option<i32>,
    #[serde(default, deserialize_with = "opt_number")]
    pub final_cpu_time: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub final_elapsed_time: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub estimated_cpu_time_remaining: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub report_deadline: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub received_time: Option<f64>,
    #[serde(default, deserialize_with = "flag")]
    pub ready_to_report: bool,
    #[serde(default, deserialize_with = "flag")]
    pub suspended_via_gui: bool,
    #[serde(default)]
    pub active_task: Option<ActiveTask>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveTask {
    #[serde(default, deserialize_with = "number")]
    pub active_task_state: i32,
    #[serde(default, deserialize_with = "number")]
    pub scheduler_state: i32,
    #[serde(default, deserialize_with = "opt_number")]
    pub fraction_done: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub current_cpu_time: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub elapsed_time: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub slot: Option<u32>,
}

/// One `<old_result>` from `get_old_results`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OldResult {
    #[serde(default)]
    pub project_url: String,
    #[serde(default)]
    pub result_name: String,
    #[serde(default)]
    pub app_name: String,
    #[serde(default, deserialize_with = "number")]
    pub exit_status: i32,
    #[serde(default, deserialize_with = "number")]
    pub elapsed_time: f64,
    #[serde(default, deserialize_with = "number")]
    pub cpu_time: f64,
    #[serde(default, deserialize_with = "number")]
    pub completed_time: f64,
    #[serde(default, deserialize_with = "number")]
    pub create_time: f64,
}

// ── Daemon status ────────────────────────────────────────────────────

/// `<cc_status>`: run modes and suspend reasons as raw codes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CcStatus {
    #[serde(default, deserialize_with = "number")]
    pub network_status: i32,
    #[serde(default, deserialize_with = "flag")]
    pub ams_password_error: bool,
    #[serde(default, deserialize_with = "flag")]
    pub manager_must_quit: bool,
    #[serde(default, deserialize_with = "number")]
    pub task_suspend_reason: i32,
    #[serde(default, deserialize_with = "number")]
    pub network_suspend_reason: i32,
    #[serde(default, deserialize_with = "number")]
    pub gpu_suspend_reason: i32,
    #[serde(default, deserialize_with = "number")]
    pub task_mode: i32,
    #[serde(default, deserialize_with = "number")]
    pub task_mode_perm: i32,
    #[serde(default, deserialize_with = "number")]
    pub task_mode_delay: f64,
    #[serde(default, deserialize_with = "number")]
    pub gpu_mode: i32,
    #[serde(default, deserialize_with = "number")]
    pub gpu_mode_perm: i32,
    #[serde(default, deserialize_with = "number")]
    pub gpu_mode_delay: f64,
    #[serde(default, deserialize_with = "number")]
    pub network_mode: i32,
    #[serde(default, deserialize_with = "number")]
    pub network_mode_perm: i32,
    #[serde(default, deserialize_with = "number")]
    pub network_mode_delay: f64,
}

// ── Statistics / disk ────────────────────────────────────────────────

/// Per-project credit history from `get_statistics`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectStatistics {
    #[serde(default)]
    pub master_url: String,
    #[serde(default, deserialize_with = "list")]
    pub daily_statistics: Vec<DailyStatistics>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyStatistics {
    #[serde(default, deserialize_with = "number")]
    pub day: f64,
    #[serde(default, deserialize_with = "number")]
    pub user_total_credit: f64,
    #[serde(default, deserialize_with = "number")]
    pub user_expavg_credit: f64,
    #[serde(default, deserialize_with = "number")]
    pub host_total_credit: f64,
    #[serde(default, deserialize_with = "number")]
    pub host_expavg_credit: f64,
}

/// `<disk_usage_summary>`; all sizes in bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskUsage {
    #[serde(default, deserialize_with = "list")]
    pub project: Vec<ProjectDiskUsage>,
    #[serde(default, deserialize_with = "number")]
    pub d_total: f64,
    #[serde(default, deserialize_with = "number")]
    pub d_free: f64,
    #[serde(default, deserialize_with = "number")]
    pub d_boinc: f64,
    #[serde(default, deserialize_with = "number")]
    pub d_allowed: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDiskUsage {
    #[serde(default)]
    pub master_url: String,
    #[serde(default, deserialize_with = "number")]
    pub disk_usage: f64,
}

/// `<server_version>` from `exchange_versions`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    #[serde(default, deserialize_with = "number")]
    pub major: u32,
    #[serde(default, deserialize_with = "number")]
    pub minor: u32,
    #[serde(default, deserialize_with = "number")]
    pub release: u32,
}

// ── Event log ────────────────────────────────────────────────────────

/// One `<msg>` from `get_messages`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, deserialize_with = "opt_text")]
    pub project: Option<String>,
    #[serde(default, deserialize_with = "number")]
    pub pri: i32,
    #[serde(deserialize_with = "number")]
    pub seqno: u64,
    #[serde(default)]
    pub body: String,
    #[serde(default, deserialize_with = "number")]
    pub time: i64,
}

// ── Long-running operations ──────────────────────────────────────────

/// Status reply of `project_attach_poll` / `acct_mgr_rpc_poll`.
///
/// `error_num` is `-204` (in progress) until the daemon finishes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollReply {
    /// Always present; a reply without it says nothing about progress.
    #[serde(deserialize_with = "number")]
    pub error_num: i32,
    #[serde(default, deserialize_with = "list")]
    pub message: Vec<String>,
}

impl PollReply {
    /// Daemon messages joined into one line, `None` if there are none.
    pub fn message_text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .message
            .iter()
            .map(String::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}

/// `<acct_mgr_info>`: the account manager this daemon is attached to, if any.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcctMgrInfo {
    #[serde(default, deserialize_with = "opt_text")]
    pub acct_mgr_url: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub acct_mgr_name: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub have_credentials: bool,
    #[serde(default, deserialize_with = "flag")]
    pub cookie_required: bool,
    #[serde(default, deserialize_with = "opt_text")]
    pub cookie_failure_url: Option<String>,
}

impl AcctMgrInfo {
    pub fn is_attached(&self) -> bool {
        self.acct_mgr_url.is_some()
    }
}
