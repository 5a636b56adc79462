// ── Session-level domain model ──
//
// Types handed to consumers. Some are the wire models re-exported as-is;
// the rest add lookup labels, resolved names, and typed timestamps on top
// of raw daemon codes (see `convert`).

pub mod event;
pub mod status;
pub mod task;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use boinc_rpc_api::rpc::models::{
    AcctMgrInfo as AccountManagerInfo, App, ClientState, DailyStatistics, DiskUsage, HostInfo,
    OldResult, PollReply, Project as ProjectStatus, ProjectDiskUsage, ProjectStatistics,
};

pub use event::EventLogEntry;
pub use status::{DaemonStatus, RunModeSetting};
pub use task::{TaskActivity, WorkUnit};

/// Daemon version from `exchange_versions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub release: u32,
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.release)
    }
}
