// boinc-rpc-core: Session layer between boinc-rpc-api and consumers (CLI).

pub mod client;
pub mod commands;
pub mod config;
pub mod convert;
pub mod error;
pub mod lookup;
pub mod model;
pub mod operation;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::{Client, ConnectionState};
pub use config::{ClientConfig, DEFAULT_PORT};
pub use error::CoreError;
pub use lookup::{Category, ERR_IN_PROGRESS, category_names, label_for};
pub use operation::{
    LogCursor, MAX_TIMEOUT, MIN_POLL_INTERVAL, OperationHandle, OperationKind, OperationOptions,
    OperationReport, OperationSpec, OperationState, PollOutcome,
};

// Raw request/reply types for commands without a typed wrapper.
pub use boinc_rpc_api::{Reply, Request};

pub use model::{
    AccountManagerInfo, App, ClientState, DaemonStatus, DailyStatistics, DiskUsage, EventLogEntry,
    HostInfo, OldResult, PollReply, ProjectDiskUsage, ProjectStatistics, ProjectStatus,
    RunModeSetting, ServerVersion, TaskActivity, WorkUnit,
};
