//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use boinc_rpc_config::ConfigError;
use boinc_rpc_core::{CoreError, OperationKind};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to daemon at {addr}")]
    #[diagnostic(
        code(boinc_rpc::connection_failed),
        help(
            "Check that the BOINC client is running and accepts GUI RPC\n\
             connections from this host (remote_hosts.cfg, --allow_remote_gui_rpc).\n\
             Address: {addr}"
        )
    )]
    ConnectionFailed {
        addr: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Daemon connection was lost")]
    #[diagnostic(code(boinc_rpc::disconnected))]
    Disconnected,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(boinc_rpc::auth_failed),
        help(
            "The GUI RPC password is the contents of gui_rpc_auth.cfg in the\n\
             BOINC data directory. Pass it with --password, or store it with:\n\
             boinc-rpc config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("No GUI RPC password configured for profile '{profile}'")]
    #[diagnostic(
        code(boinc_rpc::no_credentials),
        help(
            "Pass --password, set BOINC_RPC_PASSWORD, or point the profile's\n\
             auth_file at the daemon's gui_rpc_auth.cfg."
        )
    )]
    NoCredentials { profile: String },

    // ── Daemon ───────────────────────────────────────────────────────
    #[error("Daemon rejected the request: {message}")]
    #[diagnostic(code(boinc_rpc::rejected))]
    Rejected { message: String },

    #[error("Unexpected reply from daemon: {message}")]
    #[diagnostic(
        code(boinc_rpc::malformed_reply),
        help("Run with -vv to log the exchange.")
    )]
    MalformedReply { message: String },

    #[error("{kind} failed: {reason}")]
    #[diagnostic(code(boinc_rpc::operation_failed))]
    OperationFailed { kind: OperationKind, reason: String },

    #[error("{kind} was cancelled")]
    #[diagnostic(code(boinc_rpc::operation_cancelled))]
    OperationCancelled { kind: OperationKind },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(boinc_rpc::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(boinc_rpc::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(boinc_rpc::config))]
    Config(ConfigError),

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("{what} timed out after {millis}ms")]
    #[diagnostic(
        code(boinc_rpc::timeout),
        help("Increase the limit with --timeout (requests) or --wait (attach/detach).")
    )]
    Timeout { what: String, millis: u64 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Disconnected => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } | Self::OperationFailed { .. } => exit_code::REJECTED,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { addr, reason } => CliError::ConnectionFailed {
                addr,
                source: reason.into(),
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::Disconnected => CliError::Disconnected,

            CoreError::Timeout { timeout_ms } => CliError::Timeout {
                what: "request".into(),
                millis: timeout_ms,
            },

            CoreError::Rejected { message } => CliError::Rejected { message },

            CoreError::MalformedReply { message } | CoreError::Internal(message) => {
                CliError::MalformedReply { message }
            }

            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::OperationFailed { kind, reason } => {
                CliError::OperationFailed { kind, reason }
            }

            CoreError::OperationTimedOut { kind, elapsed_ms } => CliError::Timeout {
                what: kind.to_string(),
                millis: elapsed_ms,
            },

            CoreError::OperationCancelled { kind } => CliError::OperationCancelled { kind },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_class() {
        let auth = CliError::from(CoreError::AuthenticationFailed {
            message: "daemon rejected the password".into(),
        });
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let timed_out = CliError::from(CoreError::OperationTimedOut {
            kind: OperationKind::ProjectAttach,
            elapsed_ms: 60_000,
        });
        assert_eq!(timed_out.exit_code(), exit_code::TIMEOUT);
        assert_eq!(timed_out.to_string(), "project attach timed out after 60000ms");

        let rejected = CliError::from(CoreError::Rejected {
            message: "Already attached to project".into(),
        });
        assert_eq!(rejected.exit_code(), exit_code::REJECTED);
    }
}
