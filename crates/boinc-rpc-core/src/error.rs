// ── Core error types ──
//
// User-facing errors from boinc-rpc-core. Consumers never see framing or
// markup details directly; the `From<boinc_rpc_api::Error>` impl folds
// wire-level failures into session-level variants.

use thiserror::Error;

use crate::operation::OperationKind;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to daemon at {addr}: {reason}")]
    ConnectionFailed { addr: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Daemon disconnected")]
    Disconnected,

    #[error("Daemon did not reply within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    // ── Command errors ───────────────────────────────────────────────
    #[error("Request rejected by daemon: {message}")]
    Rejected { message: String },

    #[error("Unexpected reply from daemon: {message}")]
    MalformedReply { message: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    // ── Long-running operations ──────────────────────────────────────
    #[error("{kind} failed: {reason}")]
    OperationFailed { kind: OperationKind, reason: String },

    #[error("{kind} did not finish within {elapsed_ms}ms")]
    OperationTimedOut { kind: OperationKind, elapsed_ms: u64 },

    #[error("{kind} was cancelled")]
    OperationCancelled { kind: OperationKind },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether the session is unusable after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. }
                | Self::AuthenticationFailed { .. }
                | Self::Disconnected
                | Self::Timeout { .. }
                | Self::MalformedReply { .. }
        )
    }
}

// ── Conversion from wire-level errors ────────────────────────────────

impl From<boinc_rpc_api::Error> for CoreError {
    fn from(err: boinc_rpc_api::Error) -> Self {
        use boinc_rpc_api::Error as Api;

        match err {
            Api::Connect { addr, source } => CoreError::ConnectionFailed {
                addr,
                reason: source.to_string(),
            },
            Api::ConnectionClosed => CoreError::Disconnected,
            Api::Timeout { timeout_ms } => CoreError::Timeout { timeout_ms },
            Api::Io(e) => CoreError::ConnectionFailed {
                addr: String::new(),
                reason: e.to_string(),
            },
            Api::MalformedReply { message, body: _ } => CoreError::MalformedReply { message },
            Api::MissingElement { element } => CoreError::MalformedReply {
                message: format!("missing <{element}>"),
            },
            Api::Decode { element, message } => CoreError::MalformedReply {
                message: format!("<{element}>: {message}"),
            },
            Api::Authentication { message } => CoreError::AuthenticationFailed { message },
            Api::NotAuthenticated => CoreError::AuthenticationFailed {
                message: "session is not authenticated".into(),
            },
            Api::Rejected { message } => CoreError::Rejected { message },
        }
    }
}
