use thiserror::Error;

/// Top-level error type for the `boinc-rpc-api` crate.
///
/// Covers every failure mode of a GUI RPC connection: transport,
/// framing/decoding, authentication, and daemon-level rejections.
/// `boinc-rpc-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// TCP connect to the daemon failed.
    #[error("Cannot connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The stream ended, or an earlier failure made the connection unusable.
    #[error("Connection closed")]
    ConnectionClosed,

    /// No complete reply arrived within the read timeout.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Socket-level I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ── Data ────────────────────────────────────────────────────────
    /// The reply was not well-formed markup, or exceeded the size limit.
    #[error("Malformed reply: {message}")]
    MalformedReply { message: String, body: String },

    /// The reply parsed but lacks the element a command expects.
    #[error("Reply is missing <{element}>")]
    MissingElement { element: String },

    /// The expected element was present but could not be decoded.
    #[error("Cannot decode <{element}>: {message}")]
    Decode { element: String, message: String },

    // ── Authentication ──────────────────────────────────────────────
    /// The daemon rejected the handshake (bad password, missing nonce, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// A non-auth command was issued before the handshake completed.
    #[error("Not authenticated -- complete the handshake first")]
    NotAuthenticated,

    // ── Daemon ──────────────────────────────────────────────────────
    /// The daemon replied without its success marker.
    #[error("Request rejected by daemon: {message}")]
    Rejected { message: String },
}

impl Error {
    /// Returns `true` if this error leaves the connection unusable.
    ///
    /// Transport and framing failures poison the connection; command-level
    /// failures (`Rejected`, `MissingElement`, `Decode`) do not.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. }
                | Self::ConnectionClosed
                | Self::Timeout { .. }
                | Self::Io(_)
                | Self::MalformedReply { .. }
        )
    }

    /// Returns `true` for handshake failures and auth-gate violations.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::NotAuthenticated)
    }
}
