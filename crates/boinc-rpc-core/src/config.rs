// ── Runtime connection configuration ──
//
// Describes *how* to reach one daemon: address, password, and timing.
// Carries credential data but never touches disk; the CLI (or any other
// consumer) builds a `ClientConfig` and hands it in.

use std::time::Duration;

use boinc_rpc_api::TransportConfig;
use secrecy::SecretString;

use crate::operation::OperationOptions;

/// Default GUI RPC port.
pub const DEFAULT_PORT: u16 = 31416;

/// Configuration for one daemon session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// GUI RPC password (contents of the daemon's `gui_rpc_auth.cfg`).
    pub password: SecretString,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Limit on one request/reply exchange.
    pub read_timeout: Duration,
    /// Interval between status polls of a long-running operation.
    pub poll_interval: Duration,
    /// Default deadline for a long-running operation.
    pub operation_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: DEFAULT_PORT,
            password: SecretString::from(String::new()),
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(500),
            operation_timeout: Duration::from_secs(60),
        }
    }
}

impl ClientConfig {
    /// `host:port`, for display and errors.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
        }
    }

    /// Operation defaults derived from this config.
    pub fn operation_options(&self) -> OperationOptions {
        OperationOptions {
            timeout: self.operation_timeout,
            poll_interval: self.poll_interval,
        }
    }
}
