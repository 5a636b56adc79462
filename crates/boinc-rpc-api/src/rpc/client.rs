use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tracing::debug;

use crate::auth::AuthState;
use crate::connection::{Connection, TransportConfig};
use crate::error::Error;
use crate::reply::Reply;
use crate::request::Request;

/// Auth-gated client over one daemon connection.
///
/// Commands issued before [`authorize`](Self::authorize) succeeds fail with
/// [`Error::NotAuthenticated`] without touching the socket.
#[derive(Debug)]
pub struct RpcClient {
    conn: Connection,
    /// Handshake state; the lock also serialises handshake attempts.
    pub(crate) auth: Mutex<AuthState>,
    authenticated: AtomicBool,
}

impl RpcClient {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            auth: Mutex::new(AuthState::Unauthenticated),
            authenticated: AtomicBool::new(false),
        }
    }

    /// Connect over TCP; the handshake is still pending.
    pub async fn connect(host: &str, port: u16, config: &TransportConfig) -> Result<Self, Error> {
        Ok(Self::new(Connection::connect(host, port, config).await?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::Acquire)
    }

    pub(crate) fn mark_authenticated(&self) {
        self.authenticated.store(true, Ordering::Release);
    }

    /// Current handshake state.
    pub async fn auth_state(&self) -> AuthState {
        *self.auth.lock().await
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send any command and return the decoded reply.
    ///
    /// Non-auth commands require a completed handshake. A reply carrying
    /// `<unauthorized/>` is reported as [`Error::NotAuthenticated`].
    pub async fn execute(&self, request: &Request) -> Result<Reply, Error> {
        if !request.is_auth() && !self.is_authenticated() {
            debug!(command = request.tag(), "rejected before handshake");
            return Err(Error::NotAuthenticated);
        }
        let reply = self.conn.send(request).await?;
        if reply.is_unauthorized() {
            return Err(Error::NotAuthenticated);
        }
        Ok(reply)
    }

    /// Send a command that must be acknowledged with `<success/>`.
    pub async fn action(&self, request: &Request) -> Result<Reply, Error> {
        let reply = self.execute(request).await?;
        reply.require_success()?;
        Ok(reply)
    }

    /// Close the underlying connection.
    pub async fn close(&self) -> Result<(), Error> {
        self.conn.close().await
    }
}
