// ── Client facade ──
//
// Session lifecycle for one daemon: connect, authenticate, fetch the
// initial state snapshot, then serve commands. Every exchange, including
// those issued by running operations, goes through `execute`, which sits
// on the connection's single-flight gate.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use boinc_rpc_api::{Connection, Reply, Request, RpcClient, RpcStream};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::model::ClientState;
use crate::operation::{self, OperationHandle, OperationOptions, OperationSpec};

// ── ConnectionState ──────────────────────────────────────────────

/// Session state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Authenticating,
    /// Authenticated and holding an initial snapshot.
    Ready,
    /// A transport or auth failure made the session unusable.
    Failed,
    Disconnected,
}

// ── Client ───────────────────────────────────────────────────────

/// A connected, authenticated session.
///
/// Cheaply cloneable via `Arc<ClientInner>`; clones share the connection,
/// the snapshot, and the cancellation scope of running operations.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    rpc: ArcSwapOption<RpcClient>,
    connection_state: watch::Sender<ConnectionState>,
    snapshot: ArcSwapOption<ClientState>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("addr", &self.inner.config.addr())
            .field("state", &*self.inner.connection_state.borrow())
            .finish_non_exhaustive()
    }
}

impl Client {
    fn new(config: ClientConfig) -> Self {
        let (connection_state, _) = watch::channel(ConnectionState::Connecting);
        Self {
            inner: Arc::new(ClientInner {
                config,
                rpc: ArcSwapOption::empty(),
                connection_state,
                snapshot: ArcSwapOption::empty(),
                cancel: CancellationToken::new(),
            }),
        }
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Connect over TCP, authenticate, and load the initial state.
    ///
    /// Returns only once the session is ready.
    pub async fn connect(config: ClientConfig) -> Result<Self, CoreError> {
        let client = Self::new(config);
        let config = &client.inner.config;
        debug!(addr = %config.addr(), "connecting");

        let conn = match Connection::connect(&config.host, config.port, &config.transport()).await {
            Ok(conn) => conn,
            Err(e) => {
                client.set_state(ConnectionState::Failed);
                return Err(e.into());
            }
        };
        client.establish(conn).await?;
        Ok(client)
    }

    /// Same as [`connect`](Self::connect) over an already-open stream.
    pub async fn connect_stream(
        config: ClientConfig,
        stream: impl RpcStream + 'static,
    ) -> Result<Self, CoreError> {
        let client = Self::new(config);
        let config = &client.inner.config;
        let conn = Connection::from_stream(stream, config.addr(), &config.transport());
        client.establish(conn).await?;
        Ok(client)
    }

    async fn establish(&self, conn: Connection) -> Result<(), CoreError> {
        let rpc = Arc::new(RpcClient::new(conn));

        self.set_state(ConnectionState::Authenticating);
        if let Err(e) = rpc.authorize(&self.inner.config.password).await {
            self.set_state(ConnectionState::Failed);
            if let Err(close) = rpc.close().await {
                debug!(error = %close, "close after failed auth (non-fatal)");
            }
            return Err(e.into());
        }
        self.inner.rpc.store(Some(rpc));

        // Ready always carries a snapshot.
        if let Err(e) = self.get_state().await {
            self.set_state(ConnectionState::Failed);
            self.close_rpc().await;
            return Err(e);
        }

        self.set_state(ConnectionState::Ready);
        info!(addr = %self.inner.config.addr(), "connected to daemon");
        Ok(())
    }

    /// Cancel running operations and close the connection.
    pub async fn disconnect(&self) {
        self.inner.cancel.cancel();
        self.close_rpc().await;
        self.set_state(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    async fn close_rpc(&self) {
        if let Some(rpc) = self.inner.rpc.swap(None) {
            if let Err(e) = rpc.close().await {
                debug!(error = %e, "close failed (non-fatal)");
            }
        }
    }

    /// One-shot: connect, run closure, disconnect.
    ///
    /// The closure may use its own error type as long as connect failures
    /// convert into it.
    pub async fn oneshot<F, Fut, T, E>(config: ClientConfig, f: F) -> Result<T, E>
    where
        F: FnOnce(Client) -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: From<CoreError>,
    {
        let client = Client::connect(config).await?;
        let result = f(client.clone()).await;
        client.disconnect().await;
        result
    }

    // ── State observation ────────────────────────────────────────

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Subscribe to session state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// Most recent `get_state` result.
    pub fn snapshot(&self) -> Option<Arc<ClientState>> {
        self.inner.snapshot.load_full()
    }

    pub(crate) fn store_snapshot(&self, state: ClientState) -> Arc<ClientState> {
        let state = Arc::new(state);
        self.inner.snapshot.store(Some(Arc::clone(&state)));
        state
    }

    pub(crate) fn cancel_token(&self) -> &CancellationToken {
        &self.inner.cancel
    }

    fn set_state(&self, state: ConnectionState) {
        self.inner.connection_state.send_replace(state);
    }

    // ── Command facade ───────────────────────────────────────────

    pub(crate) fn rpc(&self) -> Result<Arc<RpcClient>, CoreError> {
        self.inner.rpc.load_full().ok_or(CoreError::Disconnected)
    }

    /// Record a wire-level failure; transport errors end the session.
    pub(crate) fn track<T>(&self, result: Result<T, boinc_rpc_api::Error>) -> Result<T, CoreError> {
        result.map_err(|e| {
            if e.is_transport() && *self.inner.connection_state.borrow() == ConnectionState::Ready {
                warn!(error = %e, "session lost");
                self.set_state(ConnectionState::Failed);
            }
            CoreError::from(e)
        })
    }

    /// Send any command and return the decoded reply.
    pub async fn execute(&self, request: Request) -> Result<Reply, CoreError> {
        let rpc = self.rpc()?;
        self.track(rpc.execute(&request).await)
    }

    /// Send a command that must be acknowledged with `<success/>`.
    ///
    /// A missing acknowledgement is [`CoreError::Rejected`] carrying the
    /// daemon's error text; the session stays usable.
    pub async fn execute_action(&self, request: Request) -> Result<Reply, CoreError> {
        let rpc = self.rpc()?;
        self.track(rpc.action(&request).await)
    }

    // ── Long-running operations ──────────────────────────────────

    /// Start an operation with explicit options.
    pub fn run_operation(&self, spec: OperationSpec, options: OperationOptions) -> OperationHandle {
        operation::spawn(self.clone(), spec, options)
    }

    /// Attach to a project using its account key.
    pub fn attach_project(&self, url: &str, authenticator: &str, name: &str) -> OperationHandle {
        self.run_operation(
            OperationSpec::project_attach(url, authenticator, name),
            self.inner.config.operation_options(),
        )
    }

    /// Attach to an account manager.
    pub fn attach_account_manager(
        &self,
        url: &str,
        user: &str,
        password: &secrecy::SecretString,
    ) -> OperationHandle {
        self.run_operation(
            OperationSpec::account_manager_attach(url, user, password),
            self.inner.config.operation_options(),
        )
    }

    /// Detach from the current account manager.
    pub fn detach_account_manager(&self) -> OperationHandle {
        self.run_operation(
            OperationSpec::account_manager_detach(),
            self.inner.config.operation_options(),
        )
    }
}
