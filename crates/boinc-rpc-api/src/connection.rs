// Single-flight GUI RPC connection
//
// The daemon handles one request at a time per socket and replies are only
// delimited by the sentinel, so a second request written before the first
// reply is read would interleave. An async mutex around the framed stream
// covers the whole write+read cycle; callers queue on it without polling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::codec::Framed;
use tracing::{debug, trace, warn};

use crate::codec::RpcCodec;
use crate::error::Error;
use crate::reply::Reply;
use crate::request::Request;

/// Byte stream a connection can run over: TCP in production, an in-memory
/// duplex pipe in tests.
pub trait RpcStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> RpcStream for T {}

/// Timeouts applied to the socket.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Limit on establishing the TCP connection.
    pub connect_timeout: Duration,
    /// Limit on one request/reply exchange.
    pub read_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(30),
        }
    }
}

/// One persistent connection to the daemon.
///
/// After any transport failure the connection is poisoned and every
/// later [`send`](Self::send) fails with [`Error::ConnectionClosed`].
pub struct Connection {
    peer: String,
    framed: Mutex<Framed<Box<dyn RpcStream>, RpcCodec>>,
    read_timeout: Duration,
    broken: AtomicBool,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("peer", &self.peer)
            .field("read_timeout", &self.read_timeout)
            .field("broken", &self.broken.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Open a TCP connection to `host:port`.
    pub async fn connect(host: &str, port: u16, config: &TransportConfig) -> Result<Self, Error> {
        let addr = format!("{host}:{port}");
        debug!(%addr, "connecting to daemon");

        let stream = tokio::time::timeout(config.connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| Error::Connect {
                addr: addr.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("no answer within {}ms", config.connect_timeout.as_millis()),
                ),
            })?
            .map_err(|source| Error::Connect {
                addr: addr.clone(),
                source,
            })?;
        stream.set_nodelay(true)?;

        Ok(Self::from_stream(stream, addr, config))
    }

    /// Wrap an already-open stream.
    pub fn from_stream(
        stream: impl RpcStream + 'static,
        peer: impl Into<String>,
        config: &TransportConfig,
    ) -> Self {
        let stream: Box<dyn RpcStream> = Box::new(stream);
        Self {
            peer: peer.into(),
            framed: Mutex::new(Framed::new(stream, RpcCodec::new())),
            read_timeout: config.read_timeout,
            broken: AtomicBool::new(false),
        }
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Whether the connection can still carry requests.
    pub fn is_open(&self) -> bool {
        !self.broken.load(Ordering::Acquire)
    }

    /// Send one request and wait for its reply.
    ///
    /// Concurrent callers are serialised; each waits for the previous
    /// exchange to finish before writing.
    pub async fn send(&self, request: &Request) -> Result<Reply, Error> {
        let mut framed = self.framed.lock().await;
        if !self.is_open() {
            return Err(Error::ConnectionClosed);
        }

        // Drop anything left over from a previous exchange.
        framed.read_buffer_mut().clear();
        framed.codec_mut().reset();

        let tag = request.tag();
        debug!(command = tag, "sending request");

        let exchange = async {
            framed.send(request.to_string()).await?;
            framed.next().await.ok_or(Error::ConnectionClosed)?
        };

        let result = match tokio::time::timeout(self.read_timeout, exchange).await {
            Ok(Ok(frame)) => {
                trace!(command = tag, bytes = frame.len(), "reply received");
                Reply::parse(&String::from_utf8_lossy(&frame))
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(Error::Timeout {
                timeout_ms: u64::try_from(self.read_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        };

        if let Err(ref e) = result {
            if e.is_transport() {
                warn!(command = tag, peer = %self.peer, error = %e, "connection poisoned");
                self.broken.store(true, Ordering::Release);
            }
        }
        result
    }

    /// Shut the stream down. Later sends fail with `ConnectionClosed`.
    pub async fn close(&self) -> Result<(), Error> {
        let mut framed = self.framed.lock().await;
        if self.broken.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        debug!(peer = %self.peer, "closing connection");
        framed.get_mut().shutdown().await?;
        Ok(())
    }
}
