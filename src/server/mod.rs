//! HTTP endpoint exposing the health verdict.
//!
//! Routes:
//! - `GET <url>` from the check file: `statusCodeHealthy` with `{}` when every
//!   condition holds, `statusCodeUnhealthy` with `{"errors": [...]}` otherwise
//! - `GET /processes`: the process snapshot used for evaluation
//! - `POST /shutdown`: stop accepting connections and exit once drained
//!
//! # Example
//!
//! ```rust,ignore
//! use healthcheck_api::server::Server;
//! use healthcheck_api::system::SystemProcesses;
//!
//! let server = Server::bind(addr, checks, checker, SystemProcesses)?;
//! server.run().await?;
//! server.wait_for_drain(Duration::from_secs(5)).await;
//! ```
//!
//! # Graceful Shutdown
//!
//! [`Server::trigger_shutdown`] (or `POST /shutdown`) stops the accept loop.
//! Open connections finish their in-flight request and close, and
//! [`Server::wait_for_drain`] waits until none are left.

mod response;
mod routes;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

pub use routes::{PROCESSES_PATH, SHUTDOWN_PATH};

use crate::config::CheckConfig;
use crate::health::HealthChecker;
use crate::system::ProcessSource;
use routes::AppState;

/// Cloneable trigger for graceful shutdown.
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
    initiated: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            initiated: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Signal shutdown. Returns false if it was already signalled.
    pub fn trigger(&self) -> bool {
        if self.initiated.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.tx.send_replace(true);
        true
    }

    pub fn is_triggered(&self) -> bool {
        self.initiated.load(Ordering::SeqCst)
    }

    /// Resolves once shutdown has been signalled.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // Err only when the sender is gone, and we hold it
        let _ = rx.wait_for(|stop| *stop).await;
    }
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Health endpoint server.
///
/// Generic over the [`ProcessSource`] so tests can serve a fixed snapshot.
pub struct Server<P: ProcessSource> {
    listener: std::net::TcpListener,
    local_addr: SocketAddr,
    state: Arc<AppState<P>>,
    shutdown: ShutdownHandle,
    /// Open client connections
    active_connections: Arc<AtomicUsize>,
}

impl<P: ProcessSource> Server<P> {
    /// Bind the listening socket. Port 0 picks a free port, see
    /// [`Server::local_addr`].
    pub fn bind(
        addr: SocketAddr,
        checks: CheckConfig,
        checker: HealthChecker,
        processes: P,
    ) -> std::io::Result<Self> {
        let listener = Self::create_listener(addr)?;
        let local_addr = listener.local_addr()?;
        let shutdown = ShutdownHandle::new();

        let state = Arc::new(AppState {
            checks: Arc::new(checks),
            checker: Arc::new(checker),
            processes: Arc::new(processes),
            shutdown: shutdown.clone(),
        });

        Ok(Self {
            listener,
            local_addr,
            state,
            shutdown,
            active_connections: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn create_listener(addr: SocketAddr) -> std::io::Result<std::net::TcpListener> {
        let domain = if addr.is_ipv6() {
            Domain::IPV6
        } else {
            Domain::IPV4
        };

        let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
        socket.set_reuse_address(true)?;
        socket.set_nonblocking(true)?;
        socket.bind(&addr.into())?;
        socket.listen(1024)?;

        Ok(socket.into())
    }

    /// Address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Current open connections.
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Handle for stopping the server from another task.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Accept connections until shutdown is triggered.
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let listener = TcpListener::from_std(self.listener.try_clone()?)?;
        info!(
            "Health endpoint listening on http://{}{}",
            self.local_addr, self.state.checks.url
        );

        let mut shutdown_rx = self.shutdown.tx.subscribe();
        if *shutdown_rx.borrow_and_update() {
            return Ok(());
        }

        loop {
            tokio::select! {
                result = listener.accept() => {
                    let (stream, remote_addr) = match result {
                        Ok(conn) => conn,
                        Err(e) => {
                            error!("Accept error: {}", e);
                            continue;
                        }
                    };
                    let _ = stream.set_nodelay(true);

                    let state = Arc::clone(&self.state);
                    let connections = Arc::clone(&self.active_connections);
                    let conn_shutdown = self.shutdown.tx.subscribe();

                    tokio::spawn(serve_connection(stream, remote_addr, state, connections, conn_shutdown));
                }
                _ = shutdown_rx.changed() => {
                    debug!("Shutdown signal received, stopping accept loop");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Trigger graceful shutdown.
    pub fn trigger_shutdown(&self) {
        self.shutdown.trigger();
    }

    /// Wait for all active connections to drain.
    /// Returns true if drained successfully, false if timeout was reached.
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        let start = std::time::Instant::now();
        let check_interval = Duration::from_millis(50);

        loop {
            let active = self.active_connections.load(Ordering::Relaxed);
            if active == 0 {
                return true;
            }

            if start.elapsed() >= timeout {
                warn!("Drain timeout reached with {} active connections", active);
                return false;
            }

            debug!("Waiting for {} connections to drain...", active);
            tokio::time::sleep(check_interval).await;
        }
    }
}

/// Decrements the open connection count when the connection task ends.
struct ConnectionGuard(Arc<AtomicUsize>);

impl ConnectionGuard {
    fn new(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self(counter)
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

async fn serve_connection<P: ProcessSource>(
    stream: TcpStream,
    remote_addr: SocketAddr,
    state: Arc<AppState<P>>,
    connections: Arc<AtomicUsize>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let _guard = ConnectionGuard::new(connections);

    let service = service_fn(move |req| Arc::clone(&state).handle(req));
    let conn = http1::Builder::new()
        .keep_alive(true)
        .serve_connection(TokioIo::new(stream), service);
    tokio::pin!(conn);

    let result = tokio::select! {
        result = conn.as_mut() => result,
        _ = async { shutdown_rx.wait_for(|stop| *stop).await.is_ok() } => {
            // Finish the in-flight request, then close
            conn.as_mut().graceful_shutdown();
            conn.await
        }
    };

    if let Err(e) = result {
        if !is_connection_error(&e) {
            debug!(%remote_addr, "connection error: {:?}", e);
        }
    }
}

fn is_connection_error(err: &hyper::Error) -> bool {
    if err.is_incomplete_message() || err.is_timeout() {
        return true;
    }
    let text = format!("{:?}", err);
    text.contains("connection reset")
        || text.contains("Connection reset")
        || text.contains("broken pipe")
        || text.contains("os error 104")
        || text.contains("os error 32")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthConfig;
    use crate::system::FixedProcesses;

    fn server() -> Server<FixedProcesses> {
        Server::bind(
            "127.0.0.1:0".parse().unwrap(),
            CheckConfig::default(),
            HealthChecker::new(HealthConfig::default()).unwrap(),
            FixedProcesses::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_bind_ephemeral_port() {
        let server = server();
        assert_ne!(server.local_addr().port(), 0);
        assert_eq!(server.active_connections(), 0);
    }

    #[test]
    fn test_shutdown_handle() {
        let handle = ShutdownHandle::new();
        assert!(!handle.is_triggered());
        assert!(handle.trigger());
        assert!(handle.is_triggered());
        assert!(!handle.trigger());
        tokio_test::block_on(handle.wait());
    }

    #[tokio::test]
    async fn test_run_returns_after_shutdown() {
        let server = server();
        let handle = server.shutdown_handle();

        let stopper = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            handle.trigger();
        };
        let (result, _) = tokio::join!(server.run(), stopper);
        assert!(result.is_ok());
        assert!(server.wait_for_drain(Duration::from_millis(100)).await);
    }

    #[tokio::test]
    async fn test_run_after_shutdown_is_noop() {
        let server = server();
        server.trigger_shutdown();
        assert!(server.run().await.is_ok());
    }
}
