// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sheet server — accepts HTTP connections and answers `/generate` requests.
//
// The listener runs in its own Tokio task; each connection is handled in a
// spawned task of its own and carries nothing but the shared, read-only
// configuration. Shutdown is signalled through a `Notify`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use labelsheet_core::AppConfig;
use labelsheet_core::error::{LabelsheetError, Result};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::http::{read_request, write_response};
use crate::routes::{error_response, handle};

/// Lifecycle state of the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    Stopped,
    Starting,
    Running,
}

/// State shared across all connection-handling tasks.
struct SharedState {
    config: Arc<AppConfig>,
    active_connections: Arc<AtomicU32>,
}

pub struct SheetServer {
    config: Arc<AppConfig>,
    status: ServerStatus,
    /// Address actually bound; known once started.
    local_addr: Option<SocketAddr>,
    shutdown_signal: Arc<Notify>,
    task_handle: Option<JoinHandle<()>>,
    active_connections: Arc<AtomicU32>,
}

impl SheetServer {
    /// Create a stopped server. Call [`start`](Self::start) to begin
    /// accepting connections.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            status: ServerStatus::Stopped,
            local_addr: None,
            shutdown_signal: Arc::new(Notify::new()),
            task_handle: None,
            active_connections: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn status(&self) -> ServerStatus {
        self.status
    }

    /// Bound address while running. Port 0 in the configuration resolves to
    /// the ephemeral port picked by the OS.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn active_connections(&self) -> u32 {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Bind the listener and spawn the accept loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is already in use or the listener
    /// cannot be created.
    pub async fn start(&mut self) -> Result<SocketAddr> {
        if let (ServerStatus::Running, Some(addr)) = (self.status, self.local_addr) {
            debug!(%addr, "sheet server already running");
            return Ok(addr);
        }

        self.status = ServerStatus::Starting;

        let bind_addr = SocketAddr::new(self.config.bind_addr, self.config.server_port);
        let listener = match TcpListener::bind(bind_addr).await {
            Ok(listener) => listener,
            Err(e) => {
                self.status = ServerStatus::Stopped;
                return Err(LabelsheetError::Server(format!("bind {bind_addr}: {e}")));
            }
        };
        let local_addr = listener
            .local_addr()
            .map_err(|e| LabelsheetError::Server(format!("local address: {e}")))?;

        info!(addr = %local_addr, "sheet server listening");

        let shared = Arc::new(SharedState {
            config: Arc::clone(&self.config),
            active_connections: Arc::clone(&self.active_connections),
        });
        let shutdown = Arc::clone(&self.shutdown_signal);

        let handle = tokio::spawn(async move {
            Self::accept_loop(listener, shutdown, shared).await;
        });

        self.task_handle = Some(handle);
        self.local_addr = Some(local_addr);
        self.status = ServerStatus::Running;
        Ok(local_addr)
    }

    /// Stop accepting connections and wait for the accept loop to exit.
    /// Requests already being handled run to completion.
    pub async fn stop(&mut self) -> Result<()> {
        if self.status != ServerStatus::Running {
            return Ok(());
        }

        info!(addr = ?self.local_addr, "stopping sheet server");
        self.shutdown_signal.notify_one();

        if let Some(handle) = self.task_handle.take() {
            handle
                .await
                .map_err(|e| LabelsheetError::Server(format!("task join: {e}")))?;
        }

        self.status = ServerStatus::Stopped;
        self.local_addr = None;
        info!("sheet server stopped");
        Ok(())
    }

    async fn accept_loop(listener: TcpListener, shutdown: Arc<Notify>, shared: Arc<SharedState>) {
        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    debug!("accept loop received shutdown signal");
                    break;
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            debug!(peer = %peer_addr, "incoming connection");
                            let state = Arc::clone(&shared);
                            tokio::spawn(async move {
                                state.active_connections.fetch_add(1, Ordering::Relaxed);
                                if let Err(e) = Self::handle_connection(stream, peer_addr, &state).await {
                                    warn!(peer = %peer_addr, error = %e, "connection handler error");
                                }
                                state.active_connections.fetch_sub(1, Ordering::Relaxed);
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "failed to accept connection");
                        }
                    }
                }
            }
        }
    }

    /// Read one request, route it, write the response, close.
    async fn handle_connection(
        mut stream: TcpStream,
        peer_addr: SocketAddr,
        state: &SharedState,
    ) -> Result<()> {
        let config = &state.config;
        let response = match read_request(&mut stream, config.max_request_bytes).await {
            Ok(Some(request)) => {
                debug!(
                    peer = %peer_addr,
                    method = %request.method,
                    path = %request.path,
                    body_bytes = request.body.len(),
                    "request received"
                );
                handle(request, Arc::clone(config)).await
            }
            Ok(None) => {
                debug!(peer = %peer_addr, "empty connection -- closing");
                return Ok(());
            }
            Err(err @ LabelsheetError::Server(_)) => return Err(err),
            Err(err) => error_response(&err, config),
        };

        write_response(&mut stream, &response).await?;
        info!(
            peer = %peer_addr,
            status = response.status,
            bytes = response.body.len(),
            "response sent"
        );
        Ok(())
    }
}
