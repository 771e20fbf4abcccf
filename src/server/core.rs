use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::watch;

use crate::client::handle_client;
use crate::config::{AddressFamily, ServerConfig};
use crate::error::GopherServerError;
use crate::error::handlers::handle_error;
use crate::server::slots::SlotTable;

/// Server context: configuration, run state and the shutdown signal shared
/// by the accept loop and every connection it spawns.
pub struct Server {
    config: Arc<ServerConfig>,
    running: AtomicBool,
    shutdown_tx: watch::Sender<bool>,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            config: Arc::new(config),
            running: AtomicBool::new(false),
            shutdown_tx,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Binds the configured address and serves until [`Server::shutdown`].
    pub async fn start(&self) -> Result<(), GopherServerError> {
        if self.is_running() {
            return Err(GopherServerError::AlreadyRunning);
        }
        let listener = bind_listener(&self.config)?;
        self.serve(listener).await
    }

    /// Asks the accept loop to stop. Open connections are closed and their
    /// tasks awaited before [`Server::serve`] returns.
    pub fn shutdown(&self) {
        info!("Shutdown requested");
        self.shutdown_tx.send_replace(true);
    }

    /// Runs the accept loop on an already bound listener.
    ///
    /// Each iteration first reclaims finished slots, then accepts at most one
    /// connection into a free slot. With every slot busy, pending connections
    /// wait in the kernel backlog.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), GopherServerError> {
        if self.running.swap(true, Ordering::AcqRel) {
            return Err(GopherServerError::AlreadyRunning);
        }

        let recv_timeout = self.config.recv_timeout();
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut slots = SlotTable::new(self.config.max_connections);
        let released = slots.release_notifier();

        info!(
            "Serving {} (max {} clients)",
            self.config.document_root,
            slots.capacity()
        );

        loop {
            let stopping = *shutdown_rx.borrow_and_update();
            if stopping {
                break;
            }

            let reaped = slots.reap_finished().await;
            if reaped > 0 {
                debug!("Reclaimed {} connection slot(s)", reaped);
            }

            let Some(index) = slots.free_slot() else {
                tokio::select! {
                    _ = released.notified() => {}
                    _ = shutdown_rx.changed() => {}
                    _ = tokio::time::sleep(recv_timeout) => {}
                }
                continue;
            };

            let accepted = tokio::select! {
                result = tokio::time::timeout(recv_timeout, listener.accept()) => result,
                _ = shutdown_rx.changed() => continue,
            };

            match accepted {
                // Timed out: go round again so the sweep and shutdown check run.
                Err(_) => continue,
                Ok(Err(e)) => {
                    error!("Failed to accept connection: {}", e);
                }
                Ok(Ok((stream, client_addr))) => {
                    info!("Client connected from {}", client_addr);
                    self.spawn_connection(&mut slots, index, stream, client_addr);
                }
            }
        }

        self.stop(listener, slots).await;
        Ok(())
    }

    /// Claims `index` and spawns the task serving `stream` in it.
    fn spawn_connection(
        &self,
        slots: &mut SlotTable,
        index: usize,
        stream: TcpStream,
        client_addr: SocketAddr,
    ) {
        let Some(mut lease) = slots.claim(index, client_addr) else {
            warn!("Slot {} unexpectedly busy, dropping {}", index, client_addr);
            return;
        };
        let config = Arc::clone(&self.config);

        let task = tokio::spawn(async move {
            tokio::select! {
                result = handle_client(stream, client_addr, config) => {
                    if let Err(e) = result {
                        handle_error(&e);
                    }
                }
                _ = lease.closed() => {
                    warn!("Connection from {} closed by server shutdown", client_addr);
                }
            }
            drop(lease);
        });

        slots.attach(index, task);
    }

    async fn stop(&self, listener: TcpListener, mut slots: SlotTable) {
        info!("Stopping the server...");
        drop(listener);

        let closed = slots.close_all().await;
        if closed > 0 {
            info!("Closed {} open connection(s)", closed);
        }

        self.running.store(false, Ordering::Release);
        info!("Server stopped");
    }
}

/// Creates the listening socket described by `config`.
///
/// The socket reuses its address and listens with the configured backlog.
pub fn bind_listener(config: &ServerConfig) -> Result<TcpListener, GopherServerError> {
    let listen_socket = config.listen_socket();

    if config.address_family == AddressFamily::Inet6 {
        return Err(GopherServerError::UnsupportedAddressFamily("inet6".into()));
    }

    let addr: SocketAddr = listen_socket
        .parse()
        .map_err(|e| GopherServerError::ConfigError(format!("Invalid listen address {}: {}", listen_socket, e)))?;
    if !addr.is_ipv4() {
        return Err(GopherServerError::UnsupportedAddressFamily(addr.ip().to_string()));
    }

    let bind = || -> std::io::Result<TcpListener> {
        let socket = TcpSocket::new_v4()?;
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        socket.listen(config.listen_backlog)
    };

    match bind() {
        Ok(listener) => {
            info!("Server bound to {}", listen_socket);
            Ok(listener)
        }
        Err(e) => {
            error!("Failed to bind to {}: {}", listen_socket, e);
            Err(GopherServerError::BindFailed(listen_socket, e))
        }
    }
}
