//! Hub server listener
//!
//! Handles the TCP accept loop and spawns one connection task per client.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::error::Result;
use crate::registry::ClientRegistry;
use crate::routing::MessageRouter;
use crate::server::config::HubConfig;
use crate::session::connection::Connection;
use crate::stats::HubStats;

/// The presence-and-relay hub.
///
/// Owns the registry, router, and stats shared by every connection.
pub struct HubServer {
    config: HubConfig,
    registry: Arc<ClientRegistry>,
    router: Arc<MessageRouter>,
    stats: Arc<HubStats>,
    next_session_id: AtomicU64,
    connection_semaphore: Option<Arc<Semaphore>>,
}

impl HubServer {
    /// Create a new hub with the given configuration
    pub fn new(config: HubConfig) -> Self {
        let registry = Arc::new(ClientRegistry::new());
        let stats = Arc::new(HubStats::new());
        let router = Arc::new(MessageRouter::new(
            Arc::clone(&registry),
            Arc::clone(&stats),
        ));

        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        Self {
            config,
            registry,
            router,
            stats,
            next_session_id: AtomicU64::new(1),
            connection_semaphore,
        }
    }

    /// Get a reference to the client registry
    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    /// Get a reference to the hub counters
    pub fn stats(&self) -> &Arc<HubStats> {
        &self.stats
    }

    /// Get the configured relay bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Run the hub
    ///
    /// This method blocks until the server is shut down.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Hub listening");

        self.serve(listener).await
    }

    /// Run the accept loop on a listener the caller already bound.
    ///
    /// Binding separately is how callers (and tests) learn the actual
    /// port when the configured one is 0.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    /// Run the hub with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Hub listening");

        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = self.serve(listener) => result,
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        // Check connection limit
        let permit = if let Some(ref sem) = self.connection_semaphore {
            match sem.clone().try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    tracing::warn!(peer = %peer_addr, "Connection rejected: limit reached");
                    return;
                }
            }
        } else {
            None
        };

        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            session_id = session_id,
            peer = %peer_addr,
            "New connection"
        );

        if let Err(e) = self.configure_socket(&socket) {
            tracing::error!(error = %e, "Failed to configure socket");
            return;
        }

        self.stats.connection_opened();

        let connection = Connection::new(
            session_id,
            socket,
            peer_addr,
            self.config.max_frame_size,
            Arc::clone(&self.router),
            Arc::clone(&self.registry),
            Arc::clone(&self.stats),
        );

        tokio::spawn(async move {
            // The permit rides along so the slot frees when the
            // connection task finishes, not when accept returns
            let _permit = permit;
            connection.run().await;
        });
    }

    fn configure_socket(&self, socket: &TcpStream) -> std::io::Result<()> {
        if self.config.tcp_nodelay {
            socket.set_nodelay(true)?;
        }

        Ok(())
    }
}
