//! Hub configuration

use std::net::SocketAddr;

use crate::transport::{DEFAULT_MAX_FRAME_SIZE, MIN_FRAME_SIZE};

/// Hub configuration options
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Address the relay listener binds to
    pub bind_addr: SocketAddr,

    /// Address the HTTP diagnostic surface binds to
    pub http_addr: SocketAddr,

    /// Maximum concurrent connections (0 = unlimited)
    pub max_connections: usize,

    /// Maximum inbound line length in bytes
    pub max_frame_size: usize,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5050)),
            http_addr: SocketAddr::from(([0, 0, 0, 0], 5051)),
            max_connections: 0, // Unlimited
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            tcp_nodelay: true, // Envelopes are tiny; don't batch them
        }
    }
}

impl HubConfig {
    /// Create a new config with a custom relay bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Defaults overlaid with environment overrides
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Set the relay bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the HTTP diagnostic bind address
    pub fn http_bind(mut self, addr: SocketAddr) -> Self {
        self.http_addr = addr;
        self
    }

    /// Set maximum connections
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the inbound frame cap
    pub fn max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size.max(MIN_FRAME_SIZE);
        self
    }

    /// Set TCP_NODELAY behavior
    pub fn tcp_nodelay(mut self, enabled: bool) -> Self {
        self.tcp_nodelay = enabled;
        self
    }

    /// Overlay `PORT` (relay) and `HUB_HTTP_PORT` (diagnostics) from the
    /// environment onto this config. Unparseable values are ignored with
    /// a warning.
    pub fn apply_env(mut self) -> Self {
        if let Ok(port) = std::env::var("PORT") {
            match port.parse::<u16>() {
                Ok(port) => self.bind_addr.set_port(port),
                Err(_) => tracing::warn!(value = %port, "Ignoring unparseable PORT"),
            }
        }
        if let Ok(port) = std::env::var("HUB_HTTP_PORT") {
            match port.parse::<u16>() {
                Ok(port) => self.http_addr.set_port(port),
                Err(_) => tracing::warn!(value = %port, "Ignoring unparseable HUB_HTTP_PORT"),
            }
        }
        self
    }
}
