//! Per-connection session record
//!
//! Tracks one connection from accept to close: its identity slot and a
//! few counters. This replaces closed-over mutable locals; the router
//! writes the identity when a register frame is applied, and close-time
//! cleanup reads it back.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use crate::registry::ClientId;

/// State carried by one connection's task for its whole lifetime.
#[derive(Debug)]
pub struct SessionState {
    /// Unique session ID, assigned at accept time
    session_id: u64,

    /// Remote peer address
    peer_addr: SocketAddr,

    /// Connection start time
    connected_at: Instant,

    /// Identifier this connection most recently registered under
    identity: Option<ClientId>,

    /// Frames read off this connection, decodable or not
    frames_received: u64,
}

impl SessionState {
    /// Create the record for a freshly accepted connection. It starts
    /// unregistered.
    pub fn new(session_id: u64, peer_addr: SocketAddr) -> Self {
        Self {
            session_id,
            peer_addr,
            connected_at: Instant::now(),
            identity: None,
            frames_received: 0,
        }
    }

    pub fn id(&self) -> u64 {
        self.session_id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// How long the connection has been up.
    pub fn uptime(&self) -> Duration {
        self.connected_at.elapsed()
    }

    /// Identifier currently bound to this connection, if any.
    pub fn identity(&self) -> Option<&ClientId> {
        self.identity.as_ref()
    }

    pub fn is_registered(&self) -> bool {
        self.identity.is_some()
    }

    /// Bind this connection to an identifier.
    ///
    /// A later register replaces the slot; only the latest identifier is
    /// deregistered when the connection closes.
    pub fn set_identity(&mut self, id: ClientId) {
        if let Some(prev) = &self.identity {
            if prev != &id {
                tracing::debug!(
                    session_id = self.session_id,
                    previous = %prev,
                    new = %id,
                    "Session switched identity"
                );
            }
        }
        self.identity = Some(id);
    }

    /// Take the identity out for close-time cleanup, leaving the slot
    /// empty.
    pub fn take_identity(&mut self) -> Option<ClientId> {
        self.identity.take()
    }

    pub(crate) fn frame_received(&mut self) {
        self.frames_received += 1;
    }

    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn addr() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 5050)
    }

    #[test]
    fn test_new_session_is_unregistered() {
        let state = SessionState::new(1, addr());
        assert_eq!(state.id(), 1);
        assert!(!state.is_registered());
        assert_eq!(state.identity(), None);
        assert_eq!(state.frames_received(), 0);
    }

    #[test]
    fn test_identity_slot_holds_latest() {
        let mut state = SessionState::new(1, addr());

        state.set_identity(ClientId::new("alice"));
        assert_eq!(state.identity(), Some(&ClientId::new("alice")));

        state.set_identity(ClientId::new("alice2"));
        assert_eq!(state.identity(), Some(&ClientId::new("alice2")));
        assert!(state.is_registered());
    }

    #[test]
    fn test_take_identity_empties_the_slot() {
        let mut state = SessionState::new(1, addr());
        state.set_identity(ClientId::new("alice"));

        assert_eq!(state.take_identity(), Some(ClientId::new("alice")));
        assert_eq!(state.take_identity(), None);
        assert!(!state.is_registered());
    }

    #[test]
    fn test_frame_counter() {
        let mut state = SessionState::new(1, addr());
        state.frame_received();
        state.frame_received();
        assert_eq!(state.frames_received(), 2);
    }
}
