//! The routable address of one live connection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

/// Cloneable sending half of a connection.
///
/// The registry stores these and the delivery engine sends through them.
/// The open flag is the liveness signal delivery consults: it flips false
/// as soon as the connection task starts tearing down, which can be
/// before the registry entry is removed.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    session_id: u64,
    outbound: mpsc::UnboundedSender<String>,
    open: Arc<AtomicBool>,
}

impl ConnectionHandle {
    /// Create a handle and the receiver its connection task drains.
    pub fn new(session_id: u64) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        let handle = Self {
            session_id,
            outbound,
            open: Arc::new(AtomicBool::new(true)),
        };
        (handle, rx)
    }

    /// Identity of the connection this handle points at. Registry removal
    /// compares this, not the identifier, so a superseded connection
    /// cannot evict its successor.
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    /// Transport-reported readiness to accept a send.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Relaxed) && !self.outbound.is_closed()
    }

    /// Queue a frame for the connection's writer.
    ///
    /// Returns false when the connection no longer accepts frames; the
    /// frame is dropped, never buffered elsewhere.
    pub fn send(&self, frame: String) -> bool {
        if !self.is_open() {
            return false;
        }
        self.outbound.send(frame).is_ok()
    }

    /// Mark the connection as no longer live. Frames already queued may
    /// still drain; new sends are refused.
    pub fn close(&self) {
        self.open.store(false, Ordering::Relaxed);
    }
}
