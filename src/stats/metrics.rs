//! Statistics and counters for the hub

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Point-in-time view of the hub counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HubStatsSnapshot {
    /// Connections accepted since startup
    pub connections_accepted: u64,
    /// Connections currently open
    pub connections_active: u64,
    /// Frames read off connections (decodable or not)
    pub frames_received: u64,
    /// Register frames applied
    pub registrations: u64,
    /// Relay frames handed to a recipient connection
    pub messages_delivered: u64,
    /// Relay frames dropped (recipient absent or not ready)
    pub messages_dropped: u64,
}

/// Process-lifetime counters, updated with relaxed atomics.
///
/// Cheap enough to bump on every frame; read by the health endpoint and
/// periodic logging, where exact cross-counter consistency is not needed.
#[derive(Debug, Default)]
pub struct HubStats {
    connections_accepted: AtomicU64,
    connections_active: AtomicU64,
    frames_received: AtomicU64,
    registrations: AtomicU64,
    messages_delivered: AtomicU64,
    messages_dropped: AtomicU64,
}

impl HubStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn frame_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn registration_applied(&self) {
        self.registrations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn message_delivered(&self) {
        self.messages_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn message_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> HubStatsSnapshot {
        HubStatsSnapshot {
            connections_accepted: self.connections_accepted.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            registrations: self.registrations.load(Ordering::Relaxed),
            messages_delivered: self.messages_delivered.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
        }
    }
}
