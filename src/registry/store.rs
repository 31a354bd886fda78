//! Client registry implementation
//!
//! The central map from identifier to live connection. This is the only
//! shared mutable state in the hub; every mutation and read goes through
//! the operations defined here, never through the raw map.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::transport::ConnectionHandle;

use super::entry::{ClientEntry, ClientId, ClientInfo};

/// Central registry of live registrations.
///
/// Thread-safe via `RwLock`. Lookups dominate (every relayed frame does
/// one), so concurrent read access matters more than write throughput.
pub struct ClientRegistry {
    /// Map of identifier to registration entry
    clients: RwLock<HashMap<ClientId, ClientEntry>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace the entry for `id`.
    ///
    /// A reconnecting client simply registers again; the newer connection
    /// wins. The superseded connection is not closed, only unreachable
    /// through the registry.
    pub async fn register(
        &self,
        id: ClientId,
        handle: ConnectionHandle,
        metadata: Map<String, Value>,
    ) {
        let session_id = handle.session_id();
        let entry = ClientEntry::new(handle, metadata);

        let mut clients = self.clients.write().await;
        match clients.insert(id.clone(), entry) {
            Some(prev) => {
                tracing::info!(
                    user = %id,
                    session_id = session_id,
                    superseded = prev.handle.session_id(),
                    "Client re-registered"
                );
            }
            None => {
                tracing::info!(
                    user = %id,
                    session_id = session_id,
                    "Client registered"
                );
            }
        }
    }

    /// Current entry for `id`, if any.
    pub async fn lookup(&self, id: &ClientId) -> Option<ClientEntry> {
        self.clients.read().await.get(id).cloned()
    }

    /// Remove the entry for `id`, but only while it still points at the
    /// connection identified by `session_id`.
    ///
    /// A close event from a superseded connection can arrive after a newer
    /// registration took the identifier; matching on connection identity
    /// keeps the newer entry in place. Returns whether an entry was
    /// removed.
    pub async fn remove(&self, id: &ClientId, session_id: u64) -> bool {
        let mut clients = self.clients.write().await;

        match clients.get(id) {
            Some(entry) if entry.handle.session_id() == session_id => {
                clients.remove(id);
                tracing::info!(
                    user = %id,
                    session_id = session_id,
                    "Client deregistered"
                );
                true
            }
            Some(entry) => {
                tracing::debug!(
                    user = %id,
                    current = entry.handle.session_id(),
                    closing = session_id,
                    "Skipping deregistration, identifier now belongs to a newer connection"
                );
                false
            }
            None => false,
        }
    }

    /// Diagnostic view of every entry. No ordering guarantee.
    pub async fn snapshot(&self) -> Vec<ClientInfo> {
        let clients = self.clients.read().await;
        clients
            .iter()
            .map(|(id, entry)| ClientInfo {
                id: id.clone(),
                session_id: entry.handle.session_id(),
                live: entry.is_live(),
                metadata: entry.metadata.clone(),
            })
            .collect()
    }

    /// Number of registrations on file.
    pub async fn count(&self) -> usize {
        self.clients.read().await.len()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}
