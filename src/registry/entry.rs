//! Registry records: identifiers and the entries bound to them.

use std::time::Instant;

use serde_json::{Map, Value};

use crate::transport::ConnectionHandle;

/// Client-chosen opaque identifier naming a logical endpoint.
///
/// Scoped to the process lifetime, never persisted. The hub attaches no
/// meaning to its shape; any string is a valid identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ClientId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One registry record: the connection currently reachable under an
/// identifier, plus whatever metadata the client supplied at registration.
#[derive(Debug, Clone)]
pub struct ClientEntry {
    /// Handle used for delivery. The entry does not own the connection's
    /// lifecycle; that stays with the transport.
    pub handle: ConnectionHandle,

    /// Opaque registration metadata, echoed in the ack and reported by
    /// snapshots. Routing never reads it.
    pub metadata: Map<String, Value>,

    /// When this entry was last written.
    pub registered_at: Instant,
}

impl ClientEntry {
    pub fn new(handle: ConnectionHandle, metadata: Map<String, Value>) -> Self {
        Self {
            handle,
            metadata,
            registered_at: Instant::now(),
        }
    }

    /// Liveness of the underlying connection.
    pub fn is_live(&self) -> bool {
        self.handle.is_open()
    }
}

/// Diagnostic view of one entry, as produced by registry snapshots.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub id: ClientId,
    pub session_id: u64,
    pub live: bool,
    pub metadata: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_display_and_eq() {
        let id = ClientId::new("alice");
        assert_eq!(id.to_string(), "alice");
        assert_eq!(id, ClientId::from("alice"));
        assert_ne!(id, ClientId::from("Alice"));
    }

    #[tokio::test]
    async fn test_entry_liveness_follows_handle() {
        let (handle, _rx) = ConnectionHandle::new(1);
        let entry = ClientEntry::new(handle.clone(), Map::new());
        assert!(entry.is_live());

        handle.close();
        assert!(!entry.is_live());
    }
}
