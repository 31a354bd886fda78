//! Inbound frame classification and dispatch.

use std::sync::Arc;

use crate::registry::{ClientId, ClientRegistry};
use crate::session::SessionState;
use crate::stats::HubStats;
use crate::transport::ConnectionHandle;
use crate::wire::{Envelope, RegisterAck};

use super::delivery::DeliveryEngine;

/// Turns raw inbound lines into registry updates or deliveries.
///
/// One router serves every connection; all per-connection state lives in
/// the caller's [`SessionState`].
pub struct MessageRouter {
    registry: Arc<ClientRegistry>,
    delivery: DeliveryEngine,
    stats: Arc<HubStats>,
}

impl MessageRouter {
    pub fn new(registry: Arc<ClientRegistry>, stats: Arc<HubStats>) -> Self {
        let delivery = DeliveryEngine::new(Arc::clone(&registry), Arc::clone(&stats));
        Self {
            registry,
            delivery,
            stats,
        }
    }

    /// Handle one inbound frame from `session`'s connection.
    ///
    /// Nothing in here is fatal: malformed frames and unrecognized kinds
    /// are logged and dropped, and the connection stays up.
    pub async fn dispatch(
        &self,
        raw: &str,
        session: &mut SessionState,
        handle: &ConnectionHandle,
    ) {
        self.stats.frame_received();
        session.frame_received();

        let envelope = match Envelope::decode(raw) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::debug!(
                    session_id = session.id(),
                    error = %err,
                    "Dropping undecodable frame"
                );
                return;
            }
        };

        match envelope {
            Envelope::Register(reg) => {
                let id = ClientId::new(reg.user_id.clone());
                self.registry
                    .register(id.clone(), handle.clone(), reg.metadata.clone())
                    .await;
                session.set_identity(id);
                self.stats.registration_applied();

                let ack = Envelope::Registered(RegisterAck {
                    user_id: reg.user_id,
                    metadata: reg.metadata,
                });
                if !handle.send(ack.encode()) {
                    tracing::debug!(
                        session_id = session.id(),
                        "Register ack not sent, connection already closing"
                    );
                }
            }
            Envelope::Relay(relay) => {
                let outcome = self.delivery.forward(&relay).await;
                tracing::trace!(
                    session_id = session.id(),
                    kind = %relay.kind,
                    outcome = ?outcome,
                    "Relay frame handled"
                );
            }
            Envelope::Registered(_) => {
                // Hub-emitted kind; harmless when a client echoes it back
                tracing::trace!(session_id = session.id(), "Ignoring inbound registered frame");
            }
            Envelope::Unknown { kind } => {
                tracing::debug!(
                    session_id = session.id(),
                    kind = %kind,
                    "Ignoring unrecognized message type"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    fn setup() -> (MessageRouter, Arc<ClientRegistry>, Arc<HubStats>) {
        let registry = Arc::new(ClientRegistry::new());
        let stats = Arc::new(HubStats::new());
        let router = MessageRouter::new(Arc::clone(&registry), Arc::clone(&stats));
        (router, registry, stats)
    }

    #[tokio::test]
    async fn test_register_applies_and_acks() {
        let (router, registry, stats) = setup();
        let (handle, mut rx) = ConnectionHandle::new(1);
        let mut session = SessionState::new(1, "127.0.0.1:4000".parse().unwrap());

        router
            .dispatch(
                r#"{"type":"register","userId":"alice","localIp":"10.0.0.7"}"#,
                &mut session,
                &handle,
            )
            .await;

        assert_eq!(session.identity(), Some(&ClientId::new("alice")));
        let entry = registry.lookup(&ClientId::new("alice")).await.unwrap();
        assert_eq!(entry.handle.session_id(), 1);
        assert_eq!(stats.snapshot().registrations, 1);

        let ack: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(ack["type"], "registered");
        assert_eq!(ack["userId"], "alice");
        assert_eq!(ack["localIp"], "10.0.0.7");
    }

    #[tokio::test]
    async fn test_malformed_frame_is_recoverable() {
        let (router, registry, stats) = setup();
        let (handle, mut rx) = ConnectionHandle::new(1);
        let mut session = SessionState::new(1, "127.0.0.1:4000".parse().unwrap());

        router.dispatch("this is not json", &mut session, &handle).await;
        router
            .dispatch(r#"{"type":"register"}"#, &mut session, &handle)
            .await;

        // Neither frame produced a response or a registration
        assert!(rx.try_recv().is_err());
        assert_eq!(registry.count().await, 0);
        assert_eq!(session.identity(), None);

        // The connection keeps working afterwards
        router
            .dispatch(r#"{"type":"register","userId":"alice"}"#, &mut session, &handle)
            .await;
        assert_eq!(registry.count().await, 1);
        assert_eq!(stats.snapshot().frames_received, 3);
    }

    #[tokio::test]
    async fn test_unknown_kind_silently_ignored() {
        let (router, registry, _stats) = setup();
        let (handle, mut rx) = ConnectionHandle::new(1);
        let mut session = SessionState::new(1, "127.0.0.1:4000".parse().unwrap());

        router
            .dispatch(r#"{"type":"presence","userId":"alice"}"#, &mut session, &handle)
            .await;

        assert!(rx.try_recv().is_err());
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn test_relay_from_unregistered_sender_is_allowed() {
        let (router, registry, _stats) = setup();
        let (bob, mut bob_rx) = ConnectionHandle::new(7);
        registry
            .register(ClientId::new("bob"), bob, serde_json::Map::new())
            .await;

        // The sender never registered; routing must not care
        let (sender, _rx) = ConnectionHandle::new(8);
        let mut session = SessionState::new(8, "127.0.0.1:4001".parse().unwrap());
        router
            .dispatch(
                r#"{"type":"message","to":"bob","from":"anon","message":"psst","timestamp":5}"#,
                &mut session,
                &sender,
            )
            .await;

        let frame: Value = serde_json::from_str(&bob_rx.recv().await.unwrap()).unwrap();
        assert_eq!(frame["from"], "anon");
        assert_eq!(frame["message"], "psst");
    }

    #[tokio::test]
    async fn test_reregister_on_same_connection_updates_identity() {
        let (router, registry, _stats) = setup();
        let (handle, _rx) = ConnectionHandle::new(3);
        let mut session = SessionState::new(3, "127.0.0.1:4002".parse().unwrap());

        router
            .dispatch(r#"{"type":"register","userId":"alice"}"#, &mut session, &handle)
            .await;
        router
            .dispatch(r#"{"type":"register","userId":"alice2"}"#, &mut session, &handle)
            .await;

        assert_eq!(session.identity(), Some(&ClientId::new("alice2")));
        assert!(registry.lookup(&ClientId::new("alice2")).await.is_some());
    }
}
