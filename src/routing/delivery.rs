//! Best-effort forwarding to a registered recipient.

use std::sync::Arc;

use crate::registry::{ClientId, ClientRegistry};
use crate::stats::HubStats;
use crate::wire::{Envelope, Relay};

/// What became of one forwarded frame.
///
/// None of these are errors from the sender's point of view; the hub
/// never reports delivery failure back. Delivery is at-most-once with no
/// acknowledgement, retry, or buffering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The frame was handed to the recipient's connection.
    Delivered,
    /// No registry entry for the recipient identifier.
    NoSuchRecipient,
    /// An entry exists but its connection is not accepting sends.
    RecipientNotReady,
}

/// Resolves recipients through the registry and pushes frames at them.
pub struct DeliveryEngine {
    registry: Arc<ClientRegistry>,
    stats: Arc<HubStats>,
}

impl DeliveryEngine {
    pub fn new(registry: Arc<ClientRegistry>, stats: Arc<HubStats>) -> Self {
        Self { registry, stats }
    }

    /// Forward one relay frame to its addressee.
    ///
    /// Chat frames go out rebuilt from their defined fields with the
    /// addressee omitted; signaling frames go out exactly as they came in.
    pub async fn forward(&self, relay: &Relay) -> DeliveryOutcome {
        let Some(to) = relay.recipient() else {
            tracing::debug!(kind = %relay.kind, "Relay frame has no usable recipient, dropping");
            self.stats.message_dropped();
            return DeliveryOutcome::NoSuchRecipient;
        };
        let id = ClientId::from(to);

        let Some(entry) = self.registry.lookup(&id).await else {
            tracing::debug!(user = %id, kind = %relay.kind, "Recipient not connected, dropping");
            self.stats.message_dropped();
            return DeliveryOutcome::NoSuchRecipient;
        };

        if !entry.is_live() {
            tracing::debug!(user = %id, kind = %relay.kind, "Recipient not ready, dropping");
            self.stats.message_dropped();
            return DeliveryOutcome::RecipientNotReady;
        }

        if entry.handle.send(delivery_frame(relay)) {
            self.stats.message_delivered();
            tracing::trace!(user = %id, kind = %relay.kind, "Delivered");
            DeliveryOutcome::Delivered
        } else {
            // Lost the race with a closing connection; same as not ready
            tracing::debug!(user = %id, kind = %relay.kind, "Recipient went away mid-send, dropping");
            self.stats.message_dropped();
            DeliveryOutcome::RecipientNotReady
        }
    }
}

fn delivery_frame(relay: &Relay) -> String {
    if relay.kind.is_signal() {
        Envelope::Relay(relay.clone()).encode()
    } else {
        let mut chat = relay.clone();
        chat.to = None;
        Envelope::Relay(chat).encode()
    }
}
