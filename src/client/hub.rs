//! Hub client
//!
//! High-level API for talking to a running hub: register an identity,
//! then send and receive addressed envelopes over one connection.

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use futures::{SinkExt, StreamExt};
use serde_json::{Map, Value};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio_util::codec::Framed;

use crate::error::{HubError, Result};
use crate::transport::LineCodec;
use crate::wire::{Envelope, Register, RegisterAck, Relay, RelayKind};

/// Client side of a hub connection.
///
/// # Example
/// ```no_run
/// use switchboard_rs::client::HubClient;
///
/// # async fn example() -> switchboard_rs::error::Result<()> {
/// let mut client = HubClient::connect("127.0.0.1:5050").await?;
/// client.register("alice").await?;
/// client.send_chat("bob", "hello").await?;
///
/// while let Some(envelope) = client.next_envelope().await? {
///     println!("Received: {envelope:?}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct HubClient {
    framed: Framed<TcpStream, LineCodec>,
    /// Frames that arrived while waiting for a registration ack.
    pending: VecDeque<String>,
    user_id: Option<String>,
}

impl HubClient {
    /// Open a connection to the hub.
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let socket = TcpStream::connect(addr).await?;
        socket.set_nodelay(true)?;
        Ok(Self {
            framed: Framed::new(socket, LineCodec::default()),
            pending: VecDeque::new(),
            user_id: None,
        })
    }

    /// Register under `user_id` and wait for the hub's acknowledgement.
    pub async fn register(&mut self, user_id: &str) -> Result<RegisterAck> {
        self.register_with(user_id, Map::new()).await
    }

    /// Register with extra metadata fields, echoed back in the ack.
    pub async fn register_with(
        &mut self,
        user_id: &str,
        metadata: Map<String, Value>,
    ) -> Result<RegisterAck> {
        let frame = Envelope::Register(Register {
            user_id: user_id.to_string(),
            metadata,
        });
        self.framed.send(frame.encode()).await?;

        // Relayed messages can arrive ahead of the ack; keep them
        // readable through next_envelope afterwards.
        loop {
            let Some(raw) = self.framed.next().await.transpose()? else {
                return Err(HubError::ConnectionClosed);
            };
            match Envelope::decode(&raw) {
                Ok(Envelope::Registered(ack)) => {
                    self.user_id = Some(ack.user_id.clone());
                    return Ok(ack);
                }
                Ok(_) => self.pending.push_back(raw),
                Err(err) => {
                    tracing::debug!(error = %err, "Skipping undecodable frame");
                }
            }
        }
    }

    /// Send any envelope as-is.
    pub async fn send(&mut self, envelope: &Envelope) -> Result<()> {
        self.framed.send(envelope.encode()).await?;
        Ok(())
    }

    /// Send a chat message to `to`, stamped with the registered identity
    /// and the current wall-clock time.
    pub async fn send_chat(&mut self, to: &str, message: &str) -> Result<()> {
        let from = self.user_id.clone().ok_or(HubError::NotRegistered)?;
        let relay = Relay::chat(to, from, message, unix_millis());
        self.send(&Envelope::Relay(relay)).await
    }

    /// Send a signaling frame of the given kind to `to`.
    pub async fn send_signal(
        &mut self,
        kind: RelayKind,
        to: &str,
        fields: Map<String, Value>,
    ) -> Result<()> {
        self.send(&Envelope::Relay(Relay::signal(kind, to, fields)))
            .await
    }

    /// Next raw line from the hub, or `None` once the connection closes.
    pub async fn next_raw(&mut self) -> Result<Option<String>> {
        if let Some(raw) = self.pending.pop_front() {
            return Ok(Some(raw));
        }
        Ok(self.framed.next().await.transpose()?)
    }

    /// Next decodable envelope from the hub, or `None` once the
    /// connection closes. Undecodable lines are skipped.
    pub async fn next_envelope(&mut self) -> Result<Option<Envelope>> {
        loop {
            let Some(raw) = self.next_raw().await? else {
                return Ok(None);
            };
            match Envelope::decode(&raw) {
                Ok(envelope) => return Ok(Some(envelope)),
                Err(err) => {
                    tracing::debug!(error = %err, "Skipping undecodable frame");
                }
            }
        }
    }

    /// The identity this client registered under, if any.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_registered(&self) -> bool {
        self.user_id.is_some()
    }

    /// Flush and close the connection.
    pub async fn close(mut self) -> Result<()> {
        self.framed.close().await?;
        Ok(())
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_waits_for_ack() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut framed = Framed::new(socket, LineCodec::default());
            let raw = framed.next().await.unwrap().unwrap();
            let Envelope::Register(reg) = Envelope::decode(&raw).unwrap() else {
                panic!("expected a register frame, got {raw}");
            };
            // a relay sneaks in ahead of the ack
            framed
                .send(
                    r#"{"type":"message","from":"bob","message":"early","timestamp":1}"#
                        .to_string(),
                )
                .await
                .unwrap();
            framed
                .send(
                    Envelope::Registered(RegisterAck {
                        user_id: reg.user_id,
                        metadata: reg.metadata,
                    })
                    .encode(),
                )
                .await
                .unwrap();
        });

        let mut client = HubClient::connect(addr).await.unwrap();
        let ack = client.register("alice").await.unwrap();
        assert_eq!(ack.user_id, "alice");
        assert_eq!(client.user_id(), Some("alice"));

        // the early relay is still readable, in order
        let envelope = client.next_envelope().await.unwrap().unwrap();
        let Envelope::Relay(relay) = envelope else {
            panic!("expected a relay");
        };
        assert_eq!(relay.fields.get("message"), Some(&Value::from("early")));

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_send_chat_requires_identity() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut client = HubClient::connect(addr).await.unwrap();
        let err = client.send_chat("bob", "hi").await.unwrap_err();
        assert!(matches!(err, HubError::NotRegistered));
    }
}
