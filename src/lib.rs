//! switchboard-rs - Presence and relay hub for chat and WebRTC signaling
//!
//! Clients hold one persistent connection to the hub, register under an
//! opaque identifier, and exchange addressed JSON envelopes. The hub
//! keeps a live identifier-to-connection registry and forwards each
//! frame to its addressee without interpreting the payload:
//! - Chat messages are rebuilt from their defined fields on delivery
//! - Signaling frames (offer, answer, ICE) are forwarded verbatim
//! - Frames for absent or closing recipients are dropped silently
//!
//! A separate HTTP surface exposes health, interface discovery, and a
//! reachability probe for clients negotiating direct connections.
//!
//! # Example - Server
//!
//! ```no_run
//! use switchboard_rs::{HubConfig, HubServer};
//!
//! # async fn example() -> switchboard_rs::error::Result<()> {
//! let config = HubConfig::from_env();
//! let server = HubServer::new(config);
//! server.run().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Client
//!
//! ```no_run
//! use switchboard_rs::client::HubClient;
//!
//! # async fn example() -> switchboard_rs::error::Result<()> {
//! let mut client = HubClient::connect("127.0.0.1:5050").await?;
//! client.register("alice").await?;
//! client.send_chat("bob", "hello").await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod registry;
pub mod routing;
pub mod server;
pub mod session;
pub mod stats;
pub mod transport;
pub mod wire;

pub use client::HubClient;
pub use error::{HubError, Result};
pub use registry::{ClientId, ClientRegistry};
pub use routing::{DeliveryOutcome, MessageRouter};
pub use server::{HubConfig, HubServer};
pub use stats::{HubStats, HubStatsSnapshot};
pub use wire::{Envelope, Register, RegisterAck, Relay, RelayKind};
