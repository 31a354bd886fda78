//! Hub client implementation
//!
//! Provides the connecting side of the hub protocol for:
//! - Registering an identity and receiving addressed messages
//! - Sending chat and signaling frames to other registered clients
//! - Driving integration tests and demo tooling

pub mod hub;

pub use hub::HubClient;
