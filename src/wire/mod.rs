//! Wire format: every frame is one JSON object on one line.
//!
//! The envelope is a closed set of recognized `type` values plus an
//! explicit unknown fallback, so new client-side kinds pass through the
//! hub without breaking it.

pub mod envelope;

pub use envelope::{DecodeError, Envelope, Register, RegisterAck, Relay, RelayKind};
