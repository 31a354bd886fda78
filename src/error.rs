//! Crate-level error types.
//!
//! Per-frame problems (an undecodable envelope, an unknown message kind)
//! are deliberately not represented here: they are recovered where they
//! occur and never tear down a connection or the process.

use thiserror::Error;

use crate::transport::CodecError;
use crate::wire::DecodeError;

/// Errors surfaced by the hub server and the client half.
#[derive(Debug, Error)]
pub enum HubError {
    /// Listener or socket I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport framing failure on a connection.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A frame could not be decoded as an envelope.
    ///
    /// The hub and client both recover from this in place; the variant
    /// exists so callers composing [`crate::wire::Envelope::decode`] with
    /// hub operations can use one error type.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The connection closed before the operation completed.
    #[error("connection closed")]
    ConnectionClosed,

    /// A client operation that needs an identity ran before `register`.
    #[error("not registered")]
    NotRegistered,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HubError>;
