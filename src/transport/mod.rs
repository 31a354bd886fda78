//! Transport plumbing: newline framing and the per-connection send handle.
//!
//! The rest of the crate never touches sockets directly. Connections are
//! reached through a [`ConnectionHandle`]; bytes become frames through the
//! [`LineCodec`].

pub mod codec;
pub mod handle;

pub use codec::{CodecError, LineCodec, DEFAULT_MAX_FRAME_SIZE, MIN_FRAME_SIZE};
pub use handle::ConnectionHandle;
