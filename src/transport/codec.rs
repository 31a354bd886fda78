//! Newline-delimited framing over a byte stream.

use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

/// Transport framing failures.
///
/// Unlike a malformed envelope these are connection-fatal: once a peer
/// overruns the frame cap, its stream offset can no longer be trusted.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame of {len} bytes exceeds the {max} byte cap")]
    FrameTooLarge { len: usize, max: usize },
}

/// Default cap on one inbound line. Generous for signaling payloads,
/// small enough to stop a runaway peer from buffering without bound.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024;

/// Frame caps below this would reject ordinary envelopes.
pub const MIN_FRAME_SIZE: usize = 1024;

/// Frames a connection into lines.
///
/// Lines end with `\n`; a trailing `\r` is stripped. A line that is not
/// valid UTF-8 is skipped without erroring the stream, since one bad
/// frame must never take the connection down with it. At EOF a trailing
/// unterminated line is still delivered.
#[derive(Debug)]
pub struct LineCodec {
    max_frame_size: usize,
}

impl LineCodec {
    pub fn new(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    fn frame_from(&self, bytes: &[u8]) -> Option<String> {
        let line = match bytes.last() {
            Some(b'\r') => &bytes[..bytes.len() - 1],
            _ => bytes,
        };
        match std::str::from_utf8(line) {
            Ok(text) => Some(text.to_string()),
            Err(_) => {
                tracing::debug!(len = line.len(), "skipping non-UTF-8 frame");
                None
            }
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_SIZE)
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, CodecError> {
        loop {
            match src.iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    if pos > self.max_frame_size {
                        return Err(CodecError::FrameTooLarge {
                            len: pos,
                            max: self.max_frame_size,
                        });
                    }
                    let line = src.split_to(pos);
                    src.advance(1);
                    if let Some(frame) = self.frame_from(&line) {
                        return Ok(Some(frame));
                    }
                    // skipped a non-UTF-8 line; try the next delimiter
                }
                None => {
                    if src.len() > self.max_frame_size {
                        return Err(CodecError::FrameTooLarge {
                            len: src.len(),
                            max: self.max_frame_size,
                        });
                    }
                    return Ok(None);
                }
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>, CodecError> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if src.is_empty() {
            return Ok(None);
        }
        let tail = src.split_to(src.len());
        Ok(self.frame_from(&tail))
    }
}

impl Encoder<String> for LineCodec {
    type Error = CodecError;

    fn encode(&mut self, frame: String, dst: &mut BytesMut) -> Result<(), CodecError> {
        dst.reserve(frame.len() + 1);
        dst.extend_from_slice(frame.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}
