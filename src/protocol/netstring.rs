//! Netstring codec
//!
//! Encoding and decoding of self-delimited frames, independent of what the
//! payload means.
//!
//! ## Wire Format
//! ```text
//! <decimal length>:<payload>,
//! ```
//!
//! `5:hello,` carries the payload `hello`. `0:,` is the empty payload.

use std::io::{self, Read, Write};

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Separates the length prefix from the payload
pub const SEPARATOR: u8 = b':';

/// Terminates every frame after the payload
pub const TERMINATOR: u8 = b',';

/// Longest accepted length prefix
pub const MAX_LENGTH_DIGITS: usize = 10;

/// Why a frame could not be decoded
///
/// Any of these means the byte boundaries of the stream can no longer be
/// trusted.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("no request before the idle timeout")]
    IdleTimeout,

    #[error("empty length prefix")]
    EmptyLength,

    #[error("invalid byte 0x{0:02x} in length prefix")]
    InvalidLength(u8),

    #[error("length prefix has a leading zero")]
    LeadingZero,

    #[error("length prefix longer than 10 digits")]
    LengthTooLong,

    #[error("stream ended inside the length prefix")]
    UnterminatedLength,

    #[error("truncated payload: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("missing ',' terminator")]
    MissingTerminator,

    #[error("expected ',' terminator, got 0x{0:02x}")]
    BadTerminator(u8),
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode a payload as a netstring
pub fn encode_frame(payload: &[u8]) -> Bytes {
    let length = payload.len().to_string();
    let mut frame = BytesMut::with_capacity(length.len() + payload.len() + 2);
    frame.put_slice(length.as_bytes());
    frame.put_u8(SEPARATOR);
    frame.put_slice(payload);
    frame.put_u8(TERMINATOR);
    frame.freeze()
}

/// Write a framed payload to a stream and flush it
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> io::Result<()> {
    writer.write_all(&encode_frame(payload))?;
    writer.flush()
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode the first frame in a buffer
///
/// Returns the payload and the number of bytes consumed. An empty buffer is
/// reported as `UnterminatedLength`, since a buffer is expected to hold a
/// frame.
pub fn decode_frame(bytes: &[u8]) -> Result<(Vec<u8>, usize), FrameError> {
    let mut cursor = bytes;
    match read_frame(&mut cursor)? {
        Some(payload) => Ok((payload, bytes.len() - cursor.len())),
        None => Err(FrameError::UnterminatedLength),
    }
}

/// Read one frame from a stream
///
/// Returns `Ok(None)` when the stream is closed cleanly at a frame
/// boundary. Blocks until a complete frame is read or an error occurs.
/// The reader should be buffered: the length prefix is read a byte at a time.
///
/// A `TimedOut` read before the first byte is `FrameError::IdleTimeout`;
/// once a frame has started it is an ordinary I/O error.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>, FrameError> {
    let mut byte = match read_byte(reader) {
        Ok(Some(b)) => b,
        Ok(None) => return Ok(None),
        Err(e) if e.kind() == io::ErrorKind::TimedOut => return Err(FrameError::IdleTimeout),
        Err(e) => return Err(e.into()),
    };

    let mut length: usize = 0;
    let mut digits = 0;
    while byte != SEPARATOR {
        if !byte.is_ascii_digit() {
            return Err(FrameError::InvalidLength(byte));
        }
        // "0" is only valid on its own
        if digits == 1 && length == 0 {
            return Err(FrameError::LeadingZero);
        }
        digits += 1;
        if digits > MAX_LENGTH_DIGITS {
            return Err(FrameError::LengthTooLong);
        }
        length = length
            .checked_mul(10)
            .and_then(|n| n.checked_add(usize::from(byte - b'0')))
            .ok_or(FrameError::LengthTooLong)?;

        byte = read_byte(reader)?.ok_or(FrameError::UnterminatedLength)?;
    }
    if digits == 0 {
        return Err(FrameError::EmptyLength);
    }

    // Grow the buffer as bytes arrive rather than trusting the prefix
    let mut payload = Vec::new();
    (&mut *reader).take(length as u64).read_to_end(&mut payload)?;
    if payload.len() != length {
        return Err(FrameError::Truncated {
            expected: length,
            actual: payload.len(),
        });
    }

    match read_byte(reader)? {
        Some(TERMINATOR) => Ok(Some(payload)),
        Some(other) => Err(FrameError::BadTerminator(other)),
        None => Err(FrameError::MissingTerminator),
    }
}

fn read_byte<R: Read>(reader: &mut R) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
