//! Response definitions
//!
//! Represents the answer to one lookup and its wire encoding.

use std::fmt;

use crate::error::{Result, SocketmapError};

/// How the mail server should treat a failed lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Retrying will not help without a configuration change
    Permanent,

    /// Transient failure, the caller should retry
    Temporary,

    /// The database reported a timeout
    Timeout,
}

impl ErrorKind {
    /// Status tag on the wire
    pub fn tag(&self) -> &'static str {
        match self {
            ErrorKind::Permanent => "PERM",
            ErrorKind::Temporary => "TEMP",
            ErrorKind::Timeout => "TIMEOUT",
        }
    }
}

/// Result of processing one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The lookup produced a value
    Found(String),

    /// The lookup produced no rows
    NotFound,

    /// The lookup failed
    Error { kind: ErrorKind, reason: String },
}

impl Outcome {
    pub fn error(kind: ErrorKind, reason: impl Into<String>) -> Self {
        Outcome::Error {
            kind,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Found(value) => write!(f, "OK {}", value),
            Outcome::NotFound => f.write_str("NOTFOUND"),
            Outcome::Error { kind, reason } => write!(f, "{} {}", kind.tag(), reason),
        }
    }
}

/// Encode an outcome as a response payload (unframed)
pub fn encode_response(outcome: &Outcome) -> Vec<u8> {
    outcome.to_string().into_bytes()
}

/// Decode a response payload
///
/// Used by the debug client; the server only ever encodes.
pub fn decode_response(payload: &[u8]) -> Result<Outcome> {
    let text = std::str::from_utf8(payload)
        .map_err(|_| SocketmapError::Protocol("response is not valid UTF-8".to_string()))?;

    if text == "NOTFOUND" {
        return Ok(Outcome::NotFound);
    }

    let (tag, rest) = text.split_once(' ').ok_or_else(|| {
        SocketmapError::Protocol(format!("Unknown response: {:?}", text))
    })?;

    match tag {
        "OK" => Ok(Outcome::Found(rest.to_string())),
        "PERM" => Ok(Outcome::error(ErrorKind::Permanent, rest)),
        "TEMP" => Ok(Outcome::error(ErrorKind::Temporary, rest)),
        "TIMEOUT" => Ok(Outcome::error(ErrorKind::Timeout, rest)),
        _ => Err(SocketmapError::Protocol(format!(
            "Unknown response status: {:?}",
            tag
        ))),
    }
}
