//! Error types for socketmap-sql
//!
//! Two layers of errors live here:
//! - [`SocketmapError`]: anything that stops the process or the session
//!   (I/O on the stream, framing corruption, bad configuration, failure to
//!   open the database).
//! - [`LookupError`]: a failure while answering a single request. These
//!   never escape the session; they are classified into an [`ErrorKind`]
//!   and written back to the mail server.

use thiserror::Error;

use crate::protocol::{ErrorKind, FrameError, ParseError};
use crate::query::{QueryError, QueryErrorKind};
use crate::transform::TransformError;

/// Result type alias using SocketmapError
pub type Result<T> = std::result::Result<T, SocketmapError>;

/// Unified error type for socketmap-sql operations
#[derive(Debug, Error)]
pub enum SocketmapError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Framing error: {0}")]
    Frame(#[from] FrameError),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Database Errors
    // -------------------------------------------------------------------------
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Why a single lookup could not be answered with a value or NOTFOUND
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("malformed request: {0}")]
    Parse(#[from] ParseError),

    #[error("no such table: {0}")]
    UnknownTable(String),

    #[error("transform failed: {0}")]
    Transform(#[from] TransformError),

    #[error("query failed: {0}")]
    Query(#[from] QueryError),
}

impl LookupError {
    /// Classify the failure for the wire response
    ///
    /// Request, table and transform problems will not go away on retry, so
    /// they are permanent, as is a stored value that cannot be sent. Other
    /// database failures are temporary unless the driver reported a timeout.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LookupError::Parse(_) | LookupError::UnknownTable(_) | LookupError::Transform(_) => {
                ErrorKind::Permanent
            }
            LookupError::Query(err) => match err.kind {
                QueryErrorKind::Failed => ErrorKind::Temporary,
                QueryErrorKind::TimedOut => ErrorKind::Timeout,
                QueryErrorKind::InvalidValue => ErrorKind::Permanent,
            },
        }
    }

    /// Human-readable reason sent to the mail server
    ///
    /// Driver messages stay in the logs; only a generic reason goes out.
    pub fn reason(&self) -> String {
        match self {
            LookupError::Parse(err) => format!("malformed request: {}", err),
            LookupError::UnknownTable(name) => format!("no such table: {}", name),
            LookupError::Transform(err) => format!("transform failed: {}", err.public_reason()),
            LookupError::Query(err) => match err.kind {
                QueryErrorKind::Failed => "database lookup failed".to_string(),
                QueryErrorKind::TimedOut => "database lookup timed out".to_string(),
                QueryErrorKind::InvalidValue => "stored value is not valid text".to_string(),
            },
        }
    }
}
