//! Request definitions
//!
//! A decoded request names a virtual table and the key to look up in it.

use thiserror::Error;

/// Separates the table name from the key
const KEY_SEPARATOR: char = ' ';

/// Why a request payload could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("request is not valid UTF-8")]
    InvalidUtf8,

    #[error("missing separator between table and key")]
    MissingSeparator,

    #[error("empty table name")]
    EmptyTable,

    #[error("empty key")]
    EmptyKey,
}

/// A parsed lookup request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Name of the virtual table
    pub table: String,

    /// Lookup key, everything after the first separator
    pub key: String,
}

impl Request {
    pub fn new(table: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            key: key.into(),
        }
    }

    /// Parse a request payload
    ///
    /// Splits on the first space; any later spaces belong to the key.
    pub fn parse(payload: &[u8]) -> Result<Self, ParseError> {
        let text = std::str::from_utf8(payload).map_err(|_| ParseError::InvalidUtf8)?;
        let (table, key) = text
            .split_once(KEY_SEPARATOR)
            .ok_or(ParseError::MissingSeparator)?;

        if table.is_empty() {
            return Err(ParseError::EmptyTable);
        }
        if key.is_empty() {
            return Err(ParseError::EmptyKey);
        }

        Ok(Self::new(table, key))
    }

    /// Encode the request payload (unframed)
    pub fn encode(&self) -> Vec<u8> {
        format!("{}{}{}", self.table, KEY_SEPARATOR, self.key).into_bytes()
    }
}
