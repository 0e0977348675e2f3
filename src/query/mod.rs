//! Query Module
//!
//! Running a table's query against the database and reducing the rows to a
//! single answer.
//!
//! ## Architecture
//! - [`QueryHandle`]: the seam to the database driver
//! - [`QueryExecutor`]: binds parameters, classifies the row set
//! - [`SqliteHandle`]: the built-in driver

mod executor;
mod sqlite;

use std::fmt;

use thiserror::Error;

use crate::config::DatabaseConfig;
use crate::error::{Result, SocketmapError};

pub use executor::{Lookup, MultiRowPolicy, QueryExecutor};
pub use sqlite::SqliteHandle;

/// One result row; `None` is SQL NULL
pub type Row = Vec<Option<String>>;

/// Driver-level failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Connectivity, syntax, parameter mismatch and anything else
    Failed,

    /// The driver gave up waiting
    TimedOut,

    /// A stored value cannot be sent as text
    InvalidValue,
}

impl fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryErrorKind::Failed => f.write_str("failed"),
            QueryErrorKind::TimedOut => f.write_str("timed out"),
            QueryErrorKind::InvalidValue => f.write_str("invalid value"),
        }
    }
}

/// A failed query, with the driver's message kept for logging
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub message: String,
}

impl QueryError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            kind: QueryErrorKind::Failed,
            message: message.into(),
        }
    }

    pub fn timed_out(message: impl Into<String>) -> Self {
        Self {
            kind: QueryErrorKind::TimedOut,
            message: message.into(),
        }
    }

    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self {
            kind: QueryErrorKind::InvalidValue,
            message: message.into(),
        }
    }
}

/// An open database that can run parameterized queries
///
/// Parameters are bound positionally, in order.
pub trait QueryHandle {
    fn execute(&self, query: &str, params: &[String]) -> std::result::Result<Vec<Row>, QueryError>;
}

impl<H: QueryHandle + ?Sized> QueryHandle for Box<H> {
    fn execute(&self, query: &str, params: &[String]) -> std::result::Result<Vec<Row>, QueryError> {
        (**self).execute(query, params)
    }
}

impl<H: QueryHandle + ?Sized> QueryHandle for &H {
    fn execute(&self, query: &str, params: &[String]) -> std::result::Result<Vec<Row>, QueryError> {
        (**self).execute(query, params)
    }
}

/// Open the database named by the config
pub fn connect(config: &DatabaseConfig) -> Result<Box<dyn QueryHandle>> {
    match config.driver.as_str() {
        "sqlite" | "sqlite3" => Ok(Box::new(SqliteHandle::open(config)?)),
        other => Err(SocketmapError::Config(format!(
            "unsupported database driver: {}",
            other
        ))),
    }
}
