//! SQLite query handle
//!
//! Placeholders are `?` or `?N`. The connection is opened read-only by
//! default, with a busy timeout so a writer holding the lock surfaces as a
//! timeout instead of hanging the session.

use std::time::Duration;

use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection, ErrorCode, OpenFlags};

use super::{QueryError, QueryHandle, Row};
use crate::config::DatabaseConfig;
use crate::error::{Result, SocketmapError};

/// A single SQLite connection, reused for every request
pub struct SqliteHandle {
    conn: Connection,
}

impl SqliteHandle {
    /// Open the database at `config.path`
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        let path = config.path.as_ref().ok_or_else(|| {
            SocketmapError::Config("database.path is required for sqlite".to_string())
        })?;

        let flags = if config.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
        };
        let conn = Connection::open_with_flags(path, flags | OpenFlags::SQLITE_OPEN_NO_MUTEX)?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        if config.read_only {
            conn.pragma_update(None, "query_only", 1)?;
        }

        tracing::debug!("Opened sqlite database {}", path.display());
        Ok(Self { conn })
    }

    /// Wrap an already open connection
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }
}

impl QueryHandle for SqliteHandle {
    fn execute(&self, query: &str, params: &[String]) -> std::result::Result<Vec<Row>, QueryError> {
        let mut stmt = self.conn.prepare_cached(query).map_err(classify)?;
        let columns = stmt.column_count();

        let mut rows = stmt.query(params_from_iter(params.iter())).map_err(classify)?;
        let mut result = Vec::new();
        while let Some(row) = rows.next().map_err(classify)? {
            let mut values = Vec::with_capacity(columns);
            for idx in 0..columns {
                values.push(render(row.get_ref(idx).map_err(classify)?)?);
            }
            result.push(values);
        }
        Ok(result)
    }
}

/// Values go on the wire as text, so bytes that are not UTF-8 are rejected
/// rather than mangled. Reals keep a fractional part (`2.0`, not `2`).
fn render(value: ValueRef<'_>) -> std::result::Result<Option<String>, QueryError> {
    match value {
        ValueRef::Null => Ok(None),
        ValueRef::Integer(i) => Ok(Some(i.to_string())),
        ValueRef::Real(f) => Ok(Some(format!("{:?}", f))),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => std::str::from_utf8(bytes)
            .map(|text| Some(text.to_string()))
            .map_err(|e| QueryError::invalid_value(format!("value is not valid UTF-8: {}", e))),
    }
}

/// Lock contention and interrupts are timeouts, everything else is a failure
fn classify(err: rusqlite::Error) -> QueryError {
    match err.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy)
        | Some(ErrorCode::DatabaseLocked)
        | Some(ErrorCode::OperationInterrupted) => QueryError::timed_out(err.to_string()),
        _ => QueryError::failed(err.to_string()),
    }
}
