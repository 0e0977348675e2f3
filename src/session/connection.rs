//! Session Loop
//!
//! Reads framed requests, answers each one, and stops at end of input.
//!
//! ```text
//! Idle ──► Reading ──► Processing ──► Writing ──► Idle
//!             │
//!             └──► Closed (end of stream, idle timeout, framing error)
//! ```

use std::io::{self, Read, Write};
use std::panic::{self, AssertUnwindSafe};

use crate::config::Config;
use crate::error::{LookupError, Result};
use crate::protocol::{encode_response, read_frame, write_frame, ErrorKind, FrameError, Outcome, Request};
use crate::query::{Lookup, QueryExecutor, QueryHandle};
use crate::table::TableRegistry;
use crate::transform::TransformOptions;

/// Why a session finished without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The input closed at a frame boundary
    EndOfStream,

    /// No request started within the idle timeout
    IdleTimeout,

    /// The configured request limit was reached
    RequestLimit,

    /// The peer went away while we were writing
    PeerClosed,
}

/// Serves lookups for one mail server
pub struct Session<R, W, H> {
    /// Request stream (should be buffered)
    reader: R,

    /// Response stream, flushed after every frame
    writer: W,

    /// Runs table queries against the database
    executor: QueryExecutor<H>,

    /// Configured virtual tables
    tables: TableRegistry,

    /// Settings passed to transforms
    options: TransformOptions,

    /// Stop after this many requests
    max_requests: Option<u64>,

    /// Requests answered so far
    served: u64,
}

impl<R: Read, W: Write, H: QueryHandle> Session<R, W, H> {
    /// Create a session over `reader`/`writer` using `handle` for queries
    pub fn new(reader: R, writer: W, handle: H, config: &Config) -> Self {
        Self {
            reader,
            writer,
            executor: QueryExecutor::new(handle, config.multi_row.clone()),
            tables: config.tables.clone(),
            options: config.transform_options.clone(),
            max_requests: config.max_requests,
            served: 0,
        }
    }

    /// Number of requests answered so far
    pub fn served(&self) -> u64 {
        self.served
    }

    /// Serve requests until the input ends (blocking)
    ///
    /// Only stream I/O failures and framing errors are returned as errors;
    /// every per-request failure is answered on the wire.
    pub fn run(&mut self) -> Result<SessionEnd> {
        tracing::debug!("Session started with {} tables", self.tables.len());

        loop {
            if let Some(max) = self.max_requests {
                if self.served >= max {
                    tracing::debug!("Request limit of {} reached", max);
                    return Ok(SessionEnd::RequestLimit);
                }
            }

            let payload = match read_frame(&mut self.reader) {
                Ok(Some(payload)) => payload,
                Ok(None) => {
                    tracing::debug!("Input closed after {} requests", self.served);
                    return Ok(SessionEnd::EndOfStream);
                }
                Err(FrameError::IdleTimeout) => {
                    tracing::debug!("Idle timeout after {} requests", self.served);
                    return Ok(SessionEnd::IdleTimeout);
                }
                Err(e) => {
                    // Nothing trustworthy can be framed back
                    tracing::error!("Unreadable request stream: {}", e);
                    return Err(e.into());
                }
            };

            let outcome = self.process(&payload);

            if let Err(e) = write_frame(&mut self.writer, &encode_response(&outcome)) {
                match e.kind() {
                    io::ErrorKind::BrokenPipe
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted => {
                        tracing::debug!("Peer closed before response could be sent: {}", e);
                        return Ok(SessionEnd::PeerClosed);
                    }
                    _ => return Err(e.into()),
                }
            }
            self.served += 1;
        }
    }

    /// Answer one request payload
    ///
    /// A panic anywhere in the pipeline becomes a permanent error so that one
    /// bad key cannot take the session down.
    pub fn process(&self, payload: &[u8]) -> Outcome {
        match panic::catch_unwind(AssertUnwindSafe(|| self.lookup(payload))) {
            Ok(Ok(Lookup::Found(value))) => Outcome::Found(value),
            Ok(Ok(Lookup::NotFound)) => Outcome::NotFound,
            Ok(Err(e)) => {
                let kind = e.kind();
                tracing::warn!("Lookup failed ({}): {}", kind.tag(), e);
                Outcome::error(kind, e.reason())
            }
            Err(_) => {
                tracing::error!("Lookup panicked");
                Outcome::error(ErrorKind::Permanent, "internal error")
            }
        }
    }

    fn lookup(&self, payload: &[u8]) -> std::result::Result<Lookup, LookupError> {
        let request = Request::parse(payload)?;
        tracing::trace!("Lookup in {}: {:?}", request.table, request.key);

        let table = self
            .tables
            .get(&request.table)
            .ok_or_else(|| LookupError::UnknownTable(request.table.clone()))?;
        let params = table.transform.apply(&request.key, &self.options)?;
        Ok(self.executor.execute(&table.query, &params)?)
    }
}
