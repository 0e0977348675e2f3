//! Debug client
//!
//! Spawns a server process and talks to it over its stdin/stdout, the same
//! way Postfix does.

use std::io::{BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};

use crate::error::{Result, SocketmapError};
use crate::protocol::{decode_response, read_frame, write_frame, Outcome, Request};

/// A running server process
pub struct Client {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl Client {
    /// Spawn `command` with piped stdin/stdout
    pub fn spawn(mut command: Command) -> Result<Self> {
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()?;

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SocketmapError::Protocol("server stdout unavailable".to_string()))?;

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    /// Send a raw request payload and return the raw response payload
    ///
    /// Returns `None` if the server closed its output.
    pub fn send(&mut self, payload: &[u8]) -> Result<Option<Vec<u8>>> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| SocketmapError::Protocol("client already closed".to_string()))?;
        write_frame(stdin, payload)?;
        Ok(read_frame(&mut self.stdout)?)
    }

    /// Look up `key` in `table`
    pub fn lookup(&mut self, table: &str, key: &str) -> Result<Option<Outcome>> {
        match self.send(&Request::new(table, key).encode())? {
            Some(payload) => Ok(Some(decode_response(&payload)?)),
            None => Ok(None),
        }
    }

    /// Close the server's input and wait for it to exit
    pub fn close(mut self) -> Result<ExitStatus> {
        if let Some(mut stdin) = self.stdin.take() {
            stdin.flush()?;
        }
        Ok(self.child.wait()?)
    }
}
