//! Idle timeout for blocking input
//!
//! Postfix keeps a socketmap process around between lookups. To let it exit
//! when the queue goes quiet, stdin is read on a background thread and
//! handed over a channel; the session side waits with a timeout.

use std::io::{self, Read};
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError};

const CHUNK_SIZE: usize = 8192;

/// A reader that fails with `TimedOut` when no input arrives in time
pub struct IdleTimeoutReader {
    chunks: Receiver<io::Result<Vec<u8>>>,
    pending: Vec<u8>,
    pos: usize,
    timeout: Duration,
}

impl IdleTimeoutReader {
    /// Start reading `inner` on a background thread
    ///
    /// The thread exits at end of input, on a read error, or once this
    /// reader is dropped and its next chunk cannot be delivered.
    pub fn spawn<R>(inner: R, timeout: Duration) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = channel::bounded(1);
        thread::Builder::new()
            .name("socketmap-input".to_string())
            .spawn(move || {
                let mut inner = inner;
                let mut buf = vec![0u8; CHUNK_SIZE];
                loop {
                    match inner.read(&mut buf) {
                        Ok(0) => break,
                        Ok(n) => {
                            if tx.send(Ok(buf[..n].to_vec())).is_err() {
                                break;
                            }
                        }
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => {
                            let _ = tx.send(Err(e));
                            break;
                        }
                    }
                }
            })?;

        Ok(Self {
            chunks: rx,
            pending: Vec::new(),
            pos: 0,
            timeout,
        })
    }
}

impl Read for IdleTimeoutReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        if self.pos >= self.pending.len() {
            match self.chunks.recv_timeout(self.timeout) {
                Ok(Ok(chunk)) => {
                    self.pending = chunk;
                    self.pos = 0;
                }
                Ok(Err(e)) => return Err(e),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(io::Error::new(io::ErrorKind::TimedOut, "idle timeout"))
                }
                // Sender gone: the input reached end of stream
                Err(RecvTimeoutError::Disconnected) => return Ok(0),
            }
        }

        let available = &self.pending[self.pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        Ok(n)
    }
}
