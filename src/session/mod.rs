//! Session Module
//!
//! Serves one mail server over a duplex byte stream.
//!
//! ## Architecture
//! - One request is read, answered and flushed before the next is read
//! - The database handle and table registry live for the whole session
//! - Concurrency comes from the MTA spawning more processes, not from here

mod connection;
mod idle;

pub use connection::{Session, SessionEnd};
pub use idle::IdleTimeoutReader;
