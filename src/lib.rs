//! # socketmap-sql
//!
//! A Postfix socketmap server backed by SQL queries:
//! - Netstring framing over stdin/stdout
//! - Named virtual tables, each a key transform plus a parameterized query
//! - Classified failures (`PERM`, `TEMP`, `TIMEOUT`) instead of dropped
//!   connections
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Mail server (Postfix)                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ netstrings on stdin/stdout
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Session Loop                             │
//! │          (one request in flight at a time)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼────────────┐
//!          ▼            ▼            ▼
//!   ┌─────────────┐ ┌─────────┐ ┌─────────────┐
//!   │   Request   │ │Transform│ │   Query     │
//!   │   Parser    │ │  Stage  │ │  Executor   │
//!   └─────────────┘ └─────────┘ └──────┬──────┘
//!                                      │
//!                                      ▼
//!                              ┌─────────────┐
//!                              │  Database   │
//!                              │  (SQLite)   │
//!                              └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod transform;
pub mod table;
pub mod query;
pub mod session;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LookupError, Result, SocketmapError};
pub use config::Config;
pub use session::{Session, SessionEnd};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of socketmap-sql
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
