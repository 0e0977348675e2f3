//! Protocol Module
//!
//! The Postfix socketmap wire protocol.
//!
//! ## Framing (netstrings)
//! ```text
//! ┌──────────────────┬─────┬─────────────────────┬─────┐
//! │ Len (ASCII dec.) │  :  │       Payload       │  ,  │
//! └──────────────────┴─────┴─────────────────────┴─────┘
//! ```
//! The length counts payload bytes only.
//!
//! ### Request Payload
//! - `<table> <key>` (single ASCII space separator)
//!
//! ### Response Payloads
//! - `OK <value>`
//! - `NOTFOUND`
//! - `PERM <reason>`
//! - `TEMP <reason>`
//! - `TIMEOUT <reason>`

mod netstring;
mod request;
mod response;

pub use netstring::{
    decode_frame, encode_frame, read_frame, write_frame, FrameError, MAX_LENGTH_DIGITS, SEPARATOR,
    TERMINATOR,
};
pub use request::{ParseError, Request};
pub use response::{decode_response, encode_response, ErrorKind, Outcome};
