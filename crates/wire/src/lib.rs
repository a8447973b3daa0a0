// SPDX-License-Identifier: MIT

//! IPC protocol for the control socket.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod codec;
mod error;
mod request;
mod response;

pub use codec::{decode, encode, read_message, read_request, write_message, write_response};
pub use error::{ErrorKind, ProtocolError, WireError};
pub use request::Request;
pub use response::Response;
