//! Value model and wire codec for the callbridge call protocol.
//!
//! A call crosses the bridge as an opaque `{method, args}` request and comes
//! back as a success value or a structured failure envelope. This crate owns
//! the value model those payloads are built from, the envelope types, and
//! the socket wire format: binary serialization, base64, CRLF-delimited
//! lines, plus the literal `ping`/`pong` liveness exchange.

mod envelope;
mod error;
mod value;
pub mod wire;

pub use envelope::{CallFailure, CallRequest, CallResponse};
pub use error::{CodecError, Result};
pub use value::Value;
