//! Unix domain socket substrate for the callbridge worker protocol.
//!
//! The process-based bridge variant runs over a byte stream socket with one
//! request per connection. This crate owns the socket lifecycle: bind with
//! restrictive permissions and stale-socket cleanup, blocking accept and
//! connect, per-stream timeouts, and the write-side half-close the protocol
//! uses to mark end-of-response.

mod error;
mod listener;
mod stream;

pub use error::{Result, TransportError};
pub use listener::BridgeListener;
pub use stream::BridgeStream;
