//! Synchronous cross-context call bridge.
//!
//! callbridge lets code on one execution context invoke named actions that
//! live on another context and block until the answer comes back, as if the
//! call were a plain function call. Two variants share one calling
//! contract: a thread-based bridge signalling through shared memory, and a
//! process-based bridge speaking a one-call-per-connection socket protocol.
//!
//! # Crate Structure
//!
//! - [`transport`] — Unix socket substrate (bind, connect, half-close)
//! - [`codec`] — Value model, call envelopes, and the socket wire format
//! - [`worker`] — Action registry and one-at-a-time dispatcher
//! - [`local`] — Thread-based bridge with a true blocking wait
//! - [`socket`] — Process-based bridge (behind the `socket` feature)

/// Re-export transport types.
pub mod transport {
    pub use callbridge_transport::*;
}

/// Re-export codec types.
pub mod codec {
    pub use callbridge_codec::*;
}

/// Re-export worker types.
pub mod worker {
    pub use callbridge_worker::*;
}

/// Re-export the thread-based bridge.
pub mod local {
    pub use callbridge_local::*;
}

/// Re-export the process-based bridge (requires `socket` feature).
#[cfg(feature = "socket")]
pub mod socket {
    pub use callbridge_socket::*;
}
