//! Thread-based bridge variant.
//!
//! [`LocalBridge::launch`] spawns a worker thread that owns the action
//! registry (and whatever exclusive resources its actions hold). The
//! [`BridgeClient`] it hands out exposes one blocking entry point:
//! [`BridgeClient::call`] sends the request, parks the calling thread on a
//! completion signal until the worker has written the response, and
//! returns the decoded value or raises the reconstructed failure.
//!
//! The protocol is strictly half-duplex: one call in flight per client,
//! total order of calls, no pipelining.

mod bridge;
mod client;
mod error;
mod signal;

pub use bridge::{BridgeConfig, LocalBridge};
pub use client::BridgeClient;
pub use error::BridgeError;
