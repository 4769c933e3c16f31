//! Process-based bridge variant.
//!
//! When the worker is a separate OS process there is no shared memory to
//! signal through, so the same blocking contract degenerates to a
//! synchronous socket call: each invocation opens a fresh connection,
//! writes one request frame, and blocks reading the single response frame
//! the worker writes before half-closing. [`CallServer`] is the worker
//! side, [`SocketClient`] the calling side, and [`ProcessBridge`] spawns
//! and supervises the worker executable.

mod client;
mod config;
mod error;
mod server;
mod spawn;

pub use client::SocketClient;
pub use config::SocketConfig;
pub use error::{Result, SocketError};
pub use server::CallServer;
pub use spawn::{ProcessBridge, SpawnConfig};
