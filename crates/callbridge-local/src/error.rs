use std::time::Duration;

use callbridge_codec::{CallFailure, Value};

/// Errors surfaced by the blocking client.
///
/// `Call` is the action's own failure relayed across the boundary with
/// identity intact; the remaining variants are transport failures, fatal
/// to the client.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The invoked action failed; kind, message, and every structured
    /// property captured on the worker side are preserved.
    #[error("{0}")]
    Call(CallFailure),

    /// The bridge was stopped; no further calls can be issued.
    #[error("bridge is stopped")]
    Stopped,

    /// The worker thread terminated without delivering a response.
    #[error("worker terminated unexpectedly")]
    WorkerGone,

    /// The worker never reported readiness.
    #[error("worker startup failed: {0}")]
    Startup(String),

    /// The optional call deadline elapsed before a response arrived.
    #[error("call did not complete within {0:?}")]
    DeadlineExceeded(Duration),
}

impl BridgeError {
    /// The relayed failure envelope, if this is an action failure.
    pub fn failure(&self) -> Option<&CallFailure> {
        match self {
            BridgeError::Call(failure) => Some(failure),
            _ => None,
        }
    }

    /// Failure kind, if this is an action failure.
    pub fn kind(&self) -> Option<&str> {
        self.failure().map(|f| f.kind.as_str())
    }

    /// Captured failure property, if present.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.failure().and_then(|f| f.property(name))
    }
}
