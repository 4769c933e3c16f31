use callbridge_codec::CodecError;
use callbridge_transport::TransportError;

/// Errors surfaced by the socket variant.
#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    /// Socket-level failure (bind, connect, accept, stream I/O).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Frame encoding or decoding failure.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The remote action failed. Only code and message survive this
    /// transport; structured failure properties do not round-trip here.
    #[error("remote call failed [{code}]: {message}")]
    Call { code: String, message: String },

    /// The peer answered with something the protocol does not allow.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// Spawning the worker executable failed.
    #[error("failed to spawn worker process: {0}")]
    Spawn(#[source] std::io::Error),

    /// The worker process never became ready.
    #[error("worker startup failed: {0}")]
    Startup(String),
}

pub type Result<T> = std::result::Result<T, SocketError>;
