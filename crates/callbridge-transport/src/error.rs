use std::path::PathBuf;

/// Errors raised by socket setup and teardown.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Socket path exceeds the platform `sockaddr_un` limit.
    #[error("socket path too long: {len} bytes (max {max}): {path:?}")]
    PathTooLong {
        path: PathBuf,
        len: usize,
        max: usize,
    },

    /// Binding the listening socket failed.
    #[error("bind failed on {path:?}: {source}")]
    Bind {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Connecting to a listening socket failed.
    #[error("connect failed on {path:?}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Accepting an incoming connection failed.
    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),

    /// Other stream-level I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
