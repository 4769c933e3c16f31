/// Errors raised while encoding or decoding wire frames.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Binary serialization failed.
    #[error("encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    /// Binary deserialization failed.
    #[error("decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    /// Frame body is not valid base64.
    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Incoming line exceeds the configured bound.
    #[error("line too long: {size} bytes (max {max})")]
    LineTooLong { size: usize, max: usize },

    /// Decoded frame carried bytes past the end of the payload.
    #[error("frame has {count} trailing bytes")]
    TrailingBytes { count: usize },

    /// Peer closed the connection before a complete frame arrived.
    #[error("connection closed")]
    ConnectionClosed,

    /// Stream-level I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CodecError>;
