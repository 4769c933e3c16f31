use std::path::{Path, PathBuf};

use callbridge_codec::wire::{
    send_frame, send_line, FrameReader, WireRequest, WireResponse, PING, PONG,
};
use callbridge_codec::{CallRequest, Value};
use callbridge_transport::{BridgeListener, BridgeStream};

use crate::config::SocketConfig;
use crate::error::{Result, SocketError};

/// Calling side of the socket variant.
///
/// Every operation opens a fresh connection, writes one frame, half-closes,
/// and blocks on the single response frame. The client holds no connection
/// state, so it is freely cloneable and shareable.
#[derive(Debug, Clone)]
pub struct SocketClient {
    path: PathBuf,
    config: SocketConfig,
}

impl SocketClient {
    /// Client for the worker listening at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_config(path, SocketConfig::default())
    }

    pub fn with_config(path: impl AsRef<Path>, config: SocketConfig) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            config,
        }
    }

    /// The socket path this client targets.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Liveness probe: send the literal `ping` line, expect `pong` back.
    pub fn ping(&self) -> Result<()> {
        let mut stream = self.open()?;
        send_line(&mut stream, PING)?;
        stream.shutdown_write()?;

        let mut reader = FrameReader::with_max_line_len(stream, self.config.max_line_len);
        let line = reader.read_line()?;
        if line.as_ref() != PONG {
            return Err(SocketError::Protocol(format!(
                "expected pong, got {} bytes",
                line.len()
            )));
        }
        Ok(())
    }

    /// First exchange: ask the worker for its callable index.
    pub fn init(&self) -> Result<Vec<String>> {
        match self.roundtrip(&WireRequest::Init)? {
            WireResponse::Success(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::Text(name) => Ok(name),
                    other => Err(SocketError::Protocol(format!(
                        "callable index entry is not text: {other:?}"
                    ))),
                })
                .collect(),
            WireResponse::Success(other) => Err(SocketError::Protocol(format!(
                "init response is not an array: {other:?}"
            ))),
            WireResponse::Failure(failure) => Err(SocketError::Call {
                code: failure.code,
                message: failure.message,
            }),
        }
    }

    /// Invoke `method` on the worker and block until its response arrives.
    pub fn call(&self, method: impl Into<String>, args: Vec<Value>) -> Result<Value> {
        let method = method.into();
        tracing::debug!(%method, args = args.len(), "socket call");
        let request = WireRequest::Call(CallRequest::new(method, args));
        match self.roundtrip(&request)? {
            WireResponse::Success(value) => Ok(value),
            WireResponse::Failure(failure) => Err(SocketError::Call {
                code: failure.code,
                message: failure.message,
            }),
        }
    }

    fn open(&self) -> Result<BridgeStream> {
        let stream = BridgeListener::connect(&self.path)?;
        stream.set_read_timeout(self.config.io_timeout)?;
        stream.set_write_timeout(self.config.io_timeout)?;
        Ok(stream)
    }

    /// One request, one response, one connection.
    fn roundtrip(&self, request: &WireRequest) -> Result<WireResponse> {
        let stream = self.open()?;
        let mut writer = stream.try_clone()?;
        let mut reader = FrameReader::with_max_line_len(stream, self.config.max_line_len);

        send_frame(&mut writer, request)?;
        writer.shutdown_write()?;

        Ok(reader.read_frame()?)
    }
}
