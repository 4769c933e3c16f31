use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use callbridge_codec::wire::{
    send_frame, send_line, FrameReader, WireFailure, WireRequest, WireResponse, PING, PONG,
};
use callbridge_codec::{CallResponse, CodecError, Value};
use callbridge_transport::{BridgeListener, BridgeStream};
use callbridge_worker::{ActionRegistry, Dispatcher};

use crate::config::SocketConfig;
use crate::error::Result;

/// Worker-side server: one call per connection.
///
/// Each accepted connection carries exactly one exchange: a literal `ping`
/// answered with `pong`, an `INIT` answered with the callable index, or a
/// `CALL` answered with the `{s, v}` envelope. The response is written,
/// the write side is closed, and the connection is done.
pub struct CallServer {
    listener: BridgeListener,
    dispatcher: Dispatcher,
    config: SocketConfig,
}

impl CallServer {
    /// Bind on `path`, serving `registry`.
    pub fn bind(path: impl AsRef<Path>, registry: Arc<ActionRegistry>) -> Result<Self> {
        Self::bind_with_config(path, registry, SocketConfig::default())
    }

    /// Bind with explicit configuration.
    pub fn bind_with_config(
        path: impl AsRef<Path>,
        registry: Arc<ActionRegistry>,
        config: SocketConfig,
    ) -> Result<Self> {
        let listener = BridgeListener::bind(path)?;
        tracing::info!(path = ?listener.path(), actions = registry.len(), "call server bound");
        Ok(Self {
            listener,
            dispatcher: Dispatcher::new(registry),
            config,
        })
    }

    /// The socket path this server is bound to.
    pub fn path(&self) -> &Path {
        self.listener.path()
    }

    /// Accept and handle connections until `running` clears.
    ///
    /// Per-connection failures are logged and do not stop the loop; only
    /// accept failures are fatal.
    pub fn serve(&self, running: &AtomicBool) -> Result<()> {
        while running.load(Ordering::SeqCst) {
            self.handle_next()?;
        }
        Ok(())
    }

    /// Accept and handle exactly one connection.
    pub fn handle_next(&self) -> Result<()> {
        let stream = self.listener.accept()?;
        if let Err(err) = self.handle_connection(stream) {
            tracing::warn!(error = %err, "connection handling failed");
        }
        Ok(())
    }

    fn handle_connection(&self, stream: BridgeStream) -> Result<()> {
        stream.set_read_timeout(self.config.io_timeout)?;
        stream.set_write_timeout(self.config.io_timeout)?;

        let mut writer = stream.try_clone()?;
        let mut reader = FrameReader::with_max_line_len(stream, self.config.max_line_len);

        let line = reader.read_line()?;

        // Liveness probe: literal bytes, no base64 layer.
        if line.as_ref() == PING {
            tracing::debug!("answering liveness probe");
            send_line(&mut writer, PONG)?;
            writer.shutdown_write()?;
            return Ok(());
        }

        let response = match callbridge_codec::wire::decode_frame::<WireRequest>(&line) {
            Ok(WireRequest::Init) => {
                let names = self.dispatcher.registry().names();
                tracing::debug!(actions = names.len(), "answering init");
                WireResponse::Success(Value::Array(
                    names.into_iter().map(Value::Text).collect(),
                ))
            }
            Ok(WireRequest::Call(call)) => match self.dispatcher.dispatch(call) {
                CallResponse::Success(value) => WireResponse::Success(value),
                // Reduced envelope: properties are dropped on this transport.
                CallResponse::Failure(failure) => WireResponse::Failure(WireFailure {
                    code: failure.kind,
                    message: failure.message,
                }),
            },
            Err(err) => WireResponse::Failure(bad_request(&err)),
        };

        send_frame(&mut writer, &response)?;
        writer.shutdown_write()?;
        Ok(())
    }
}

fn bad_request(err: &CodecError) -> WireFailure {
    WireFailure {
        code: "bad_request".to_string(),
        message: format!("malformed request frame: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::thread;

    use callbridge_worker::ActionError;

    use super::*;
    use crate::client::SocketClient;

    fn temp_sock(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "cbs-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir.join("worker.sock")
    }

    fn demo_registry() -> Arc<ActionRegistry> {
        Arc::new(
            ActionRegistry::new()
                .with_action("incr", |args| {
                    let n = args
                        .first()
                        .and_then(Value::as_int)
                        .ok_or_else(|| ActionError::invalid_args("incr expects one integer"))?;
                    Ok(Value::Int(n + 1))
                })
                .with_action("boom", |_| {
                    Err(ActionError::new("MyError", "boom")
                        .with_property("extra", Value::Text("x".to_string())))
                }),
        )
    }

    fn serve_n(server: CallServer, connections: usize) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            for _ in 0..connections {
                server.handle_next().expect("connection should be handled");
            }
        })
    }

    #[test]
    fn ping_pong_liveness_probe() {
        let sock_path = temp_sock("ping");
        let server =
            CallServer::bind(&sock_path, demo_registry()).expect("server should bind");
        let handle = serve_n(server, 1);

        let client = SocketClient::new(&sock_path);
        client.ping().expect("ping should succeed");

        handle.join().expect("server thread should finish");
        if let Some(parent) = sock_path.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }
    }

    #[test]
    fn init_returns_callable_index() {
        let sock_path = temp_sock("init");
        let server =
            CallServer::bind(&sock_path, demo_registry()).expect("server should bind");
        let handle = serve_n(server, 1);

        let client = SocketClient::new(&sock_path);
        let names = client.init().expect("init should succeed");
        assert_eq!(names, vec!["boom", "incr"]);

        handle.join().expect("server thread should finish");
        if let Some(parent) = sock_path.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }
    }

    #[test]
    fn each_call_is_its_own_connection() {
        let sock_path = temp_sock("calls");
        let server =
            CallServer::bind(&sock_path, demo_registry()).expect("server should bind");
        let handle = serve_n(server, 3);

        let client = SocketClient::new(&sock_path);
        for i in 0..3i64 {
            let result = client
                .call("incr", vec![Value::Int(i)])
                .expect("incr should succeed");
            assert_eq!(result, Value::Int(i + 1));
        }

        handle.join().expect("server thread should finish");
        if let Some(parent) = sock_path.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }
    }

    #[test]
    fn failure_envelope_carries_code_and_message_only() {
        let sock_path = temp_sock("boom");
        let server =
            CallServer::bind(&sock_path, demo_registry()).expect("server should bind");
        let handle = serve_n(server, 1);

        let client = SocketClient::new(&sock_path);
        let err = client
            .call("boom", vec![])
            .expect_err("boom should fail");

        match err {
            crate::SocketError::Call { code, message } => {
                assert_eq!(code, "MyError");
                assert_eq!(message, "boom");
            }
            other => panic!("expected call failure, got {other:?}"),
        }

        handle.join().expect("server thread should finish");
        if let Some(parent) = sock_path.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }
    }

    #[test]
    fn unknown_action_is_reported() {
        let sock_path = temp_sock("unknown");
        let server =
            CallServer::bind(&sock_path, demo_registry()).expect("server should bind");
        let handle = serve_n(server, 1);

        let client = SocketClient::new(&sock_path);
        let err = client
            .call("absent", vec![])
            .expect_err("unknown action should fail");
        match err {
            crate::SocketError::Call { code, .. } => {
                assert_eq!(code, callbridge_worker::UNKNOWN_ACTION);
            }
            other => panic!("expected call failure, got {other:?}"),
        }

        handle.join().expect("server thread should finish");
        if let Some(parent) = sock_path.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }
    }

    #[test]
    fn malformed_frame_gets_bad_request() {
        let sock_path = temp_sock("garbage");
        let server =
            CallServer::bind(&sock_path, demo_registry()).expect("server should bind");
        let handle = serve_n(server, 1);

        let mut stream = BridgeListener::connect(&sock_path).expect("connect should succeed");
        send_line(&mut stream, b"!!not-a-frame!!").expect("line should send");
        stream.shutdown_write().expect("half-close should succeed");

        let mut reader = FrameReader::new(stream);
        let response: WireResponse = reader.read_frame().expect("response should decode");
        match response {
            WireResponse::Failure(failure) => assert_eq!(failure.code, "bad_request"),
            other => panic!("expected failure, got {other:?}"),
        }

        handle.join().expect("server thread should finish");
        if let Some(parent) = sock_path.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }
    }
}
