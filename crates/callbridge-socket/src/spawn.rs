use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Instant;

use crate::client::SocketClient;
use crate::config::SocketConfig;
use crate::error::{Result, SocketError};

/// How to launch a worker executable.
#[derive(Debug, Clone)]
pub struct SpawnConfig {
    /// Worker executable to run.
    pub program: PathBuf,
    /// Arguments passed to the worker. The worker is expected to bind
    /// [`SpawnConfig::socket_path`] and serve the call protocol on it.
    pub args: Vec<String>,
    /// Socket path the worker will listen on.
    pub socket_path: PathBuf,
    /// Socket tuning shared with the client.
    pub socket: SocketConfig,
}

impl SpawnConfig {
    pub fn new(program: impl AsRef<Path>, socket_path: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            socket_path: socket_path.as_ref().to_path_buf(),
            socket: SocketConfig::default(),
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_socket_config(mut self, socket: SocketConfig) -> Self {
        self.socket = socket;
        self
    }
}

/// Owns a spawned worker process and hands out clients for it.
///
/// `launch` starts the worker and blocks until it answers the liveness
/// probe, so a returned bridge is immediately callable. Dropping the
/// bridge stops the worker.
pub struct ProcessBridge {
    child: Option<Child>,
    client: SocketClient,
}

impl ProcessBridge {
    /// Spawn the worker and wait for it to become ready.
    ///
    /// Fails fast: if the process exits before answering the probe, or the
    /// probe window elapses, the error surfaces here instead of on the
    /// first call.
    pub fn launch(config: SpawnConfig) -> Result<Self> {
        tracing::info!(
            program = ?config.program,
            socket = ?config.socket_path,
            "launching worker process"
        );
        let child = Command::new(&config.program)
            .args(&config.args)
            .stdin(Stdio::null())
            .spawn()
            .map_err(SocketError::Spawn)?;

        let client = SocketClient::with_config(&config.socket_path, config.socket.clone());
        let mut bridge = Self {
            child: Some(child),
            client,
        };
        bridge.wait_ready(&config)?;
        Ok(bridge)
    }

    fn wait_ready(&mut self, config: &SpawnConfig) -> Result<()> {
        let deadline = Instant::now() + config.socket.ready_timeout;
        loop {
            if let Some(child) = self.child.as_mut() {
                match child.try_wait() {
                    Ok(Some(status)) => {
                        self.child = None;
                        return Err(SocketError::Startup(format!(
                            "worker process exited during startup ({status})"
                        )));
                    }
                    Ok(None) => {}
                    Err(err) => {
                        self.stop();
                        return Err(SocketError::Startup(format!(
                            "could not poll worker process: {err}"
                        )));
                    }
                }
            }

            match self.client.ping() {
                Ok(()) => {
                    tracing::debug!("worker process is ready");
                    return Ok(());
                }
                Err(err) if Instant::now() >= deadline => {
                    self.stop();
                    return Err(SocketError::Startup(format!(
                        "worker did not become ready within {:?}: {err}",
                        config.socket.ready_timeout
                    )));
                }
                Err(_) => std::thread::sleep(config.socket.ready_poll_interval),
            }
        }
    }

    /// A client bound to this worker's socket.
    pub fn client(&self) -> SocketClient {
        self.client.clone()
    }

    /// Whether the worker has been stopped.
    pub fn is_stopped(&self) -> bool {
        self.child.is_none()
    }

    /// Stop the worker process. Idempotent.
    pub fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            tracing::info!(pid = child.id(), "stopping worker process");
            if let Err(err) = child.kill() {
                tracing::warn!(error = %err, "failed to kill worker process");
            }
            match child.wait() {
                Ok(status) => tracing::debug!(%status, "worker process reaped"),
                Err(err) => tracing::warn!(error = %err, "failed to reap worker process"),
            }
        }
    }
}

impl Drop for ProcessBridge {
    fn drop(&mut self) {
        self.stop();
    }
}
