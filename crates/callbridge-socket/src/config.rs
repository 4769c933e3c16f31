use std::time::Duration;

use callbridge_codec::wire::DEFAULT_MAX_LINE_LEN;

/// Tuning knobs shared by the socket server, client, and spawner.
#[derive(Debug, Clone)]
pub struct SocketConfig {
    /// Bound on a single encoded frame line.
    pub max_line_len: usize,
    /// Per-stream read/write timeout. `None` blocks forever.
    pub io_timeout: Option<Duration>,
    /// How long `ProcessBridge::launch` waits for the worker to answer
    /// the liveness probe.
    pub ready_timeout: Duration,
    /// Interval between liveness probes during startup.
    pub ready_poll_interval: Duration,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            max_line_len: DEFAULT_MAX_LINE_LEN,
            io_timeout: Some(Duration::from_secs(5)),
            ready_timeout: Duration::from_secs(5),
            ready_poll_interval: Duration::from_millis(25),
        }
    }
}

impl SocketConfig {
    pub fn with_io_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.io_timeout = timeout;
        self
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    pub fn with_max_line_len(mut self, max: usize) -> Self {
        self.max_line_len = max;
        self
    }
}
