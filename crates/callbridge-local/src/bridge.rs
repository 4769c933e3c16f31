use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use callbridge_codec::{CallRequest, CallResponse};
use callbridge_worker::{ActionRegistry, Dispatcher};

use crate::client::BridgeClient;
use crate::error::BridgeError;
use crate::signal::{CompletionSignal, RESPONSE_READY, WORKER_GONE};

/// Tuning knobs for the thread-based bridge.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Upper bound on a single blocking call. `None` blocks forever,
    /// which is the baseline contract; a hung action then hangs the
    /// caller.
    pub call_deadline: Option<Duration>,
    /// How long `launch` waits for the worker to report readiness.
    pub startup_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            call_deadline: None,
            startup_timeout: Duration::from_secs(5),
        }
    }
}

pub(crate) enum WorkerRequest {
    Call { seq: u64, request: CallRequest },
    Shutdown,
}

/// State shared between the worker thread and every client handle.
///
/// The completion signal and the response slot are the only memory the
/// two sides touch concurrently. Responses carry the sequence number of
/// the request that produced them: a call abandoned at its deadline keeps
/// executing in the worker, and its late response must never be handed to
/// a later call.
pub(crate) struct Shared {
    pub(crate) signal: CompletionSignal,
    slot: Mutex<Option<(u64, CallResponse)>>,
    pub(crate) closed: AtomicBool,
    /// Sticky worker-death flag. The completion marker is consumed by the
    /// first caller that observes it; this flag stays set so every later
    /// call fails instead of waiting on a worker that no longer exists.
    pub(crate) gone: AtomicBool,
    seq: AtomicU64,
}

impl Shared {
    fn new() -> Self {
        Self {
            signal: CompletionSignal::new(),
            slot: Mutex::new(None),
            closed: AtomicBool::new(false),
            gone: AtomicBool::new(false),
            seq: AtomicU64::new(0),
        }
    }

    pub(crate) fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst)
    }

    pub(crate) fn store_response(&self, seq: u64, response: CallResponse) {
        *self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some((seq, response));
    }

    pub(crate) fn take_response(&self) -> Option<(u64, CallResponse)> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Lifecycle manager for the thread-based bridge variant.
///
/// `launch` spawns the worker and fails fast if it never reports
/// readiness; `stop` shuts it down and joins it. The worker handle lives
/// here and nowhere else — no module-global state.
pub struct LocalBridge {
    sender: mpsc::Sender<WorkerRequest>,
    worker: Option<JoinHandle<()>>,
    shared: Arc<Shared>,
    call_lock: Arc<Mutex<()>>,
    config: BridgeConfig,
}

impl LocalBridge {
    /// Launch a worker thread owning `registry`.
    pub fn launch(registry: ActionRegistry) -> Result<Self, BridgeError> {
        Self::launch_with_config(registry, BridgeConfig::default())
    }

    /// Launch with explicit configuration.
    pub fn launch_with_config(
        registry: ActionRegistry,
        config: BridgeConfig,
    ) -> Result<Self, BridgeError> {
        let dispatcher = Dispatcher::new(Arc::new(registry));
        let shared = Arc::new(Shared::new());
        let (sender, receiver) = mpsc::channel::<WorkerRequest>();
        let (ready_tx, ready_rx) = mpsc::channel::<()>();

        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name("callbridge-worker".to_string())
            .spawn(move || {
                let _guard = GoneGuard(Arc::clone(&worker_shared));
                if ready_tx.send(()).is_err() {
                    return;
                }
                worker_loop(&dispatcher, &receiver, &worker_shared);
            })
            .map_err(|err| BridgeError::Startup(format!("thread spawn failed: {err}")))?;

        match ready_rx.recv_timeout(config.startup_timeout) {
            Ok(()) => {
                tracing::debug!("bridge worker ready");
            }
            Err(RecvTimeoutError::Timeout) => {
                return Err(BridgeError::Startup(format!(
                    "worker did not report readiness within {:?}",
                    config.startup_timeout
                )));
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(BridgeError::Startup(
                    "worker exited before reporting readiness".to_string(),
                ));
            }
        }

        Ok(Self {
            sender,
            worker: Some(worker),
            shared,
            call_lock: Arc::new(Mutex::new(())),
            config,
        })
    }

    /// A blocking client proxy for this bridge.
    ///
    /// Handles share one call lock, so the one-call-in-flight invariant
    /// holds across all of them.
    pub fn client(&self) -> BridgeClient {
        BridgeClient::new(
            self.sender.clone(),
            Arc::clone(&self.shared),
            Arc::clone(&self.call_lock),
            self.config.call_deadline,
        )
    }

    /// Whether the worker has been stopped.
    pub fn is_stopped(&self) -> bool {
        self.worker.is_none()
    }

    /// Terminate the worker and join it. Idempotent.
    ///
    /// Calls issued on any client after this raises `BridgeError::Stopped`.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.shared
            .closed
            .store(true, std::sync::atomic::Ordering::SeqCst);
        let _ = self.sender.send(WorkerRequest::Shutdown);
        if worker.join().is_err() {
            tracing::warn!("worker thread panicked during shutdown");
        }
        tracing::debug!("bridge worker stopped");
    }
}

impl Drop for LocalBridge {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(
    dispatcher: &Dispatcher,
    receiver: &mpsc::Receiver<WorkerRequest>,
    shared: &Shared,
) {
    while let Ok(request) = receiver.recv() {
        match request {
            WorkerRequest::Shutdown => break,
            WorkerRequest::Call { seq, request } => {
                let response = dispatcher.dispatch(request);
                // Order matters: the slot must hold the payload before the
                // signal fires, so a woken caller always finds it.
                shared.store_response(seq, response);
                shared.signal.set(RESPONSE_READY);
            }
        }
    }
}

/// Wakes a blocked caller if the worker dies without responding, and
/// marks the bridge dead so every later call fails instead of waiting.
///
/// Converts "worker panicked mid-call" from an indefinite hang into a
/// reported transport failure. A completion that is already pending is
/// left untouched.
struct GoneGuard(Arc<Shared>);

impl Drop for GoneGuard {
    fn drop(&mut self) {
        // Flag before marker: a caller that re-arms the signal and then
        // still reads the flag as clear is guaranteed the marker below has
        // not fired yet, so its wait will observe it.
        self.0.gone.store(true, Ordering::SeqCst);
        self.0.signal.set_if_clear(WORKER_GONE);
    }
}
