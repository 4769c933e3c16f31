use std::sync::atomic::Ordering;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use callbridge_codec::{CallRequest, CallResponse, Value};

use crate::bridge::{Shared, WorkerRequest};
use crate::error::BridgeError;
use crate::signal::WORKER_GONE;

/// Blocking client proxy for the thread-based bridge.
///
/// One typed entry point instead of one generated method per action:
/// `call(name, args)` is synchronous in the caller's control flow — the
/// calling thread does not resume until the worker's response has been
/// drained.
pub struct BridgeClient {
    sender: Sender<WorkerRequest>,
    shared: Arc<Shared>,
    call_lock: Arc<Mutex<()>>,
    call_deadline: Option<Duration>,
}

impl BridgeClient {
    pub(crate) fn new(
        sender: Sender<WorkerRequest>,
        shared: Arc<Shared>,
        call_lock: Arc<Mutex<()>>,
        call_deadline: Option<Duration>,
    ) -> Self {
        Self {
            sender,
            shared,
            call_lock,
            call_deadline,
        }
    }

    /// Invoke a registered action and block until its response arrives.
    ///
    /// `Value::Bytes` buffers in `args` are moved into the worker, and
    /// buffers in the result are moved back; neither direction copies.
    pub fn call(
        &self,
        method: impl Into<String>,
        args: Vec<Value>,
    ) -> Result<Value, BridgeError> {
        // One call in flight, ever; later callers queue here.
        let _serial = self
            .call_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if self.shared.closed.load(Ordering::SeqCst) {
            return Err(BridgeError::Stopped);
        }
        if self.shared.gone.load(Ordering::SeqCst) {
            return Err(BridgeError::WorkerGone);
        }

        // Restore the in-flight invariant before transmitting; a previous
        // call that timed out may have left a stale completion behind.
        self.shared.signal.reset();
        let _ = self.shared.take_response();

        let seq = self.shared.next_seq();
        let request = CallRequest::new(method, args);
        self.sender
            .send(WorkerRequest::Call { seq, request })
            .map_err(|_| BridgeError::WorkerGone)?;

        // The send can still succeed while the worker thread is unwinding.
        // Re-check after the reset above: the termination guard sets the
        // flag before its completion marker, so a clear flag here means the
        // reset cannot have consumed that marker and the wait below will
        // see it.
        if self.shared.gone.load(Ordering::SeqCst) {
            return Err(BridgeError::WorkerGone);
        }

        let deadline = self.call_deadline.map(|limit| Instant::now() + limit);
        loop {
            let marker = match deadline {
                None => self.shared.signal.wait(),
                Some(deadline) => {
                    let limit = self.call_deadline.unwrap_or_default();
                    let remaining = deadline
                        .checked_duration_since(Instant::now())
                        .ok_or(BridgeError::DeadlineExceeded(limit))?;
                    self.shared
                        .signal
                        .wait_timeout(remaining)
                        .ok_or(BridgeError::DeadlineExceeded(limit))?
                }
            };

            // Re-arm before draining: if the worker stores a response
            // between these two steps its notification is consumed here,
            // but the payload is already in the slot for the take below.
            self.shared.signal.reset();
            let response = self.shared.take_response();

            if marker == WORKER_GONE {
                return Err(BridgeError::WorkerGone);
            }
            match response {
                Some((got, CallResponse::Success(value))) if got == seq => return Ok(value),
                Some((got, CallResponse::Failure(failure))) if got == seq => {
                    return Err(BridgeError::Call(failure));
                }
                // A call abandoned at its deadline finished late; its
                // response belongs to nobody. Keep waiting for ours,
                // unless the worker died after delivering it — its
                // termination marker may have been swallowed by the stale
                // completion, so the flag is the only trace left.
                Some(_) => {
                    if self.shared.gone.load(Ordering::SeqCst) {
                        return Err(BridgeError::WorkerGone);
                    }
                    continue;
                }
                None => return Err(BridgeError::WorkerGone),
            }
        }
    }
}
