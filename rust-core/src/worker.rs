//! Background execution of long transforms
//!
//! A job runs on its own thread and reports through a one-slot channel.
//! Cancelling only flags the job; whatever it produces afterwards is
//! discarded, so no partial result ever reaches the caller.

use crate::audio::AudioBuffer;
use crate::error::{EngineError, Result};
use crate::filters::{FilterApplier, FilterCoefficients};
use crate::spectrum::{SpectralAnalyzer, Spectrum};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once cancellation was requested
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Handle to a job running on a worker thread
pub struct Task<T> {
    receiver: flume::Receiver<Result<T>>,
    token: CancelToken,
}

impl<T> Task<T> {
    /// Request cancellation; the pending result will be discarded
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Block until the job finishes
    pub fn wait(self) -> Result<T> {
        if self.token.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        match self.receiver.recv() {
            Ok(result) => self.resolve(result),
            Err(flume::RecvError::Disconnected) => {
                log::warn!("Worker thread exited without reporting a result");
                Err(EngineError::WorkerPanicked("no result reported".to_string()))
            }
        }
    }

    /// Result if the job has finished, without blocking
    pub fn try_result(&self) -> Option<Result<T>> {
        if self.token.is_cancelled() {
            return Some(Err(EngineError::Cancelled));
        }
        match self.receiver.try_recv() {
            Ok(result) => Some(self.resolve(result)),
            Err(flume::TryRecvError::Empty) => None,
            Err(flume::TryRecvError::Disconnected) => Some(Err(EngineError::WorkerPanicked(
                "no result reported".to_string(),
            ))),
        }
    }

    fn resolve(&self, result: Result<T>) -> Result<T> {
        if self.token.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            result
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Run `job` on a dedicated thread
///
/// The job receives the task's cancel token and may poll it between stages.
/// A panic inside the job is reported as `WorkerPanicked`.
pub fn spawn<T, F>(job: F) -> Task<T>
where
    T: Send + 'static,
    F: FnOnce(&CancelToken) -> Result<T> + Send + 'static,
{
    let (sender, receiver) = flume::bounded(1);
    let token = CancelToken::new();
    let worker_token = token.clone();

    thread::spawn(move || {
        let result = match worker_token.check() {
            Ok(()) => panic::catch_unwind(AssertUnwindSafe(|| job(&worker_token)))
                .unwrap_or_else(|payload| {
                    let message = panic_message(payload.as_ref());
                    log::error!("Background job panicked: {}", message);
                    Err(EngineError::WorkerPanicked(message))
                }),
            Err(e) => Err(e),
        };
        if worker_token.is_cancelled() {
            log::debug!("Discarding result of cancelled task");
            return;
        }
        // Receiver may already be gone
        let _ = sender.send(result);
    });

    Task { receiver, token }
}

/// Apply a filter in the background
pub fn spawn_apply(
    applier: FilterApplier,
    buffer: AudioBuffer,
    coefficients: FilterCoefficients,
    zero_phase: bool,
) -> Task<AudioBuffer> {
    spawn(move |_| applier.apply(&buffer, &coefficients, zero_phase))
}

/// Compute a forward transform in the background
pub fn spawn_transform(analyzer: SpectralAnalyzer, buffer: AudioBuffer) -> Task<Spectrum> {
    spawn(move |_| analyzer.forward_transform(&buffer))
}
