use super::{ValidationReport, Validator};
use crate::graph::Graph;
use ahash::AHashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const TRACING_TARGET: &str = "flowdraft::validator::debounce";

/// Delay between the last edit of a field and its validation pass.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// The report of a debounced pass that was not superseded.
#[derive(Debug, Clone)]
pub struct SettledValidation {
    pub key: String,
    pub report: ValidationReport,
}

struct PendingPass {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Coalesces bursts of edits into one validation pass per key.
///
/// Each [`schedule`](Self::schedule) call for a key cancels the pass previously
/// scheduled for that key, so a stale result never reaches the receiver. Keys are
/// independent: editing one node's label does not delay another node's pass.
///
/// Passes run on the runtime captured at construction, so scheduling itself does
/// not need to happen inside one.
pub struct DebouncedValidator {
    runtime: Handle,
    validator: Arc<Validator>,
    delay: Duration,
    pending: AHashMap<String, PendingPass>,
    settled: mpsc::UnboundedSender<SettledValidation>,
}

impl DebouncedValidator {
    /// A debouncer running its passes on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime. Use [`with_runtime`](Self::with_runtime)
    /// to pass a handle explicitly.
    pub fn new(
        validator: Arc<Validator>,
        delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SettledValidation>) {
        Self::with_runtime(Handle::current(), validator, delay)
    }

    pub fn with_runtime(
        runtime: Handle,
        validator: Arc<Validator>,
        delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SettledValidation>) {
        let (settled, receiver) = mpsc::unbounded_channel();
        let debouncer = Self {
            runtime,
            validator,
            delay,
            pending: AHashMap::new(),
            settled,
        };
        (debouncer, receiver)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules a pass over `graph` as it is now, replacing any pass pending for `key`.
    pub fn schedule(&mut self, key: impl Into<String>, graph: &Graph) {
        let key = key.into();
        if self.cancel(&key) {
            tracing::trace!(target: TRACING_TARGET, key = %key, "Superseded pending pass");
        }
        self.pending.retain(|_, pass| !pass.handle.is_finished());

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let snapshot = graph.clone();
        let validator = Arc::clone(&self.validator);
        let settled = self.settled.clone();
        let delay = self.delay;
        let pass_key = key.clone();

        let handle = self.runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let report = validator.validate(&snapshot);
                    tracing::debug!(
                        target: TRACING_TARGET,
                        key = %pass_key,
                        violations = report.len(),
                        "Validation settled"
                    );
                    // The receiver may be gone when the session closed first.
                    let _ = settled.send(SettledValidation { key: pass_key, report });
                }
            }
        });

        self.pending.insert(key, PendingPass { token, handle });
    }

    /// Cancels the pass pending for `key`. Returns whether one was still running.
    pub fn cancel(&mut self, key: &str) -> bool {
        match self.pending.remove(key) {
            Some(pass) => {
                let running = !pass.handle.is_finished();
                pass.token.cancel();
                pass.handle.abort();
                running
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, pass) in self.pending.drain() {
            pass.token.cancel();
            pass.handle.abort();
        }
    }

    /// Number of passes that have not settled or been cancelled yet.
    pub fn pending(&self) -> usize {
        self.pending
            .values()
            .filter(|pass| !pass.handle.is_finished())
            .count()
    }
}

impl Drop for DebouncedValidator {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
