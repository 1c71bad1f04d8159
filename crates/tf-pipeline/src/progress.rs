//! Progress reporting for pipeline runs.

use tf_core::JobId;

use crate::job::JobState;

/// A single job state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobEvent {
    pub job: JobId,
    pub state: JobState,
    /// Jobs in a terminal state, including this one if it just finished.
    pub completed: usize,
    pub total: usize,
}

/// Sender for reporting job transitions out of the executor.
///
/// Wraps a callback invoked once per transition. The callback may be called
/// from several tasks at once and should return quickly.
pub struct ProgressSender {
    callback: Box<dyn Fn(&JobEvent) + Send + Sync>,
}

impl ProgressSender {
    /// Create a new sender from the given callback.
    pub fn new(callback: impl Fn(&JobEvent) + Send + Sync + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Create a no-op sender that discards all progress reports.
    pub fn noop() -> Self {
        Self {
            callback: Box::new(|_| {}),
        }
    }

    /// Report a transition.
    pub fn send(&self, event: JobEvent) {
        (self.callback)(&event);
    }
}

impl Default for ProgressSender {
    fn default() -> Self {
        Self::noop()
    }
}

impl std::fmt::Debug for ProgressSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressSender").finish_non_exhaustive()
    }
}
