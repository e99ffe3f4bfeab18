use std::time::Duration;

use crate::request::LoadKind;

/// How a coordinator call ended, for metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadOutcome {
    Completed,
    Cancelled,
    Rejected,
    Failed,
}

impl LoadOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadOutcome::Completed => "completed",
            LoadOutcome::Cancelled => "cancelled",
            LoadOutcome::Rejected => "rejected",
            LoadOutcome::Failed => "failed",
        }
    }
}

/// Hook for recording task counts and wall time of load runs.
///
/// Implementations must be cheap: they are called inline on the request path.
pub trait LoadMetrics: Send + Sync {
    /// Called once per run with the number of units that were dispatched.
    fn record_started(&self, kind: LoadKind, tasks: usize);

    /// Called once per run when the coordinator returns.
    fn record_finished(&self, kind: LoadKind, outcome: LoadOutcome, elapsed: Duration);
}

/// Metrics backend that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl LoadMetrics for NoopMetrics {
    #[inline]
    fn record_started(&self, _kind: LoadKind, _tasks: usize) {}

    #[inline]
    fn record_finished(&self, _kind: LoadKind, _outcome: LoadOutcome, _elapsed: Duration) {}
}
