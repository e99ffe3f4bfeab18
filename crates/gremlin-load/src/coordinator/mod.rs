use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    error::LoadError,
    metrics::{LoadMetrics, LoadOutcome, NoopMetrics},
    request::{LoadKind, LoadRequest},
    result::LoadResult,
};

mod cpu;
mod io;
mod memory;

/// Entry point for every workload kind.
///
/// Each call owns its workers, token view and gate; nothing is shared across concurrent calls
/// except the metrics backend.
#[derive(Clone)]
pub struct LoadCoordinator {
    metrics: Arc<dyn LoadMetrics>,
}

impl LoadCoordinator {
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(NoopMetrics),
        }
    }

    pub fn with_metrics(metrics: Arc<dyn LoadMetrics>) -> Self {
        Self { metrics }
    }

    /// Runs `request` to settlement.
    ///
    /// Memory load is synchronous and runs on the blocking pool so the caller's executor is not
    /// stalled by the reclaim delay.
    pub async fn run(
        &self,
        request: LoadRequest,
        token: &CancellationToken,
    ) -> Result<LoadResult, LoadError> {
        match request {
            LoadRequest::Cpu { tasks, duration } => self.cpu(token, tasks, duration).await,
            LoadRequest::Io {
                tasks,
                wait,
                parallel,
            } => self.io(token, tasks, wait, parallel).await,
            LoadRequest::Memory { size, reclaim } => {
                let this = self.clone();
                tokio::task::spawn_blocking(move || this.memory(size, reclaim)).await?
            }
        }
    }

    fn admit(&self, request: &LoadRequest) -> Result<(), LoadError> {
        request.validate().inspect_err(|e| {
            debug!(target: "gremlin.load", kind = %request.kind(), error = %e, "request rejected");
            self.metrics
                .record_finished(request.kind(), LoadOutcome::Rejected, Duration::ZERO);
        })
    }

    fn finish(
        &self,
        kind: LoadKind,
        elapsed: Duration,
        result: Result<LoadResult, LoadError>,
    ) -> Result<LoadResult, LoadError> {
        let outcome = match &result {
            Ok(_) => LoadOutcome::Completed,
            Err(LoadError::Cancelled { .. }) => LoadOutcome::Cancelled,
            Err(LoadError::Validation { .. }) => LoadOutcome::Rejected,
            Err(e) => {
                warn!(target: "gremlin.load", %kind, error = %e, "load run failed");
                LoadOutcome::Failed
            }
        };
        self.metrics.record_finished(kind, outcome, elapsed);
        result
    }
}

impl Default for LoadCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Metrics backend that keeps every call for assertions.
    #[derive(Default)]
    pub struct RecordingMetrics {
        pub started: Mutex<Vec<(LoadKind, usize)>>,
        pub finished: Mutex<Vec<(LoadKind, LoadOutcome)>>,
    }

    impl LoadMetrics for RecordingMetrics {
        fn record_started(&self, kind: LoadKind, tasks: usize) {
            self.started.lock().unwrap().push((kind, tasks));
        }

        fn record_finished(&self, kind: LoadKind, outcome: LoadOutcome, _elapsed: Duration) {
            self.finished.lock().unwrap().push((kind, outcome));
        }
    }
}
