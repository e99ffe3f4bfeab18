use std::{thread, time::Duration};

use tokio::{sync::oneshot, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace, warn};

use super::LoadCoordinator;
use crate::{
    error::LoadError,
    kernel,
    request::{LoadKind, LoadRequest},
    result::LoadResult,
};

impl LoadCoordinator {
    /// Burns CPU on `tasks` dedicated OS threads for `duration` each.
    ///
    /// Workers never run on the runtime's blocking pool, so a large fan-out neither queues
    /// behind nor starves other blocking work. Cancellation only shortens the worker loops:
    /// the call waits for every worker and always reports `tasks` as started.
    #[instrument(level = "debug", skip(self, token), fields(kind = "cpu"))]
    pub async fn cpu(
        &self,
        token: &CancellationToken,
        tasks: usize,
        duration: Duration,
    ) -> Result<LoadResult, LoadError> {
        self.admit(&LoadRequest::Cpu { tasks, duration })?;
        let started_at = Instant::now();

        // Child token: a failed spawn stops the workers already running.
        let workers_token = token.child_token();
        let mut reports = Vec::with_capacity(tasks);
        let mut failure = None;
        for index in 0..tasks {
            match spawn_worker(index, workers_token.clone(), duration) {
                Ok(report) => reports.push(report),
                Err(e) => {
                    warn!(target: "gremlin.load.cpu", index, error = %e, "cpu worker spawn failed");
                    failure = Some(LoadError::Worker(format!("spawn cpu worker: {e}")));
                    workers_token.cancel();
                    break;
                }
            }
        }
        self.metrics.record_started(LoadKind::Cpu, reports.len());
        debug!(target: "gremlin.load.cpu", tasks, ?duration, "workers dispatched");

        let mut iterations: u64 = 0;
        for report in reports {
            match report.await {
                Ok(n) => iterations = iterations.saturating_add(n),
                Err(_) => {
                    failure.get_or_insert_with(|| LoadError::Worker("cpu worker panicked".into()));
                }
            }
        }

        trace!(
            target: "gremlin.load.cpu",
            iterations,
            cancelled = token.is_cancelled(),
            "workers joined"
        );
        let result = match failure {
            Some(e) => Err(e),
            None => Ok(LoadResult::new(tasks, duration)),
        };
        self.finish(LoadKind::Cpu, started_at.elapsed(), result)
    }
}

/// Starts one spinning thread. The receiver resolves with the iteration count once the
/// worker has stopped, or with an error if it panicked.
fn spawn_worker(
    index: usize,
    token: CancellationToken,
    duration: Duration,
) -> std::io::Result<oneshot::Receiver<u64>> {
    let (tx, rx) = oneshot::channel();
    thread::Builder::new()
        .name(format!("gremlin-cpu-{index}"))
        .spawn(move || {
            let _ = tx.send(kernel::cpu::spin(&token, duration));
        })?;
    Ok(rx)
}
