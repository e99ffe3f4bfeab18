use std::{future::Future, sync::Arc, time::Duration};

use tokio::{sync::Semaphore, task::JoinSet, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::LoadCoordinator;
use crate::{
    error::LoadError,
    kernel,
    request::{LoadKind, LoadRequest},
    result::LoadResult,
};

impl LoadCoordinator {
    /// Simulates blocking I/O: `tasks` units each wait `wait`, at most `parallel` at a time.
    ///
    /// If `token` fires before every dispatched unit has settled, the call returns
    /// [`LoadError::Cancelled`] right away instead of waiting for sleeping workers.
    #[instrument(level = "debug", skip(self, token), fields(kind = "io"))]
    pub async fn io(
        &self,
        token: &CancellationToken,
        tasks: usize,
        wait: Duration,
        parallel: usize,
    ) -> Result<LoadResult, LoadError> {
        self.admit(&LoadRequest::Io {
            tasks,
            wait,
            parallel,
        })?;
        let started_at = Instant::now();

        let (started, settled) = run_gated(token, tasks, parallel, |token| async move {
            kernel::io::wait(&token, wait).await;
        })
        .await;
        self.metrics.record_started(LoadKind::Io, started);

        let result = settled.map(|()| LoadResult::new(started, started_at.elapsed()));
        self.finish(LoadKind::Io, started_at.elapsed(), result)
    }
}

/// Admits `tasks` units through a gate of width `parallel` and races their settlement against
/// `token`.
///
/// Returns how many units were dispatched together with the settlement outcome. Each unit owns
/// its gate permit, so the slot is released exactly once on every exit path, including abort.
pub(crate) async fn run_gated<F, Fut>(
    token: &CancellationToken,
    tasks: usize,
    parallel: usize,
    unit: F,
) -> (usize, Result<(), LoadError>)
where
    F: Fn(CancellationToken) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let gate = Arc::new(Semaphore::new(parallel.min(Semaphore::MAX_PERMITS)));
    let mut workers = JoinSet::new();
    let mut started = 0usize;

    for _ in 0..tasks {
        let permit = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            permit = Arc::clone(&gate).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => return (started, Err(LoadError::Worker("admission gate closed".into()))),
            },
        };

        let work = unit(token.clone());
        workers.spawn(async move {
            let _slot = permit;
            work.await;
        });
        started += 1;
    }

    if started < tasks {
        debug!(target: "gremlin.load.io", started, tasks, "admission interrupted by cancellation");
    }

    // Dropping the set on the cancellation branch aborts workers that are still sleeping; their
    // permits go with them.
    let settle = async move {
        while let Some(joined) = workers.join_next().await {
            joined?;
        }
        Ok::<(), LoadError>(())
    };

    let settled = tokio::select! {
        biased;
        _ = token.cancelled() => Err(LoadError::Cancelled { started }),
        settled = settle => settled,
    };
    (started, settled)
}
