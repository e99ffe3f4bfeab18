use std::{hint::black_box, thread, time::Instant};

use tracing::{debug, instrument, warn};

use super::LoadCoordinator;
use crate::{
    error::LoadError,
    kernel,
    request::{LoadKind, LoadRequest, Reclaim},
    result::LoadResult,
};

impl LoadCoordinator {
    /// Allocates and fills `size` bytes, then releases them according to `reclaim`.
    ///
    /// Synchronous and blocking: with [`Reclaim::After`] the calling thread sleeps while the
    /// buffer stays live. There is no cancellation path.
    #[instrument(level = "debug", skip(self), fields(kind = "memory"))]
    pub fn memory(&self, size: usize, reclaim: Reclaim) -> Result<LoadResult, LoadError> {
        self.admit(&LoadRequest::Memory { size, reclaim })?;
        let started_at = Instant::now();
        self.metrics.record_started(LoadKind::Memory, 1);

        let result = kernel::memory::allocate(size).map(|buf| {
            debug!(target: "gremlin.load.memory", size, ?reclaim, "buffer filled");
            release(buf, reclaim);
            LoadResult::new(1, reclaim.reported_delay())
        });
        self.finish(LoadKind::Memory, started_at.elapsed(), result)
    }
}

fn release(buf: Vec<u8>, reclaim: Reclaim) {
    match reclaim {
        Reclaim::Never => {
            let spawned = thread::Builder::new()
                .name("gremlin-reclaim".into())
                .spawn(move || drop(buf));
            if let Err(e) = spawned {
                warn!(target: "gremlin.load.memory", error = %e, "background release unavailable; released inline");
            }
        }
        Reclaim::Immediate => {
            drop(buf);
            kernel::memory::trim_allocator();
            debug!(target: "gremlin.load.memory", trims = kernel::memory::trim_count(), "allocator trimmed");
        }
        Reclaim::After(delay) => {
            thread::sleep(delay);
            drop(black_box(buf));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    const PROMPT: Duration = Duration::from_millis(500);

    #[test]
    fn never_returns_immediately() {
        let coordinator = LoadCoordinator::new();
        let start = Instant::now();

        let result = coordinator.memory(1 << 20, Reclaim::Never).unwrap();

        assert!(start.elapsed() < PROMPT);
        assert_eq!(result.tasks_started, 1);
        assert_eq!(result.duration, Duration::ZERO);
    }

    #[test]
    fn immediate_reclaims_before_returning() {
        let coordinator = LoadCoordinator::new();
        let before = kernel::memory::trim_count();

        let result = coordinator.memory(1 << 20, Reclaim::Immediate).unwrap();

        assert!(kernel::memory::trim_count() > before);
        assert_eq!(result.tasks_started, 1);
        assert_eq!(result.duration, Duration::ZERO);
    }

    #[test]
    fn after_blocks_for_the_delay() {
        let coordinator = LoadCoordinator::new();
        let delay = Duration::from_millis(150);
        let start = Instant::now();

        let result = coordinator.memory(4096, Reclaim::After(delay)).unwrap();

        assert!(start.elapsed() >= delay);
        assert_eq!(result.duration, delay);
    }

    #[test]
    fn zero_size_is_rejected() {
        let coordinator = LoadCoordinator::new();
        assert_eq!(
            coordinator.memory(0, Reclaim::Immediate).unwrap_err(),
            LoadError::must_be_positive("size")
        );
    }

    #[test]
    fn oversized_allocation_fails_cleanly() {
        let coordinator = LoadCoordinator::new();
        assert_eq!(
            coordinator.memory(usize::MAX, Reclaim::Never).unwrap_err(),
            LoadError::Allocation { size: usize::MAX }
        );
    }
}
