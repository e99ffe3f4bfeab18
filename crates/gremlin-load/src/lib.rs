//! Concurrent resource load generator.
//!
//! [`LoadCoordinator`] launches bounded, cancellable, time-bounded workloads that burn CPU,
//! hold memory, or simulate blocking I/O, and reports how many units of work started and how long
//! the run took.
//!
//! | kind   | fan-out                         | cancellation                              |
//! |--------|---------------------------------|-------------------------------------------|
//! | CPU    | `tasks` dedicated threads       | shortens worker loops, join always waits  |
//! | Memory | single synchronous allocation   | none                                      |
//! | I/O    | `tasks` units behind a gate     | surfaced as [`LoadError::Cancelled`]      |
mod error;
pub use error::LoadError;

mod request;
pub use request::{LoadKind, LoadRequest, Reclaim};

mod result;
pub use result::LoadResult;

mod metrics;
pub use metrics::{LoadMetrics, LoadOutcome, NoopMetrics};

pub mod kernel;

mod coordinator;
pub use coordinator::LoadCoordinator;

pub use tokio_util::sync::CancellationToken;

pub mod prelude {
    pub use crate::{
        CancellationToken, LoadCoordinator, LoadError, LoadKind, LoadRequest, LoadResult, Reclaim,
    };
}
