use std::time::Duration;

use serde::Serialize;

/// Outcome of a single coordinator call. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadResult {
    /// Units of work that were actually dispatched.
    pub tasks_started: usize,
    pub duration: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoadResult {
    pub(crate) fn new(tasks_started: usize, duration: Duration) -> Self {
        Self {
            tasks_started,
            duration,
            error: None,
        }
    }
}
