use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Workload kind, selects which kernel the coordinator fans out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadKind {
    Cpu,
    Memory,
    Io,
}

impl LoadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadKind::Cpu => "cpu",
            LoadKind::Memory => "memory",
            LoadKind::Io => "io",
        }
    }
}

impl fmt::Display for LoadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens to a memory-load buffer once it has been filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reclaim {
    /// Return at once and let the buffer be released in the background.
    Never,
    /// Release the buffer and trim the allocator before returning.
    #[default]
    Immediate,
    /// Keep the buffer live for the given delay, then release it.
    After(Duration),
}

impl Reclaim {
    /// Maps a non-negative delay: zero means immediate reclamation.
    pub fn after(delay: Duration) -> Self {
        if delay.is_zero() {
            Reclaim::Immediate
        } else {
            Reclaim::After(delay)
        }
    }

    /// Delay reported back in [`crate::LoadResult::duration`].
    pub fn reported_delay(&self) -> Duration {
        match self {
            Reclaim::After(delay) => *delay,
            Reclaim::Never | Reclaim::Immediate => Duration::ZERO,
        }
    }
}

/// Kind-specific load parameters for a single call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRequest {
    Cpu {
        tasks: usize,
        duration: Duration,
    },
    Memory {
        size: usize,
        reclaim: Reclaim,
    },
    Io {
        tasks: usize,
        wait: Duration,
        parallel: usize,
    },
}

impl LoadRequest {
    pub fn kind(&self) -> LoadKind {
        match self {
            LoadRequest::Cpu { .. } => LoadKind::Cpu,
            LoadRequest::Memory { .. } => LoadKind::Memory,
            LoadRequest::Io { .. } => LoadKind::Io,
        }
    }

    /// Checks the invariants of the request; nothing is spawned on failure.
    pub fn validate(&self) -> Result<(), LoadError> {
        match *self {
            LoadRequest::Cpu { tasks, duration } => {
                positive("tasks", tasks)?;
                positive_duration("duration", duration)
            }
            LoadRequest::Memory { size, .. } => positive("size", size),
            LoadRequest::Io {
                tasks,
                wait,
                parallel,
            } => {
                positive("tasks", tasks)?;
                positive_duration("wait", wait)?;
                positive("parallel", parallel)
            }
        }
    }
}

#[inline]
fn positive(param: &'static str, value: usize) -> Result<(), LoadError> {
    if value == 0 {
        return Err(LoadError::must_be_positive(param));
    }
    Ok(())
}

#[inline]
fn positive_duration(param: &'static str, value: Duration) -> Result<(), LoadError> {
    if value.is_zero() {
        return Err(LoadError::must_be_positive(param));
    }
    Ok(())
}
