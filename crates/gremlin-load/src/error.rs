use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("invalid {param}: {reason}")]
    Validation {
        param: &'static str,
        reason: &'static str,
    },
    #[error("cancelled after {started} tasks started")]
    Cancelled { started: usize },
    #[error("failed to allocate {size} bytes")]
    Allocation { size: usize },
    #[error("worker failed: {0}")]
    Worker(String),
}

impl LoadError {
    #[inline]
    pub(crate) fn must_be_positive(param: &'static str) -> Self {
        LoadError::Validation {
            param,
            reason: "must be positive",
        }
    }

    /// Returns `true` for caller-initiated aborts.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoadError::Cancelled { .. })
    }

    /// Returns `true` for parameter errors detected before any work started.
    #[inline]
    pub fn is_validation(&self) -> bool {
        matches!(self, LoadError::Validation { .. })
    }
}

impl From<tokio::task::JoinError> for LoadError {
    fn from(e: tokio::task::JoinError) -> Self {
        LoadError::Worker(e.to_string())
    }
}
