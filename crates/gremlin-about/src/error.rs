use thiserror::Error;

#[derive(Debug, Error)]
pub enum AboutError {
    #[error("failed to resolve hostname: {0}")]
    Hostname(#[from] std::io::Error),

    #[error("failed to format timestamp: {0}")]
    Time(#[from] time::error::Format),
}
