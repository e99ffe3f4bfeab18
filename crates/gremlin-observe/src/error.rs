use thiserror::Error;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::filter::ParseError;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format '{0}' (expected text, json or journald)")]
    UnknownFormat(String),

    #[error("journald output needs a Linux build with the `journald` feature")]
    JournaldUnavailable,

    #[error("invalid log filter '{directives}': {source}")]
    InvalidFilter {
        directives: String,
        #[source]
        source: ParseError,
    },

    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled(#[from] SetGlobalDefaultError),

    #[error("journald socket unavailable: {0}")]
    Journald(#[source] std::io::Error),
}
