//! Tracing subscriber setup for the `gremlin` service.
//!
//! One global subscriber per process: text, JSON or journald output behind a
//! validated [`LogFilter`]. Service targets live under `gremlin.*`.

mod error;
mod filter;
mod format;
mod install;

pub use error::LoggerError;
pub use filter::LogFilter;
pub use format::LogFormat;
pub use install::{LoggerConfig, init_logger};
