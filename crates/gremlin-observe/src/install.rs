use std::io::IsTerminal;

use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::{Layer, Registry, fmt, fmt::time::OffsetTime, layer::SubscriberExt};

use crate::{error::LoggerError, filter::LogFilter, format::LogFormat};

type OutputLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LogFormat,
    pub filter: LogFilter,
    pub with_targets: bool,
    /// ANSI colors; text output only.
    pub use_color: bool,
}

impl LoggerConfig {
    /// Colors are enabled when stdout is a terminal.
    pub fn new(format: LogFormat, filter: LogFilter) -> Self {
        Self {
            format,
            filter,
            with_targets: true,
            use_color: std::io::stdout().is_terminal(),
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::new(LogFormat::default(), LogFilter::default())
    }
}

/// Install the process-wide subscriber described by `cfg`.
///
/// Fails with [`LoggerError::AlreadyInstalled`] once any global subscriber exists.
pub fn init_logger(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = cfg.filter.env_filter()?;
    let output = output_layer(cfg)?;
    let subscriber = tracing_subscriber::registry().with(output.with_filter(filter));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn output_layer(cfg: &LoggerConfig) -> Result<OutputLayer, LoggerError> {
    let layer: OutputLayer = match cfg.format {
        LogFormat::Text => fmt::layer()
            .with_ansi(cfg.use_color)
            .with_target(cfg.with_targets)
            .with_timer(local_rfc3339())
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(cfg.with_targets)
            .with_timer(local_rfc3339())
            .boxed(),
        LogFormat::Journald => journald()?,
    };
    Ok(layer)
}

fn local_rfc3339() -> OffsetTime<Rfc3339> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn journald() -> Result<OutputLayer, LoggerError> {
    let layer = tracing_journald::layer().map_err(LoggerError::Journald)?;
    Ok(layer.boxed())
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn journald() -> Result<OutputLayer, LoggerError> {
    Err(LoggerError::JournaldUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_rejected() {
        let _ = init_logger(&LoggerConfig::default());

        let json = LoggerConfig::new(LogFormat::Json, LogFilter::default());
        assert!(matches!(
            init_logger(&json),
            Err(LoggerError::AlreadyInstalled(_))
        ));
    }

    #[test]
    fn output_layers_follow_build() {
        let layer = |format| output_layer(&LoggerConfig::new(format, LogFilter::default()));

        assert!(layer(LogFormat::Text).is_ok());
        assert!(layer(LogFormat::Json).is_ok());
        if !LogFormat::journald_available() {
            assert!(matches!(
                layer(LogFormat::Journald),
                Err(LoggerError::JournaldUnavailable)
            ));
        }
    }
}
