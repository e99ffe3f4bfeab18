use std::{fmt, str::FromStr};

use tracing_subscriber::EnvFilter;

use crate::error::LoggerError;

/// `EnvFilter` directives, checked once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter(String);

impl LogFilter {
    /// Service targets at info, dependencies (sqlx, hyper, reqwest) at warn.
    pub const DEFAULT: &'static str = "warn,gremlin=info";

    pub fn new(directives: impl Into<String>) -> Result<Self, LoggerError> {
        let directives = directives.into();
        compile(&directives)?;
        Ok(Self(directives))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn env_filter(&self) -> Result<EnvFilter, LoggerError> {
        compile(&self.0)
    }
}

fn compile(directives: &str) -> Result<EnvFilter, LoggerError> {
    EnvFilter::try_new(directives).map_err(|source| LoggerError::InvalidFilter {
        directives: directives.to_string(),
        source,
    })
}

impl Default for LogFilter {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl FromStr for LogFilter {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for LogFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn default_scopes_service_targets() {
        let filter = LogFilter::default();
        assert_eq!(filter.as_str(), "warn,gremlin=info");
        assert!(filter.env_filter().is_ok());
    }

    #[test]
    fn accepts_targeted_directives() {
        let filter: LogFilter = "info,gremlin.load=trace".parse().unwrap();
        assert_eq!(filter.to_string(), "info,gremlin.load=trace");
    }

    #[test]
    fn invalid_level_keeps_directives_and_cause() {
        let err = LogFilter::new("gremlin=loud").unwrap_err();

        assert!(err.source().is_some());
        assert!(err.to_string().contains("'gremlin=loud'"));
        assert!(matches!(
            err,
            LoggerError::InvalidFilter { ref directives, .. } if directives == "gremlin=loud"
        ));
    }
}
