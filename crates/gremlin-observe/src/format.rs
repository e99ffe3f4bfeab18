use std::{fmt, str::FromStr};

use crate::error::LoggerError;

/// Where log records go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
    Journald,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
            LogFormat::Journald => "journald",
        }
    }

    /// Whether this build can actually emit to journald.
    pub const fn journald_available() -> bool {
        cfg!(all(target_os = "linux", feature = "journald"))
    }
}

impl FromStr for LogFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "journald" if Self::journald_available() => Ok(LogFormat::Journald),
            "journald" => Err(LoggerError::JournaldUnavailable),
            _ => Err(LoggerError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(" JSON ".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
    }

    #[test]
    fn rejects_unknown_format() {
        let err = "yaml".parse::<LogFormat>().unwrap_err();
        assert!(matches!(err, LoggerError::UnknownFormat(s) if s == "yaml"));
    }

    #[test]
    fn journald_follows_build() {
        let parsed = "journald".parse::<LogFormat>();
        if LogFormat::journald_available() {
            assert_eq!(parsed.unwrap(), LogFormat::Journald);
        } else {
            assert!(matches!(parsed, Err(LoggerError::JournaldUnavailable)));
        }
    }
}
