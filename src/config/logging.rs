//! Logging configuration

use serde::{Deserialize, Serialize};
use std::fmt;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Log severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Level implied by the number of `-v` flags
    pub fn from_verbosity(verbose: u8) -> Self {
        match verbose {
            0 => Self::Info,
            1 => Self::Debug,
            _ => Self::Trace,
        }
    }

    pub fn to_tracing(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log format
    #[serde(default)]
    pub format: LogFormat,
    /// Log level
    #[serde(default)]
    pub level: LogLevel,
}

impl LoggingConfig {
    /// Configured level, raised by any `-v` flags on the command line
    pub fn effective_level(&self, verbose: u8) -> LogLevel {
        if verbose == 0 {
            self.level
        } else {
            self.level.max(LogLevel::from_verbosity(verbose))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_verbosity_raises_configured_level() {
        let cfg = LoggingConfig::default();
        assert_eq!(cfg.effective_level(0), LogLevel::Info);
        assert_eq!(cfg.effective_level(1), LogLevel::Debug);
        assert_eq!(cfg.effective_level(5), LogLevel::Trace);
    }

    #[test]
    fn quiet_configured_level_applies_without_flags() {
        let cfg = LoggingConfig {
            format: LogFormat::Text,
            level: LogLevel::Warn,
        };
        assert_eq!(cfg.effective_level(0), LogLevel::Warn);
        assert_eq!(cfg.effective_level(1), LogLevel::Debug);
    }

    #[test]
    fn configured_level_is_kept_when_more_verbose() {
        let cfg = LoggingConfig {
            format: LogFormat::Json,
            level: LogLevel::Trace,
        };
        assert_eq!(cfg.effective_level(0), LogLevel::Trace);
    }
}
