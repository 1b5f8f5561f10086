//! Log level definitions

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log record.
///
/// Levels are totally ordered by their numeric [`rank`](LogLevel::rank).
/// Records carry the rank, not the name, so the ordering survives
/// serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    /// Numeric rank used for every comparison.
    #[inline]
    pub const fn rank(&self) -> u8 {
        match self {
            LogLevel::Trace => 10,
            LogLevel::Debug => 20,
            LogLevel::Info => 30,
            LogLevel::Warn => 40,
            LogLevel::Error => 50,
            LogLevel::Fatal => 60,
        }
    }

    pub fn from_rank(rank: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|level| level.rank() == rank)
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Lower-case name, as used in configuration values
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }

    /// The least restrictive of two levels
    #[must_use]
    pub fn min_rank(self, other: LogLevel) -> LogLevel {
        if other.rank() < self.rank() {
            other
        } else {
            self
        }
    }

    /// The most restrictive of two levels
    #[must_use]
    pub fn max_rank(self, other: LogLevel) -> LogLevel {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Trace => BrightBlack,
            LogLevel::Debug => Blue,
            LogLevel::Info => Green,
            LogLevel::Warn => Yellow,
            LogLevel::Error => Red,
            LogLevel::Fatal => BrightRed,
        }
    }
}

impl PartialOrd for LogLevel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogLevel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(LoggerError::invalid_level(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_are_ordered() {
        let ranks: Vec<u8> = LogLevel::ALL.iter().map(LogLevel::rank).collect();
        assert_eq!(ranks, vec![10, 20, 30, 40, 50, 60]);
        assert!(LogLevel::Trace < LogLevel::Fatal);
        assert!(LogLevel::Warn > LogLevel::Info);
    }

    #[test]
    fn test_min_and_max_rank() {
        assert_eq!(LogLevel::Warn.min_rank(LogLevel::Debug), LogLevel::Debug);
        assert_eq!(LogLevel::Warn.max_rank(LogLevel::Debug), LogLevel::Warn);
    }

    #[test]
    fn test_parse() {
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!(" Debug ".parse::<LogLevel>().unwrap(), LogLevel::Debug);

        let err = "verbose".parse::<LogLevel>().unwrap_err();
        assert_eq!(err.code(), "LOG_INVALID_LEVEL");
        assert_eq!(err.to_string(), "Invalid log level provided: verbose");
    }

    #[test]
    fn test_from_rank() {
        assert_eq!(LogLevel::from_rank(40), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_rank(35), None);
    }
}
