//! Timestamp rendering for human-readable sinks

use chrono::{DateTime, Local, Utc};
use std::fmt::{self, Write};

/// How a human-readable sink renders the record time
///
/// # Examples
///
/// ```
/// use rust_logger_facade::core::TimestampFormat;
///
/// let format = TimestampFormat::from_option("SYS:standard");
/// assert_eq!(format, TimestampFormat::SysStandard);
///
/// let format = TimestampFormat::from_option("false");
/// assert_eq!(format, TimestampFormat::EpochMillis);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TimestampFormat {
    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// Local time: `2025-01-08 12:30:45.123 +0200`
    SysStandard,

    /// UTC: `2025-01-08 10:30:45.123 +0000`
    UtcStandard,

    /// Raw epoch milliseconds
    EpochMillis,

    /// strftime pattern rendered in local time
    SysCustom(String),

    /// strftime pattern rendered in UTC
    UtcCustom(String),
}

const STANDARD: &str = "%Y-%m-%d %H:%M:%S%.3f %z";

impl TimestampFormat {
    /// Interpret a `translatetime` sink option
    pub fn from_option(value: &str) -> Self {
        match value.trim() {
            "false" => TimestampFormat::EpochMillis,
            "true" | "UTC:standard" => TimestampFormat::UtcStandard,
            "SYS:standard" => TimestampFormat::SysStandard,
            other => {
                if let Some(pattern) = other.strip_prefix("SYS:") {
                    TimestampFormat::SysCustom(pattern.to_string())
                } else if let Some(pattern) = other.strip_prefix("UTC:") {
                    TimestampFormat::UtcCustom(pattern.to_string())
                } else {
                    TimestampFormat::UtcCustom(other.to_string())
                }
            }
        }
    }

    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::SysStandard => {
                datetime.with_timezone(&Local).format(STANDARD).to_string()
            }
            TimestampFormat::UtcStandard => datetime.format(STANDARD).to_string(),
            TimestampFormat::EpochMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::SysCustom(pattern) => {
                render_custom(datetime.with_timezone(&Local).format(pattern))
                    .unwrap_or_else(|| TimestampFormat::Iso8601.format(datetime))
            }
            TimestampFormat::UtcCustom(pattern) => render_custom(datetime.format(pattern))
                .unwrap_or_else(|| TimestampFormat::Iso8601.format(datetime)),
        }
    }
}

/// Invalid strftime items make `Display` fail instead of producing text
fn render_custom(items: impl fmt::Display) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", items).ok()?;
    Some(out)
}

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_datetime() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::milliseconds(123)
    }

    #[test]
    fn test_iso8601_format() {
        assert_eq!(
            TimestampFormat::Iso8601.format(&fixed_datetime()),
            "2025-01-08T10:30:45.123Z"
        );
    }

    #[test]
    fn test_utc_standard_format() {
        assert_eq!(
            TimestampFormat::UtcStandard.format(&fixed_datetime()),
            "2025-01-08 10:30:45.123 +0000"
        );
    }

    #[test]
    fn test_epoch_millis() {
        let rendered = TimestampFormat::EpochMillis.format(&fixed_datetime());
        assert_eq!(rendered, fixed_datetime().timestamp_millis().to_string());
    }

    #[test]
    fn test_option_parsing() {
        assert_eq!(TimestampFormat::from_option("true"), TimestampFormat::UtcStandard);
        assert_eq!(
            TimestampFormat::from_option("UTC:%H:%M"),
            TimestampFormat::UtcCustom("%H:%M".to_string())
        );
        assert_eq!(
            TimestampFormat::from_option("SYS:%d/%m"),
            TimestampFormat::SysCustom("%d/%m".to_string())
        );
        assert_eq!(
            TimestampFormat::from_option("UTC:%H:%M").format(&fixed_datetime()),
            "10:30"
        );
    }

    #[test]
    fn test_invalid_pattern_falls_back_to_iso() {
        assert_eq!(
            TimestampFormat::UtcCustom("%Q".to_string()).format(&fixed_datetime()),
            "2025-01-08T10:30:45.123Z"
        );
    }

    #[test]
    fn test_fixed_clock() {
        assert_eq!(FixedClock(fixed_datetime()).now(), fixed_datetime());
    }
}
