//! Appender implementations

pub mod file;
pub mod json;
pub mod pretty;
pub mod simple;

pub use file::FileAppender;
pub use json::JsonLinesAppender;
pub use pretty::{PrettyAppender, PrettyOptions};
pub use simple::SimpleAppender;

pub use crate::core::Appender;

use crate::core::{LogLevel, LoggerError, Record, Result};
use parking_lot::Mutex;
use serde_json::Value;
use std::io::{self, Write};
use std::sync::Arc;

/// Target name of the file sink
pub const FILE_TARGET: &str = "file";

/// Open a target-based sink.
///
/// `file` writes JSON lines to `destination`, which is either a path or the
/// file descriptor 1 (stdout) or 2 (stderr).
pub fn open_target(target: &str, options: &Record) -> Result<Box<dyn Appender>> {
    match target {
        FILE_TARGET => {
            let append = option_bool(options, "append").unwrap_or(true);
            let mkdir = option_bool(options, "mkdir").unwrap_or(true);
            match options.get("destination") {
                Some(Value::Number(fd)) if fd.as_i64() == Some(1) => {
                    Ok(Box::new(JsonLinesAppender::stdout()))
                }
                Some(Value::Number(fd)) if fd.as_i64() == Some(2) => {
                    Ok(Box::new(JsonLinesAppender::stderr()))
                }
                Some(Value::String(path)) => Ok(Box::new(FileAppender::open(path, append, mkdir)?)),
                other => Err(LoggerError::transport_init(
                    format!("invalid file destination: {:?}", other),
                    None,
                )),
            }
        }
        other => Err(LoggerError::transport_init(
            format!("Unknown target: {}", other),
            None,
        )),
    }
}

/// Console output handle; `Buffer` captures output in memory
#[derive(Clone)]
pub enum ConsoleWriter {
    Stdout,
    Stderr,
    Buffer(Arc<Mutex<Vec<u8>>>),
}

impl ConsoleWriter {
    /// 2 selects stderr, anything else stdout
    pub fn for_destination(fd: i64) -> Self {
        if fd == 2 {
            ConsoleWriter::Stderr
        } else {
            ConsoleWriter::Stdout
        }
    }

    pub fn buffer() -> Self {
        ConsoleWriter::Buffer(Arc::new(Mutex::new(Vec::new())))
    }

    /// Captured output; empty for the standard streams
    pub fn contents(&self) -> String {
        match self {
            ConsoleWriter::Buffer(buf) => String::from_utf8_lossy(&buf.lock()).to_string(),
            _ => String::new(),
        }
    }
}

impl Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        match self {
            ConsoleWriter::Stdout => io::stdout().write(bytes),
            ConsoleWriter::Stderr => io::stderr().write(bytes),
            ConsoleWriter::Buffer(buf) => {
                buf.lock().extend_from_slice(bytes);
                Ok(bytes.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            ConsoleWriter::Stdout => io::stdout().flush(),
            ConsoleWriter::Stderr => io::stderr().flush(),
            ConsoleWriter::Buffer(_) => Ok(()),
        }
    }
}

#[cfg(feature = "console")]
pub(crate) fn paint(text: &str, level: LogLevel, colorize: bool) -> String {
    use colored::Colorize;
    if colorize {
        text.color(level.color_code()).to_string()
    } else {
        text.to_string()
    }
}

#[cfg(not(feature = "console"))]
pub(crate) fn paint(text: &str, _level: LogLevel, _colorize: bool) -> String {
    text.to_string()
}

pub(crate) fn option_str<'a>(options: &'a Record, key: &str) -> Option<&'a str> {
    options.get(key).and_then(Value::as_str)
}

/// Booleans, also accepting their string spelling
pub(crate) fn option_bool(options: &Record, key: &str) -> Option<bool> {
    match options.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Integers, also accepting their string spelling
pub(crate) fn option_i64(options: &Record, key: &str) -> Option<i64> {
    match options.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record_of(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => Record::new(),
        }
    }

    #[test]
    fn test_open_file_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("app.log");
        let options = record_of(json!({
            "destination": path.to_string_lossy(),
            "mkdir": true,
            "append": true
        }));
        let appender = open_target(FILE_TARGET, &options).unwrap();
        assert_eq!(appender.name(), "file");
        assert!(path.exists());
    }

    #[test]
    fn test_open_fd_target() {
        let options = record_of(json!({"destination": 2}));
        assert_eq!(open_target(FILE_TARGET, &options).unwrap().name(), "stderr");
    }

    #[test]
    fn test_unknown_target() {
        let err = open_target("syslog", &Record::new()).err().unwrap();
        assert_eq!(err.code(), "LOG_TRANSPORT_INIT_FAILED");
    }

    #[test]
    fn test_option_coercion() {
        let options = record_of(json!({"a": "true", "b": false, "c": "42", "d": 7}));
        assert_eq!(option_bool(&options, "a"), Some(true));
        assert_eq!(option_bool(&options, "b"), Some(false));
        assert_eq!(option_i64(&options, "c"), Some(42));
        assert_eq!(option_i64(&options, "d"), Some(7));
        assert_eq!(option_i64(&options, "missing"), None);
    }
}
