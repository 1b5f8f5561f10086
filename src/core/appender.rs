//! Appender trait for log output destinations

use super::{error::Result, log_record::LogRecord};

/// A writable sink handle.
///
/// Appenders receive fully built records; level filtering has already been
/// applied by the engine.
pub trait Appender: Send + Sync {
    fn append(&mut self, record: &LogRecord) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
