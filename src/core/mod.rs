//! Core logger types and traits

pub mod appender;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod log_level;
pub mod log_record;
pub mod metrics;
pub mod sink;
pub mod timestamp;
pub mod value;

pub use appender::Appender;
pub use diagnostics::{CollectingDiagnostics, Diagnostics, StderrDiagnostics};
pub use engine::{Engine, TargetOpener, DEFAULT_SHUTDOWN_TIMEOUT, FAN_OUT_QUEUE_SIZE};
pub use error::{Cause, LoggerError, Result};
pub use log_level::LogLevel;
pub use log_record::LogRecord;
pub use metrics::EngineMetrics;
pub use sink::{EngineConfig, EngineKey, ResolvedSink, SharedAppender, SinkKey, SinkStream};
pub use timestamp::{Clock, FixedClock, SystemClock, TimestampFormat};
pub use value::{ErrorInfo, LogArgs, LogValue, Record};
