//! # Rust Logger Facade
//!
//! Structured JSON logging behind namespaced logger handles.
//!
//! ## Features
//!
//! - **Namespace Filtering**: `DEBUG`-style glob specs with negations, switchable at runtime
//! - **Safe Payloads**: depth-limited maps and truncated strings before anything is serialized
//! - **Multiple Sinks**: pretty, simple and file transports, each with its own level
//! - **Shared Engines**: identical sink configurations reuse one engine per process
//! - **Rotation**: size-based archive rotation with optional gzip and pruning
//!
//! ## Example
//!
//! ```
//! use rust_logger_facade::prelude::*;
//! use serde_json::json;
//!
//! let log = Logger::builder().namespace("app:http").build()?;
//! log.info((json!({"status": 200}), "GET %s", "/health"));
//!
//! let request = log.child(json!({"request_id": "r-42"}));
//! request.warn("slow response");
//! # Ok::<(), rust_logger_facade::LoggerError>(())
//! ```

pub mod appenders;
pub mod cache;
pub mod config;
pub mod core;
pub mod env;
pub mod filter;
pub mod logger;
pub mod macros;
pub mod resolver;
pub mod rotate;
pub mod sanitize;
pub mod transports;

pub mod prelude {
    pub use crate::config::{load_config, EnvSource, LoggerOptions};
    pub use crate::core::{
        Appender, ErrorInfo, LogArgs, LogLevel, LogRecord, LogValue, LoggerError, Result,
    };
    pub use crate::env::{create_logger, create_logger_with, EnvContext};
    pub use crate::filter::{is_namespace_enabled, DebugSpec};
    pub use crate::logger::{Logger, LoggerBuilder};
    pub use crate::sanitize::SanitizeOptions;
    pub use crate::transports::{TransportDescriptor, TransportKind};
}

pub use cache::EngineCache;
pub use config::{load_config, EnvSource, LoggerOptions};
pub use core::{
    Appender, Engine, EngineConfig, EngineMetrics, ErrorInfo, LogArgs, LogLevel, LogRecord,
    LogValue, LoggerError, ResolvedSink, Result, SinkStream, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use env::{create_logger, create_logger_with, EnvContext};
pub use filter::{is_namespace_enabled, DebugSpec, NamespaceFilter, Pattern};
pub use logger::{Logger, LoggerBuilder};
pub use resolver::TransportResolver;
pub use rotate::{RotationConfig, RotationManager};
pub use sanitize::{prepare, SanitizeOptions};
pub use transports::{SinkFactory, TransportDescriptor, TransportKind, TransportRegistry};
