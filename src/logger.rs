//! Logger facade
//!
//! A [`Logger`] is a cheap handle over a cached [`Engine`]. Every leveled call
//! first checks the namespace against the debug spec and the handle's level,
//! and only then sanitizes its arguments and hands a record to the engine.

use crate::cache::EngineCache;
use crate::core::{
    Appender, Engine, EngineConfig, LogArgs, LogLevel, LogRecord, LogValue, Record, ResolvedSink,
    Result, SinkStream,
};
use crate::filter::DebugSpec;
use crate::sanitize::{prepare, prepare_call, SanitizeOptions};
use crate::transports::SimpleFactory;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;

pub struct Logger {
    namespace: Option<String>,
    engine: Arc<Engine>,
    debug: DebugSpec,
    /// `namespace` first, then child bindings
    bindings: Arc<Record>,
    level: RwLock<LogLevel>,
    sanitize: Arc<SanitizeOptions>,
}

impl Logger {
    /// Wrap `engine`; the handle starts at the engine's global level
    pub fn new(
        namespace: Option<&str>,
        engine: Arc<Engine>,
        debug: DebugSpec,
        sanitize: SanitizeOptions,
    ) -> Self {
        let namespace = namespace.filter(|ns| !ns.is_empty()).map(str::to_string);
        let mut bindings = Record::new();
        if let Some(ref ns) = namespace {
            bindings.insert("namespace".to_string(), Value::String(ns.clone()));
        }
        let level = engine.level();

        Self {
            namespace,
            engine,
            debug,
            bindings: Arc::new(bindings),
            level: RwLock::new(level),
            sanitize: Arc::new(sanitize),
        }
    }

    /// Create a builder for Logger
    ///
    /// # Example
    ///
    /// ```
    /// use rust_logger_facade::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .namespace("app:http")
    ///     .level(LogLevel::Warn)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert!(!logger.is_level_enabled(LogLevel::Info));
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn log(&self, level: LogLevel, args: impl Into<LogArgs>) {
        if !self.debug.is_enabled(self.namespace.as_deref()) {
            return;
        }
        let threshold = self.level();
        if level < threshold.max_rank(self.engine.sink_floor()) {
            return;
        }
        let Some(call) = prepare_call(args.into(), &self.sanitize) else {
            return;
        };

        let record = LogRecord::new(level, call.msg)
            .with_bindings(Arc::clone(&self.bindings))
            .with_fields(call.fields);
        self.engine.write_at(record, threshold);
    }

    #[inline]
    pub fn trace(&self, args: impl Into<LogArgs>) {
        self.log(LogLevel::Trace, args);
    }

    #[inline]
    pub fn debug(&self, args: impl Into<LogArgs>) {
        self.log(LogLevel::Debug, args);
    }

    #[inline]
    pub fn info(&self, args: impl Into<LogArgs>) {
        self.log(LogLevel::Info, args);
    }

    #[inline]
    pub fn warn(&self, args: impl Into<LogArgs>) {
        self.log(LogLevel::Warn, args);
    }

    #[inline]
    pub fn error(&self, args: impl Into<LogArgs>) {
        self.log(LogLevel::Error, args);
    }

    #[inline]
    pub fn fatal(&self, args: impl Into<LogArgs>) {
        self.log(LogLevel::Fatal, args);
    }

    /// New handle with `bindings` merged over this handle's bindings.
    ///
    /// Only objects and maps contribute bindings. The namespace, debug spec,
    /// engine and current level carry over; a `namespace` key in `bindings`
    /// is ignored.
    #[must_use]
    pub fn child(&self, bindings: impl Into<LogValue>) -> Logger {
        let mut merged = (*self.bindings).clone();
        if let LogValue::Object(entries) = prepare(&bindings.into(), &self.sanitize) {
            for (key, value) in entries {
                if key == "namespace" && self.namespace.is_some() {
                    continue;
                }
                merged.insert(key, value.to_json_value());
            }
        }

        Logger {
            namespace: self.namespace.clone(),
            engine: Arc::clone(&self.engine),
            debug: self.debug.clone(),
            bindings: Arc::new(merged),
            level: RwLock::new(self.level()),
            sanitize: Arc::clone(&self.sanitize),
        }
    }

    /// Fields bound to every record of this handle, `namespace` included
    pub fn bindings(&self) -> Record {
        (*self.bindings).clone()
    }

    /// True when the namespace is enabled, `level` meets this handle's
    /// threshold and at least one sink accepts it
    pub fn is_level_enabled(&self, level: LogLevel) -> bool {
        self.debug.is_enabled(self.namespace.as_deref())
            && level >= self.level().max_rank(self.engine.sink_floor())
    }

    pub fn level(&self) -> LogLevel {
        *self.level.read()
    }

    /// Change this handle's threshold. It replaces the engine's global level
    /// for this handle, in both directions; sinks still apply their own levels.
    pub fn set_level(&self, level: LogLevel) {
        *self.level.write() = level;
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn debug_spec(&self) -> &DebugSpec {
        &self.debug
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Write out everything queued so far
    pub fn flush(&self) -> Result<()> {
        self.engine.flush()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// Without any sink the logger writes through the simple console sink at
/// `info`.
///
/// # Example
/// ```
/// use rust_logger_facade::prelude::*;
/// use rust_logger_facade::appenders::SimpleAppender;
///
/// let logger = Logger::builder()
///     .namespace("worker")
///     .appender(SimpleAppender::new(), LogLevel::Debug)
///     .debug("worker,-worker:noisy")
///     .build()
///     .unwrap();
///
/// assert_eq!(logger.level(), LogLevel::Debug);
/// ```
pub struct LoggerBuilder {
    namespace: Option<String>,
    sinks: Vec<ResolvedSink>,
    level: Option<LogLevel>,
    debug: Option<DebugSpec>,
    sanitize: SanitizeOptions,
    cache: Option<Arc<EngineCache>>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            namespace: None,
            sinks: Vec::new(),
            level: None,
            debug: None,
            sanitize: SanitizeOptions::default(),
            cache: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Add an already resolved sink
    #[must_use = "builder methods return a new value"]
    pub fn sink(mut self, sink: ResolvedSink) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Add an appender as a stream sink at `level`
    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(self, appender: A, level: LogLevel) -> Self {
        self.sink(ResolvedSink::stream(SinkStream::new(appender), level))
    }

    /// Global level floor; raises the level derived from the sinks
    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// Debug spec string, parsed into a new handle
    #[must_use = "builder methods return a new value"]
    pub fn debug(mut self, spec: &str) -> Self {
        self.debug = Some(DebugSpec::new(Some(spec)));
        self
    }

    /// Share an existing debug spec handle
    #[must_use = "builder methods return a new value"]
    pub fn debug_spec(mut self, spec: DebugSpec) -> Self {
        self.debug = Some(spec);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sanitize(mut self, options: SanitizeOptions) -> Self {
        self.sanitize = options;
        self
    }

    /// Engine cache to use instead of the process-wide one
    #[must_use = "builder methods return a new value"]
    pub fn cache(mut self, cache: Arc<EngineCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build the Logger
    ///
    /// Fails with `TransportInit` when the engine cannot be constructed.
    pub fn build(self) -> Result<Logger> {
        let mut sinks = self.sinks;
        if sinks.is_empty() {
            sinks.push(SimpleFactory::sink(LogLevel::Info));
        }

        let config = EngineConfig::from_sinks(sinks).with_level_floor(self.level);
        let cache = self.cache.unwrap_or_else(EngineCache::global);
        let engine = cache.get_or_create(&config)?;

        Ok(Logger::new(
            self.namespace.as_deref(),
            engine,
            self.debug.unwrap_or_default(),
            self.sanitize,
        ))
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
