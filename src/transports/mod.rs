//! Transport descriptors and sink factories
//!
//! A [`TransportDescriptor`] is the declarative form of a sink, as produced by
//! configuration loading. A [`SinkFactory`] turns one into a [`ResolvedSink`].
//! The [`TransportRegistry`] maps each [`TransportKind`] to its factory.

pub mod file;
pub mod pretty;
pub mod simple;

pub use file::FileFactory;
pub use pretty::PrettyFactory;
pub use simple::SimpleFactory;

use crate::config::{AppInfo, BaseFields};
use crate::core::{LogLevel, LoggerError, Record, ResolvedSink, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Kind of a transport
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransportKind {
    /// Legacy name for `Pretty`
    Console,
    Pretty,
    File,
    /// Dependency-free console output (`simple` or `console-simple`)
    Simple,
    /// Anything else; resolution fails for it
    Other(String),
}

impl TransportKind {
    /// Parse a type tag, case-insensitively
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "console" => TransportKind::Console,
            "pretty" => TransportKind::Pretty,
            "file" => TransportKind::File,
            "simple" | "console-simple" => TransportKind::Simple,
            other => TransportKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TransportKind::Console => "console",
            TransportKind::Pretty => "pretty",
            TransportKind::File => "file",
            TransportKind::Simple => "simple",
            TransportKind::Other(tag) => tag,
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative description of one sink
#[derive(Debug, Clone, PartialEq)]
pub struct TransportDescriptor {
    pub kind: TransportKind,
    pub level: LogLevel,
    pub enabled: bool,
    /// Kind-specific options, keys lower-cased
    pub options: Record,
}

impl TransportDescriptor {
    pub fn new(kind: TransportKind, level: LogLevel) -> Self {
        Self {
            kind,
            level,
            enabled: true,
            options: Record::new(),
        }
    }

    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Creates a sink from a descriptor.
///
/// Failures are reported as typed errors and never abort the process; the
/// resolver drops the sink and carries on.
#[async_trait]
pub trait SinkFactory: Send + Sync {
    async fn create(&self, descriptor: &TransportDescriptor) -> Result<ResolvedSink>;
}

/// Static mapping from transport kind to factory
#[derive(Clone)]
pub struct TransportRegistry {
    pretty: Arc<dyn SinkFactory>,
    file: Arc<dyn SinkFactory>,
    simple: Arc<dyn SinkFactory>,
}

impl TransportRegistry {
    pub fn new(
        pretty: Arc<dyn SinkFactory>,
        file: Arc<dyn SinkFactory>,
        simple: Arc<dyn SinkFactory>,
    ) -> Self {
        Self {
            pretty,
            file,
            simple,
        }
    }

    /// Registry with the built-in factories
    pub fn with_defaults(app: AppInfo, base: BaseFields) -> Self {
        Self::new(
            Arc::new(PrettyFactory),
            Arc::new(FileFactory::new(app, base)),
            Arc::new(SimpleFactory),
        )
    }

    #[must_use]
    pub fn with_pretty(mut self, factory: Arc<dyn SinkFactory>) -> Self {
        self.pretty = factory;
        self
    }

    #[must_use]
    pub fn with_file(mut self, factory: Arc<dyn SinkFactory>) -> Self {
        self.file = factory;
        self
    }

    #[must_use]
    pub fn with_simple(mut self, factory: Arc<dyn SinkFactory>) -> Self {
        self.simple = factory;
        self
    }

    pub fn factory_for(&self, kind: &TransportKind) -> Result<&Arc<dyn SinkFactory>> {
        match kind {
            TransportKind::Console | TransportKind::Pretty => Ok(&self.pretty),
            TransportKind::File => Ok(&self.file),
            TransportKind::Simple => Ok(&self.simple),
            TransportKind::Other(tag) => Err(LoggerError::transport_init(
                format!("Unknown transport type: \"{}\"", tag),
                None,
            )),
        }
    }

    pub async fn create(&self, descriptor: &TransportDescriptor) -> Result<ResolvedSink> {
        self.factory_for(&descriptor.kind)?.create(descriptor).await
    }

    /// Sink used when nothing else resolves; never fails
    pub fn fallback(&self) -> ResolvedSink {
        SimpleFactory::sink(LogLevel::Info)
    }
}
