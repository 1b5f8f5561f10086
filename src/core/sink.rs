//! Resolved sinks and the engine configuration built from them
//!
//! A sink factory produces either a ready stream (`ResolvedSink::Stream`) or a
//! target description the engine opens itself (`ResolvedSink::Target`). An
//! ordered list of sinks plus the global level forms an [`EngineConfig`],
//! whose [`EngineKey`] is the structural cache key.

use super::appender::Appender;
use super::log_level::LogLevel;
use super::value::Record;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Appender shared between a sink handle and the engine that writes to it
pub type SharedAppender = Arc<Mutex<Box<dyn Appender>>>;

static NEXT_STREAM_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum StreamIdentity {
    /// Structural key derived from the factory options
    Keyed(String),
    /// Identity of a caller-supplied stream
    Unique(u64),
}

/// A writable stream handle
///
/// Two handles are equal when they were built from the same configuration
/// key, or when one is a clone of the other.
#[derive(Clone)]
pub struct SinkStream {
    identity: StreamIdentity,
    appender: SharedAppender,
}

impl SinkStream {
    /// Wrap a caller-supplied appender. Only clones of this handle compare equal.
    pub fn new<A: Appender + 'static>(appender: A) -> Self {
        Self {
            identity: StreamIdentity::Unique(NEXT_STREAM_ID.fetch_add(1, Ordering::Relaxed)),
            appender: Arc::new(Mutex::new(Box::new(appender))),
        }
    }

    /// Wrap an appender built from a configuration that `key` fully describes
    pub fn keyed<A: Appender + 'static>(key: impl Into<String>, appender: A) -> Self {
        Self {
            identity: StreamIdentity::Keyed(key.into()),
            appender: Arc::new(Mutex::new(Box::new(appender))),
        }
    }

    pub fn appender(&self) -> &SharedAppender {
        &self.appender
    }

    pub fn name(&self) -> String {
        self.appender.lock().name().to_string()
    }

    fn key(&self) -> String {
        match &self.identity {
            StreamIdentity::Keyed(key) => key.clone(),
            StreamIdentity::Unique(id) => format!("#{}", id),
        }
    }
}

impl PartialEq for SinkStream {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl fmt::Debug for SinkStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkStream").field("key", &self.key()).finish()
    }
}

/// Output of a sink factory
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedSink {
    /// A stream the engine writes to directly
    Stream { stream: SinkStream, level: LogLevel },
    /// A target the engine opens when it is constructed
    Target {
        target: String,
        options: Record,
        level: LogLevel,
    },
}

impl ResolvedSink {
    pub fn stream(stream: SinkStream, level: LogLevel) -> Self {
        ResolvedSink::Stream { stream, level }
    }

    pub fn target(target: impl Into<String>, options: Record, level: LogLevel) -> Self {
        ResolvedSink::Target {
            target: target.into(),
            options,
            level,
        }
    }

    pub fn level(&self) -> LogLevel {
        match self {
            ResolvedSink::Stream { level, .. } | ResolvedSink::Target { level, .. } => *level,
        }
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, ResolvedSink::Stream { .. })
    }

    /// Appender name of a stream sink
    pub fn stream_name(&self) -> Option<String> {
        match self {
            ResolvedSink::Stream { stream, .. } => Some(stream.name()),
            ResolvedSink::Target { .. } => None,
        }
    }

    /// Structural key of this sink
    pub fn key(&self) -> SinkKey {
        match self {
            ResolvedSink::Stream { stream, level } => SinkKey::Stream {
                stream: stream.key(),
                level: *level,
            },
            ResolvedSink::Target {
                target,
                options,
                level,
            } => {
                let sorted: BTreeMap<&String, &serde_json::Value> = options.iter().collect();
                SinkKey::Target {
                    target: target.clone(),
                    options: serde_json::to_string(&sorted).unwrap_or_default(),
                    level: *level,
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SinkKey {
    Stream {
        stream: String,
        level: LogLevel,
    },
    Target {
        target: String,
        options: String,
        level: LogLevel,
    },
}

/// Cache key of an engine: order-sensitive sink keys plus the global level
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EngineKey {
    pub sinks: Vec<SinkKey>,
    pub global_level: LogLevel,
}

/// Everything needed to construct an engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sinks: Vec<ResolvedSink>,
    pub global_level: LogLevel,
}

impl EngineConfig {
    /// Global level is the least restrictive sink level.
    ///
    /// An empty list yields `Info`; the resolver never produces one.
    pub fn from_sinks(sinks: Vec<ResolvedSink>) -> Self {
        let global_level = sinks
            .iter()
            .map(ResolvedSink::level)
            .reduce(LogLevel::min_rank)
            .unwrap_or_default();
        Self {
            sinks,
            global_level,
        }
    }

    /// Raise the global level to `floor` if it is stricter
    #[must_use]
    pub fn with_level_floor(mut self, floor: Option<LogLevel>) -> Self {
        if let Some(floor) = floor {
            self.global_level = self.global_level.max_rank(floor);
        }
        self
    }

    /// True when the engine can bypass fan-out and write to one stream
    pub fn is_single_stream(&self) -> bool {
        self.sinks.len() == 1 && self.sinks[0].is_stream()
    }

    pub fn key(&self) -> EngineKey {
        EngineKey {
            sinks: self.sinks.iter().map(ResolvedSink::key).collect(),
            global_level: self.global_level,
        }
    }
}
