//! Environment-driven configuration
//!
//! [`EnvSource`] is the only place process environment is read. Everything
//! downstream consumes the immutable [`LoggerOptions`] that [`load_config`]
//! produces from it.
//!
//! # Example
//!
//! ```
//! use rust_logger_facade::config::{load_config, EnvSource};
//! use rust_logger_facade::transports::TransportKind;
//! use rust_logger_facade::LogLevel;
//!
//! let env = EnvSource::from([
//!     ("TRANSPORT1", "pretty"),
//!     ("TRANSPORT1_LEVEL", "debug"),
//!     ("TRANSPORT1_COLORIZE", "false"),
//! ]);
//! let options = load_config(&env).unwrap();
//!
//! assert_eq!(options.transports[0].kind, TransportKind::Pretty);
//! assert_eq!(options.transports[0].level, LogLevel::Debug);
//! assert_eq!(options.transports[0].options["colorize"], false);
//! ```

pub mod template;

pub use template::render_filename;

use crate::core::{LogLevel, Record, Result};
use crate::sanitize::{SanitizeOptions, DEFAULT_MAX_DEPTH, DEFAULT_TRUNCATION_MARKER};
use crate::transports::{TransportDescriptor, TransportKind};
use serde_json::Value;
use std::collections::BTreeMap;

pub const DEFAULT_APP_NAME: &str = "app";
pub const DEFAULT_APP_VERSION: &str = "0.0.0";
pub const DEFAULT_HOSTNAME: &str = "localhost";
pub const DEFAULT_LOG_FOLDER: &str = "logs";

/// Snapshot of environment variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSource {
    vars: BTreeMap<String, String>,
}

impl EnvSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment
    pub fn from_process() -> Self {
        std::env::vars().collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Variables whose name starts with `prefix`
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.vars
            .range(prefix.to_string()..)
            .take_while(move |(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// True when `key` is set to `true` or `*`
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some("true") | Some("*"))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for EnvSource {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Application identity used in filename templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
}

impl Default for AppInfo {
    fn default() -> Self {
        Self {
            name: DEFAULT_APP_NAME.to_string(),
            version: DEFAULT_APP_VERSION.to_string(),
        }
    }
}

impl AppInfo {
    /// `APP_NAME` and `APP_VERSION`
    pub fn from_env(env: &EnvSource) -> Self {
        let defaults = Self::default();
        Self {
            name: non_empty(env, "APP_NAME").unwrap_or(defaults.name),
            version: non_empty(env, "APP_VERSION").unwrap_or(defaults.version),
        }
    }
}

/// Fields stamped on every record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseFields {
    pub pid: u32,
    pub hostname: String,
}

impl Default for BaseFields {
    fn default() -> Self {
        Self {
            pid: std::process::id(),
            hostname: DEFAULT_HOSTNAME.to_string(),
        }
    }
}

impl BaseFields {
    /// Current process id and `HOSTNAME`
    pub fn from_env(env: &EnvSource) -> Self {
        Self {
            hostname: non_empty(env, "HOSTNAME").unwrap_or_else(|| DEFAULT_HOSTNAME.to_string()),
            ..Self::default()
        }
    }

    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("pid".to_string(), Value::from(self.pid));
        record.insert("hostname".to_string(), Value::String(self.hostname.clone()));
        record
    }
}

/// Everything the facade needs, loaded once
#[derive(Debug, Clone, PartialEq)]
pub struct LoggerOptions {
    /// Explicit `LOG_LEVEL`; raises the engine's global level when stricter
    pub level: Option<LogLevel>,
    /// Namespace debug spec (`DEBUG`)
    pub debug: Option<String>,
    pub transports: Vec<TransportDescriptor>,
    pub sanitize: SanitizeOptions,
    /// Internal tracing (`DEBUG_LOGGER`)
    pub debug_logger: bool,
    pub app: AppInfo,
    pub base: BaseFields,
}

/// Build [`LoggerOptions`] from an environment snapshot.
///
/// Fails with `InvalidLevel` when `LOG_LEVEL` or a `TRANSPORT<N>_LEVEL` is not
/// a known level name.
pub fn load_config(env: &EnvSource) -> Result<LoggerOptions> {
    let level = non_empty(env, "LOG_LEVEL")
        .map(|s| s.parse::<LogLevel>())
        .transpose()?;

    let mut transports = load_transports(env)?;
    if !transports.iter().any(|t| t.enabled) {
        transports.extend(legacy_transports(env, level.unwrap_or_default()));
    }

    Ok(LoggerOptions {
        level,
        debug: env.get("DEBUG").map(str::to_string),
        transports,
        sanitize: load_sanitize(env),
        debug_logger: env.flag("DEBUG_LOGGER"),
        app: AppInfo::from_env(env),
        base: BaseFields::from_env(env),
    })
}

/// `TRANSPORT<N>` blocks, from 1 up to the first missing index
fn load_transports(env: &EnvSource) -> Result<Vec<TransportDescriptor>> {
    let mut transports = Vec::new();

    for index in 1.. {
        let Some(tag) = non_empty(env, &format!("TRANSPORT{}", index)) else {
            break;
        };
        let prefix = format!("TRANSPORT{}_", index);

        let level = non_empty(env, &format!("{}LEVEL", prefix))
            .map(|s| s.parse::<LogLevel>())
            .transpose()?
            .unwrap_or_default();
        let enabled = env.get(&format!("{}ENABLED", prefix)) != Some("false");

        let mut descriptor =
            TransportDescriptor::new(TransportKind::parse(&tag), level).enabled(enabled);
        for (key, value) in env.with_prefix(&prefix) {
            let name = key[prefix.len()..].to_lowercase();
            if name == "level" || name == "enabled" {
                continue;
            }
            descriptor.options.insert(name, coerce(value));
        }
        transports.push(descriptor);
    }

    Ok(transports)
}

/// `LOG_CONSOLE_OUTPUT`, `LOG_FILE_OUTPUT` and `LOG_FOLDER`
fn legacy_transports(env: &EnvSource, level: LogLevel) -> Vec<TransportDescriptor> {
    let mut transports = Vec::new();
    if env.get("LOG_CONSOLE_OUTPUT") != Some("false") {
        transports.push(TransportDescriptor::new(TransportKind::Console, level));
    }
    if env.get("LOG_FILE_OUTPUT") == Some("true") {
        let folder = non_empty(env, "LOG_FOLDER").unwrap_or_else(|| DEFAULT_LOG_FOLDER.to_string());
        transports.push(TransportDescriptor::new(TransportKind::File, level).with_option("folder", folder));
    }
    transports
}

fn load_sanitize(env: &EnvSource) -> SanitizeOptions {
    let max_depth = env
        .get("LOG_MAX_DEPTH")
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_MAX_DEPTH);
    // Zero and negative lengths both disable truncation
    let max_string_length = env
        .get("LOG_MAX_STRING_LENGTH")
        .and_then(|s| s.trim().parse::<i64>().ok())
        .map(|n| usize::try_from(n).unwrap_or(0))
        .unwrap_or(0);
    let marker = env
        .get("LOG_TRUNCATION_MARKER")
        .unwrap_or(DEFAULT_TRUNCATION_MARKER);

    SanitizeOptions::default()
        .with_max_depth(max_depth)
        .with_max_string_length(max_string_length)
        .with_truncation_marker(marker)
}

/// `true`/`false` become booleans and digit strings integers
fn coerce(value: &str) -> Value {
    match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        digits if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => digits
            .parse::<u64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(digits.to_string())),
        other => Value::String(other.to_string()),
    }
}

fn non_empty(env: &EnvSource, key: &str) -> Option<String> {
    env.get(key)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
