//! Call-site values passed to the leveled log methods
//!
//! This module provides:
//! - `LogValue`: a dynamically shaped argument (primitives, sequences,
//!   map-like structures, plain records, errors, opaque values)
//! - `ErrorInfo`: a normalized error value
//! - `LogArgs`: the argument list of one log call

use super::error::LoggerError;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A plain key-value record
pub type Record = Map<String, Value>;

/// Value type accepted by the leveled log methods
#[derive(Debug, Clone, PartialEq)]
pub enum LogValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Ordered sequence
    Array(Vec<LogValue>),
    /// Map-like structure with arbitrary keys, already stringified.
    /// Recursing into a map consumes one unit of the depth budget.
    Map(Vec<(String, LogValue)>),
    /// Plain key-value record
    Object(Vec<(String, LogValue)>),
    /// Error value, normalized by the facade
    Error(ErrorInfo),
    /// Value with its own serialization (the equivalent of a class instance).
    /// Passed through untouched.
    Opaque(Value),
}

impl LogValue {
    /// Build a plain record from key/value pairs
    pub fn object<K, V, I>(fields: I) -> Self
    where
        K: Into<String>,
        V: Into<LogValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        LogValue::Object(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a map-like value from key/value pairs
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: ToString,
        V: Into<LogValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        LogValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect(),
        )
    }

    pub fn is_object(&self) -> bool {
        matches!(self, LogValue::Object(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            LogValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to serde_json::Value for JSON serialization
    #[must_use]
    pub fn to_json_value(&self) -> Value {
        match self {
            LogValue::Null => Value::Null,
            LogValue::Bool(b) => Value::Bool(*b),
            LogValue::Int(i) => Value::Number((*i).into()),
            LogValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            LogValue::String(s) => Value::String(s.clone()),
            LogValue::Array(items) => Value::Array(items.iter().map(Self::to_json_value).collect()),
            LogValue::Map(entries) | LogValue::Object(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json_value()))
                    .collect(),
            ),
            LogValue::Error(info) => info.to_json_value(),
            LogValue::Opaque(value) => value.clone(),
        }
    }
}

impl fmt::Display for LogValue {
    /// Renders the value as it appears inside a formatted message
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogValue::Null => write!(f, "null"),
            LogValue::Bool(b) => write!(f, "{}", b),
            LogValue::Int(i) => write!(f, "{}", i),
            LogValue::Float(fl) => write!(f, "{}", fl),
            LogValue::String(s) => write!(f, "{}", s),
            LogValue::Error(info) => write!(f, "{}: {}", info.type_name, info.message),
            other => write!(f, "{}", other.to_json_value()),
        }
    }
}

impl From<Value> for LogValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => LogValue::Null,
            Value::Bool(b) => LogValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => LogValue::Int(i),
                None => n.as_f64().map(LogValue::Float).unwrap_or(LogValue::Null),
            },
            Value::String(s) => LogValue::String(s),
            Value::Array(items) => LogValue::Array(items.into_iter().map(LogValue::from).collect()),
            Value::Object(fields) => LogValue::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, LogValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<String> for LogValue {
    fn from(s: String) -> Self {
        LogValue::String(s)
    }
}

impl From<&str> for LogValue {
    fn from(s: &str) -> Self {
        LogValue::String(s.to_string())
    }
}

impl From<&String> for LogValue {
    fn from(s: &String) -> Self {
        LogValue::String(s.clone())
    }
}

impl From<i64> for LogValue {
    fn from(i: i64) -> Self {
        LogValue::Int(i)
    }
}

impl From<i32> for LogValue {
    fn from(i: i32) -> Self {
        LogValue::Int(i64::from(i))
    }
}

impl From<u32> for LogValue {
    fn from(i: u32) -> Self {
        LogValue::Int(i64::from(i))
    }
}

impl From<u64> for LogValue {
    fn from(i: u64) -> Self {
        i64::try_from(i)
            .map(LogValue::Int)
            .unwrap_or(LogValue::Float(i as f64))
    }
}

impl From<usize> for LogValue {
    fn from(i: usize) -> Self {
        LogValue::from(i as u64)
    }
}

impl From<f64> for LogValue {
    fn from(f: f64) -> Self {
        LogValue::Float(f)
    }
}

impl From<bool> for LogValue {
    fn from(b: bool) -> Self {
        LogValue::Bool(b)
    }
}

impl From<ErrorInfo> for LogValue {
    fn from(info: ErrorInfo) -> Self {
        LogValue::Error(info)
    }
}

impl<T: Into<LogValue>> From<Option<T>> for LogValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(LogValue::Null)
    }
}

impl<T: Into<LogValue>> From<Vec<T>> for LogValue {
    fn from(items: Vec<T>) -> Self {
        LogValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<K: ToString, V: Into<LogValue>> From<HashMap<K, V>> for LogValue {
    fn from(entries: HashMap<K, V>) -> Self {
        LogValue::map(entries)
    }
}

impl<K: ToString, V: Into<LogValue>> From<BTreeMap<K, V>> for LogValue {
    fn from(entries: BTreeMap<K, V>) -> Self {
        LogValue::map(entries)
    }
}

/// Normalized error value
///
/// Serialized as `{message, stack, type, code?}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub message: String,
    pub stack: Option<String>,
    pub type_name: String,
    pub code: Option<String>,
}

impl ErrorInfo {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
            type_name: type_name.into(),
            code: None,
        }
    }

    /// Capture an error together with its chain of causes.
    ///
    /// The `stack` lists the error followed by each `source()` on its own line.
    pub fn from_error<E: std::error::Error + 'static>(err: &E) -> Self {
        let full = std::any::type_name::<E>();
        let type_name = full.rsplit("::").next().unwrap_or(full);
        let mut info = Self::new(type_name, err.to_string());
        info.stack = Some(Self::render_chain(err));
        info
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    fn render_chain(err: &dyn std::error::Error) -> String {
        let mut out = err.to_string();
        let mut current = err.source();
        while let Some(cause) = current {
            out.push_str("\n    caused by: ");
            out.push_str(&cause.to_string());
            current = cause.source();
        }
        out
    }

    #[must_use]
    pub fn to_json_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("message".to_string(), Value::String(self.message.clone()));
        obj.insert(
            "stack".to_string(),
            self.stack.clone().map(Value::String).unwrap_or(Value::Null),
        );
        obj.insert("type".to_string(), Value::String(self.type_name.clone()));
        if let Some(ref code) = self.code {
            obj.insert("code".to_string(), Value::String(code.clone()));
        }
        Value::Object(obj)
    }
}

impl From<&LoggerError> for ErrorInfo {
    fn from(err: &LoggerError) -> Self {
        let mut info = ErrorInfo::new("LoggerError", err.to_string()).with_code(err.code());
        info.stack = Some(ErrorInfo::render_chain(err));
        info
    }
}

impl From<&std::io::Error> for ErrorInfo {
    fn from(err: &std::io::Error) -> Self {
        ErrorInfo::from_error(err).with_code(format!("{:?}", err.kind()))
    }
}

/// Arguments of one log call, in call order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogArgs(pub Vec<LogValue>);

impl LogArgs {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn arg(mut self, value: impl Into<LogValue>) -> Self {
        self.0.push(value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_inner(self) -> Vec<LogValue> {
        self.0
    }
}

impl From<&str> for LogArgs {
    fn from(s: &str) -> Self {
        LogArgs(vec![LogValue::from(s)])
    }
}

impl From<String> for LogArgs {
    fn from(s: String) -> Self {
        LogArgs(vec![LogValue::String(s)])
    }
}

impl From<LogValue> for LogArgs {
    fn from(value: LogValue) -> Self {
        LogArgs(vec![value])
    }
}

impl From<ErrorInfo> for LogArgs {
    fn from(info: ErrorInfo) -> Self {
        LogArgs(vec![LogValue::Error(info)])
    }
}

impl From<Value> for LogArgs {
    fn from(value: Value) -> Self {
        LogArgs(vec![LogValue::from(value)])
    }
}

impl From<Vec<LogValue>> for LogArgs {
    fn from(values: Vec<LogValue>) -> Self {
        LogArgs(values)
    }
}

impl<A: Into<LogValue>, B: Into<LogValue>> From<(A, B)> for LogArgs {
    fn from((a, b): (A, B)) -> Self {
        LogArgs(vec![a.into(), b.into()])
    }
}

impl<A: Into<LogValue>, B: Into<LogValue>, C: Into<LogValue>> From<(A, B, C)> for LogArgs {
    fn from((a, b, c): (A, B, C)) -> Self {
        LogArgs(vec![a.into(), b.into(), c.into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_conversion_keeps_shape() {
        let value = LogValue::from(json!({"user": {"id": 7, "tags": ["a", "b"]}}));
        assert!(value.is_object());
        assert_eq!(
            value.to_json_value(),
            json!({"user": {"id": 7, "tags": ["a", "b"]}})
        );
    }

    #[test]
    fn test_hash_map_becomes_map_variant() {
        let mut entries = HashMap::new();
        entries.insert(1, "one");
        assert!(matches!(LogValue::from(entries), LogValue::Map(_)));
    }

    #[test]
    fn test_error_info_serialization() {
        let info = ErrorInfo::new("TimeoutError", "timed out").with_code("ETIMEDOUT");
        assert_eq!(
            info.to_json_value(),
            json!({"message": "timed out", "stack": null, "type": "TimeoutError", "code": "ETIMEDOUT"})
        );
    }

    #[test]
    fn test_error_info_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let info = ErrorInfo::from(&io_err);
        assert_eq!(info.type_name, "Error");
        assert_eq!(info.message, "denied");
        assert_eq!(info.code.as_deref(), Some("PermissionDenied"));
    }

    #[test]
    fn test_error_info_from_logger_error() {
        let err = LoggerError::invalid_level("loud");
        let info = ErrorInfo::from(&err);
        assert_eq!(info.code.as_deref(), Some("LOG_INVALID_LEVEL"));
        assert_eq!(info.message, "Invalid log level provided: loud");
    }

    #[test]
    fn test_args_from_tuple() {
        let args = LogArgs::from((json!({"a": 1}), "message"));
        assert_eq!(args.len(), 2);
        assert!(args.0[0].is_object());
        assert_eq!(args.0[1].as_str(), Some("message"));
    }
}
