//! Log record structure
//!
//! A record is what the engine hands to every sink: level, timestamp, the
//! engine's base fields, the logger's bindings, call-site fields and message.

use super::log_level::LogLevel;
use super::value::Record;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: LogLevel,
    pub time: DateTime<Utc>,
    /// Engine-wide fields (`pid`, `hostname`)
    pub base: Arc<Record>,
    /// Logger bindings (`namespace` and child bindings)
    pub bindings: Arc<Record>,
    /// Call-site fields
    pub fields: Record,
    pub msg: Option<String>,
}

impl LogRecord {
    pub fn new(level: LogLevel, msg: Option<String>) -> Self {
        Self {
            level,
            time: Utc::now(),
            base: Arc::new(Record::new()),
            bindings: Arc::new(Record::new()),
            fields: Record::new(),
            msg,
        }
    }

    pub fn with_base(mut self, base: Arc<Record>) -> Self {
        self.base = base;
        self
    }

    pub fn with_bindings(mut self, bindings: Arc<Record>) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn with_fields(mut self, fields: Record) -> Self {
        self.fields = fields;
        self
    }

    /// The namespace binding, if the record came from a namespaced logger
    pub fn namespace(&self) -> Option<&str> {
        self.bindings.get("namespace").and_then(Value::as_str)
    }

    /// Bindings and call-site fields without the namespace, in output order
    pub fn user_fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.bindings
            .iter()
            .filter(|(k, _)| k.as_str() != "namespace")
            .chain(
                self.fields
                    .iter()
                    .filter(move |(k, _)| !self.bindings.contains_key(*k)),
            )
            .map(move |(k, v)| (k, self.fields.get(k).unwrap_or(v)))
    }

    /// Flatten into a single JSON object.
    ///
    /// Later sources override earlier ones: base, then bindings, then
    /// call-site fields. `msg` is always last.
    #[must_use]
    pub fn to_json_value(&self) -> Value {
        let mut obj = Record::new();
        obj.insert("level".to_string(), Value::from(self.level.rank()));
        obj.insert("time".to_string(), Value::from(self.time.timestamp_millis()));
        for (key, value) in self.base.iter().chain(self.bindings.iter()) {
            obj.insert(key.clone(), value.clone());
        }
        for (key, value) in self.fields.iter() {
            obj.insert(key.clone(), value.clone());
        }
        if let Some(ref msg) = self.msg {
            obj.insert("msg".to_string(), Value::String(msg.clone()));
        }
        Value::Object(obj)
    }

    /// Serialize as a single JSON line (without the trailing newline)
    pub fn to_json_line(&self) -> String {
        self.to_json_value().to_string()
    }
}
