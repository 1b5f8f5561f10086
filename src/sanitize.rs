//! Value sanitization for call-site arguments
//!
//! [`prepare`] makes an argument safe to serialize: map-like values consume
//! depth budget and collapse to a sentinel when it runs out, long strings are
//! truncated, and everything else passes through. [`prepare_call`] applies the
//! leveled-method argument rules on top of that: a leading error, a leading
//! object of fields, and the message with printf-style placeholders.

use crate::core::{LogArgs, LogValue, Record};
use serde_json::Value;

/// Replacement for a map nested deeper than the depth budget
pub const MAX_DEPTH_SENTINEL: &str = "[Max Map Depth Reached]";

pub const DEFAULT_MAX_DEPTH: i64 = 8;
pub const DEFAULT_TRUNCATION_MARKER: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizeOptions {
    /// Map nesting budget
    pub max_depth: i64,
    /// Maximum string length in characters; 0 disables truncation
    pub max_string_length: usize,
    pub truncation_marker: String,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_string_length: 0,
            truncation_marker: DEFAULT_TRUNCATION_MARKER.to_string(),
        }
    }
}

impl SanitizeOptions {
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: i64) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_max_string_length(mut self, max_string_length: usize) -> Self {
        self.max_string_length = max_string_length;
        self
    }

    #[must_use]
    pub fn with_truncation_marker(mut self, marker: impl Into<String>) -> Self {
        self.truncation_marker = marker.into();
        self
    }
}

/// Sanitize one value with the full depth budget
pub fn prepare(value: &LogValue, options: &SanitizeOptions) -> LogValue {
    prepare_at(value, options.max_depth, options)
}

fn prepare_at(value: &LogValue, depth: i64, options: &SanitizeOptions) -> LogValue {
    match value {
        LogValue::String(s) => LogValue::String(truncate(s, options)),
        LogValue::Map(entries) => {
            if depth <= 0 {
                return LogValue::String(MAX_DEPTH_SENTINEL.to_string());
            }
            LogValue::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), prepare_at(v, depth - 1, options)))
                    .collect(),
            )
        }
        LogValue::Array(items) => LogValue::Array(
            items
                .iter()
                .map(|item| prepare_at(item, depth, options))
                .collect(),
        ),
        LogValue::Object(fields) => LogValue::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), prepare_at(v, depth, options)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Cut `s` to `max_string_length` characters and append the marker
pub fn truncate(s: &str, options: &SanitizeOptions) -> String {
    let max = options.max_string_length;
    if max == 0 {
        return s.to_string();
    }
    match s.char_indices().nth(max) {
        Some((cut, _)) => {
            let mut out = String::with_capacity(cut + options.truncation_marker.len());
            out.push_str(&s[..cut]);
            out.push_str(&options.truncation_marker);
            out
        }
        None => s.to_string(),
    }
}

/// Structured fields and message of one log call
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedCall {
    pub fields: Record,
    pub msg: Option<String>,
}

/// Apply the leveled-method argument rules.
///
/// Returns `None` for an empty argument list, which is not logged.
pub fn prepare_call(args: LogArgs, options: &SanitizeOptions) -> Option<PreparedCall> {
    let mut args = args.into_inner();
    if args.is_empty() {
        return None;
    }

    // A leading error is the whole payload
    if let LogValue::Error(info) = &args[0] {
        let mut fields = Record::new();
        fields.insert("err".to_string(), info.to_json_value());
        return Some(PreparedCall {
            fields,
            msg: Some(info.message.clone()),
        });
    }

    let prepared: Vec<LogValue> = args.drain(..).map(|arg| prepare(&arg, options)).collect();

    match prepared.split_first() {
        Some((LogValue::Object(entries), rest)) => {
            let fields = entries
                .iter()
                .map(|(key, value)| {
                    let value = match value {
                        LogValue::Error(info) => info.to_json_value(),
                        other => other.to_json_value(),
                    };
                    (key.clone(), value)
                })
                .collect();
            Some(PreparedCall {
                fields,
                msg: format_message(rest),
            })
        }
        _ => Some(PreparedCall {
            fields: Record::new(),
            msg: format_message(&prepared),
        }),
    }
}

/// Render a message from its arguments.
///
/// When the first argument is a string, `%s %d %i %f %j %o %O` consume the
/// following arguments and `%%` is a literal percent. Arguments left over are
/// appended, separated by spaces.
pub fn format_message(args: &[LogValue]) -> Option<String> {
    let (first, rest) = args.split_first()?;

    let mut remaining = rest.iter();
    let mut out = match first {
        LogValue::String(template) => interpolate(template, &mut remaining),
        other => other.to_string(),
    };

    for arg in remaining {
        out.push(' ');
        out.push_str(&arg.to_string());
    }
    Some(out)
}

fn interpolate<'a>(template: &str, args: &mut impl Iterator<Item = &'a LogValue>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let Some(&spec) = chars.peek() else {
            out.push('%');
            break;
        };
        if spec == '%' {
            chars.next();
            out.push('%');
            continue;
        }
        if !matches!(spec, 's' | 'd' | 'i' | 'f' | 'j' | 'o' | 'O') {
            out.push('%');
            continue;
        }
        chars.next();
        match args.next() {
            Some(arg) => out.push_str(&render_placeholder(spec, arg)),
            None => {
                out.push('%');
                out.push(spec);
            }
        }
    }
    out
}

fn render_placeholder(spec: char, arg: &LogValue) -> String {
    match spec {
        'd' | 'i' => match arg {
            LogValue::Int(i) => i.to_string(),
            LogValue::Float(f) if f.is_finite() => (f.trunc() as i64).to_string(),
            LogValue::Bool(b) => i64::from(*b).to_string(),
            LogValue::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(|f| (f.trunc() as i64).to_string())
                .unwrap_or_else(|| "NaN".to_string()),
            _ => "NaN".to_string(),
        },
        'f' => match arg {
            LogValue::Int(i) => i.to_string(),
            LogValue::Float(f) => f.to_string(),
            LogValue::String(s) => s
                .trim()
                .parse::<f64>()
                .map(|f| f.to_string())
                .unwrap_or_else(|_| "NaN".to_string()),
            _ => "NaN".to_string(),
        },
        'j' | 'o' | 'O' => match arg.to_json_value() {
            Value::String(s) => Value::String(s).to_string(),
            other => other.to_string(),
        },
        _ => arg.to_string(),
    }
}
