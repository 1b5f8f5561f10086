//! Human-readable console appender
//!
//! Renders `[time] LEVEL (namespace): msg` followed by the remaining fields,
//! either one per indented line or as a trailing JSON object.

use super::{option_bool, option_i64, option_str, paint, ConsoleWriter};
use crate::core::{Appender, LogRecord, Record, Result, TimestampFormat};
use serde_json::Value;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrettyOptions {
    pub colorize: bool,
    pub translate_time: TimestampFormat,
    /// Field names left out of the output
    pub ignore: Vec<String>,
    pub single_line: bool,
    /// 1 for stdout, 2 for stderr
    pub destination: i64,
}

impl Default for PrettyOptions {
    fn default() -> Self {
        Self {
            colorize: true,
            translate_time: TimestampFormat::SysStandard,
            ignore: vec!["pid".to_string(), "hostname".to_string()],
            single_line: false,
            destination: 1,
        }
    }
}

impl PrettyOptions {
    /// Read `colorize`, `translatetime`, `ignore`, `singleline` and
    /// `destination` from transport options
    pub fn from_options(options: &Record) -> Self {
        let defaults = Self::default();
        let translate_time = match options.get("translatetime") {
            Some(Value::Bool(false)) => TimestampFormat::EpochMillis,
            Some(Value::Bool(true)) => TimestampFormat::UtcStandard,
            _ => option_str(options, "translatetime")
                .map(TimestampFormat::from_option)
                .unwrap_or(defaults.translate_time),
        };
        let ignore = option_str(options, "ignore")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or(defaults.ignore);

        Self {
            colorize: option_bool(options, "colorize").unwrap_or(defaults.colorize),
            translate_time,
            ignore,
            single_line: option_bool(options, "singleline").unwrap_or(defaults.single_line),
            destination: option_i64(options, "destination").unwrap_or(defaults.destination),
        }
    }

    fn is_ignored(&self, key: &str) -> bool {
        self.ignore.iter().any(|k| k == key)
    }
}

pub struct PrettyAppender {
    options: PrettyOptions,
    writer: ConsoleWriter,
}

impl PrettyAppender {
    pub fn new(options: PrettyOptions) -> Self {
        let writer = ConsoleWriter::for_destination(options.destination);
        Self { options, writer }
    }

    pub fn with_writer(options: PrettyOptions, writer: ConsoleWriter) -> Self {
        Self { options, writer }
    }

    pub fn options(&self) -> &PrettyOptions {
        &self.options
    }

    pub fn render(&self, record: &LogRecord) -> String {
        let options = &self.options;
        let level = format!("{:5}", record.level.to_str());
        let mut out = format!(
            "[{}] {}",
            options.translate_time.format(&record.time),
            paint(&level, record.level, options.colorize)
        );

        if let Some(namespace) = record.namespace() {
            if !options.is_ignored("namespace") {
                out.push_str(&format!(" ({})", namespace));
            }
        }
        out.push(':');
        if let Some(ref msg) = record.msg {
            out.push(' ');
            out.push_str(msg);
        }

        let fields: Vec<(&String, &Value)> = record
            .base
            .iter()
            .filter(|(k, _)| !record.bindings.contains_key(*k) && !record.fields.contains_key(*k))
            .chain(record.user_fields())
            .filter(|(k, _)| !options.is_ignored(k))
            .collect();

        if fields.is_empty() {
            return out;
        }

        if options.single_line {
            let obj: Record = fields
                .into_iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            out.push(' ');
            out.push_str(&Value::Object(obj).to_string());
        } else {
            for (key, value) in fields {
                let rendered = serde_json::to_string_pretty(value).unwrap_or_default();
                out.push_str(&format!("\n    {}: {}", key, rendered.replace('\n', "\n    ")));
            }
        }
        out
    }
}

impl Appender for PrettyAppender {
    fn append(&mut self, record: &LogRecord) -> Result<()> {
        let line = self.render(record);
        writeln!(self.writer, "{}", line)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "pretty"
    }
}
