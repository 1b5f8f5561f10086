//! Dependency-free console appender
//!
//! `[ISO time] LEVEL (namespace): msg`, then the error message and stack when
//! an `err` field is present, then the remaining fields as indented JSON.

use super::{paint, ConsoleWriter};
use crate::core::{Appender, LogRecord, Record, Result, TimestampFormat};
use serde_json::Value;
use std::io::Write;

pub struct SimpleAppender {
    colorize: bool,
    writer: ConsoleWriter,
}

impl SimpleAppender {
    pub fn new() -> Self {
        Self::with_writer(true, ConsoleWriter::Stdout)
    }

    pub fn with_writer(colorize: bool, writer: ConsoleWriter) -> Self {
        Self { colorize, writer }
    }

    pub fn render(&self, record: &LogRecord) -> String {
        let head = format!(
            "[{}] {}",
            TimestampFormat::Iso8601.format(&record.time),
            record.level.to_str()
        );
        let mut out = paint(&head, record.level, self.colorize);

        if let Some(namespace) = record.namespace() {
            out.push_str(&format!(" ({})", namespace));
        }
        out.push_str(": ");
        out.push_str(record.msg.as_deref().unwrap_or(""));

        let err = record
            .fields
            .get("err")
            .or_else(|| record.bindings.get("err"));
        if let Some(err) = err {
            let message = err.get("message").and_then(Value::as_str).unwrap_or("");
            out.push('\n');
            out.push_str(&paint(
                &format!("Error: {}", message),
                record.level,
                self.colorize,
            ));
            if let Some(stack) = err.get("stack").and_then(Value::as_str) {
                out.push('\n');
                out.push_str(stack);
            }
        }

        let mut rest = Record::new();
        for (key, value) in record.base.iter().chain(record.user_fields()) {
            if key != "err" {
                rest.insert(key.clone(), value.clone());
            }
        }
        if !rest.is_empty() {
            out.push('\n');
            out.push_str(&serde_json::to_string_pretty(&rest).unwrap_or_default());
        }
        out
    }
}

impl Default for SimpleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for SimpleAppender {
    fn append(&mut self, record: &LogRecord) -> Result<()> {
        let text = self.render(record);
        writeln!(self.writer, "{}", text)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "simple"
    }
}
