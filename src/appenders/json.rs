//! JSON lines appender
//!
//! Writes each record as a single-line JSON object (JSONL format), the wire
//! form every target-based sink receives.

use crate::core::{Appender, LogRecord, Result};
use std::io::{self, BufWriter, Write};

pub struct JsonLinesAppender<W: Write + Send + Sync> {
    writer: BufWriter<W>,
    name: String,
}

impl<W: Write + Send + Sync> JsonLinesAppender<W> {
    pub fn new(writer: W) -> Self {
        Self::named("json", writer)
    }

    pub fn named(name: impl Into<String>, writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            name: name.into(),
        }
    }

    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }
}

impl JsonLinesAppender<io::Stdout> {
    pub fn stdout() -> Self {
        Self::named("stdout", io::stdout())
    }
}

impl JsonLinesAppender<io::Stderr> {
    pub fn stderr() -> Self {
        Self::named("stderr", io::stderr())
    }
}

impl<W: Write + Send + Sync> Appender for JsonLinesAppender<W> {
    fn append(&mut self, record: &LogRecord) -> Result<()> {
        let line = serde_json::to_string(&record.to_json_value())?;
        writeln!(self.writer, "{}", line)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
