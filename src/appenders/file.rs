//! File appender implementation

use crate::core::{Appender, LogRecord, LoggerError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends JSON lines to a file
pub struct FileAppender {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileAppender {
    /// Open `path` for appending, creating the file if needed
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(path, true, false)
    }

    /// Open `path`, optionally truncating it and creating its directory
    pub fn open(path: impl Into<PathBuf>, append: bool, mkdir: bool) -> Result<Self> {
        let path = path.into();
        if mkdir {
            ensure_parent_dir(&path)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(&path)
            .map_err(|e| {
                LoggerError::file_write(path.display().to_string(), e.to_string(), Some(Box::new(e)))
            })?;

        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Create the parent directory of `path` when it is missing
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
            fs::create_dir_all(dir).map_err(|e| {
                LoggerError::dir_create(dir.display().to_string(), e.to_string(), Some(Box::new(e)))
            })
        }
        _ => Ok(()),
    }
}

impl Appender for FileAppender {
    fn append(&mut self, record: &LogRecord) -> Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            LoggerError::file_write(self.path.display().to_string(), "writer closed", None)
        })?;

        let line = record.to_json_line();
        writeln!(writer, "{}", line).map_err(|e| {
            LoggerError::file_write(self.path.display().to_string(), e.to_string(), Some(Box::new(e)))
        })?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileAppender {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.flush();
    }
}
