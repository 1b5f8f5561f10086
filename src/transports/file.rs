//! File transport
//!
//! Resolves to the `file` target. The engine opens the destination itself;
//! the factory only prepares the directory and checks the file is writable,
//! so that a bad path fails here, where the resolver can drop the sink.

use super::{SinkFactory, TransportDescriptor};
use crate::appenders::{option_bool, option_str, FILE_TARGET};
use crate::config::{render_filename, AppInfo, BaseFields, DEFAULT_LOG_FOLDER};
use crate::core::{Clock, LoggerError, Record, ResolvedSink, Result, SystemClock};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_FILENAME: &str = "app.log";

pub struct FileFactory {
    app: AppInfo,
    base: BaseFields,
    clock: Arc<dyn Clock>,
}

impl FileFactory {
    pub fn new(app: AppInfo, base: BaseFields) -> Self {
        Self::with_clock(app, base, Arc::new(SystemClock))
    }

    pub fn with_clock(app: AppInfo, base: BaseFields, clock: Arc<dyn Clock>) -> Self {
        Self { app, base, clock }
    }

    /// Destination from `destination`, or `folder` joined with the templated
    /// `filename`
    fn destination(&self, options: &Record) -> Destination {
        match options.get("destination") {
            Some(Value::Number(n)) => {
                if let Some(fd) = n.as_u64() {
                    return Destination::Fd(fd);
                }
            }
            Some(Value::String(s)) if !s.is_empty() => {
                if let Ok(fd) = s.parse::<u64>() {
                    return Destination::Fd(fd);
                }
                return Destination::Path(PathBuf::from(s));
            }
            _ => {}
        }

        let folder = option_str(options, "folder").unwrap_or(DEFAULT_LOG_FOLDER);
        let filename = option_str(options, "filename").unwrap_or(DEFAULT_FILENAME);
        let filename = render_filename(filename, &self.app, &self.base, self.clock.now());
        Destination::Path(Path::new(folder).join(filename))
    }
}

enum Destination {
    Fd(u64),
    Path(PathBuf),
}

#[async_trait]
impl SinkFactory for FileFactory {
    async fn create(&self, descriptor: &TransportDescriptor) -> Result<ResolvedSink> {
        let mkdir = option_bool(&descriptor.options, "mkdir").unwrap_or(true);
        let append = option_bool(&descriptor.options, "append").unwrap_or(true);

        let destination = match self.destination(&descriptor.options) {
            Destination::Fd(fd @ (1 | 2)) => Value::from(fd),
            Destination::Fd(fd) => {
                return Err(LoggerError::transport_init(
                    format!("unsupported file descriptor {} (only 1 and 2)", fd),
                    None,
                ));
            }
            Destination::Path(path) => {
                if mkdir {
                    create_parent_dir(&path).await?;
                }
                probe_writable(&path).await?;
                Value::String(path.to_string_lossy().into_owned())
            }
        };

        let mut options = Record::new();
        options.insert("destination".to_string(), destination);
        options.insert("mkdir".to_string(), Value::Bool(mkdir));
        options.insert("append".to_string(), Value::Bool(append));
        Ok(ResolvedSink::target(FILE_TARGET, options, descriptor.level))
    }
}

async fn create_parent_dir(path: &Path) -> Result<()> {
    let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) else {
        return Ok(());
    };
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        LoggerError::dir_create(dir.display().to_string(), e.to_string(), Some(Box::new(e)))
    })
}

async fn probe_writable(path: &Path) -> Result<()> {
    tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map(drop)
        .map_err(|e| {
            LoggerError::file_write(path.display().to_string(), e.to_string(), Some(Box::new(e)))
        })
}
