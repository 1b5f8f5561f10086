//! Error types for the logger facade
//!
//! Every variant carries a stable code (see [`LoggerError::code`]) and an
//! optional underlying cause reachable through `source()`.

pub type Result<T> = std::result::Result<T, LoggerError>;

/// Boxed underlying cause
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Unknown severity name
    #[error("Invalid log level provided: {level}")]
    InvalidLevel { level: String },

    /// Log directory could not be created
    #[error("Failed to create log directory {path}: {reason}")]
    DirCreate {
        path: String,
        reason: String,
        #[source]
        source: Option<Cause>,
    },

    /// Log file could not be opened or written
    #[error("Failed to write to log file {path}: {reason}")]
    FileWrite {
        path: String,
        reason: String,
        #[source]
        source: Option<Cause>,
    },

    /// Rotation of a log file failed
    #[error("Failed to rotate log file {path}: {reason}")]
    Rotate {
        path: String,
        reason: String,
        #[source]
        source: Option<Cause>,
    },

    /// Pruning of old archives failed
    #[error("Failed to cleanup old log archives: {reason}")]
    Cleanup {
        reason: String,
        #[source]
        source: Option<Cause>,
    },

    /// A record could not be formatted
    #[error("Failed to format log message: {reason}")]
    Format {
        reason: String,
        #[source]
        source: Option<Cause>,
    },

    /// A transport or the engine could not be initialized
    #[error("Failed to initialize log transport: {reason}")]
    TransportInit {
        reason: String,
        #[source]
        source: Option<Cause>,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoggerError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            LoggerError::InvalidLevel { .. } => "LOG_INVALID_LEVEL",
            LoggerError::DirCreate { .. } => "LOG_DIR_CREATE_FAILED",
            LoggerError::FileWrite { .. } => "LOG_FILE_WRITE_FAILED",
            LoggerError::Rotate { .. } => "LOG_ROTATE_FAILED",
            LoggerError::Cleanup { .. } => "LOG_CLEANUP_FAILED",
            LoggerError::Format { .. } => "LOG_FORMAT_FAILED",
            LoggerError::TransportInit { .. } => "LOG_TRANSPORT_INIT_FAILED",
            LoggerError::Io(_) => "LOG_IO",
        }
    }

    pub fn invalid_level(level: impl Into<String>) -> Self {
        LoggerError::InvalidLevel {
            level: level.into(),
        }
    }

    pub fn dir_create(
        path: impl Into<String>,
        reason: impl Into<String>,
        source: Option<Cause>,
    ) -> Self {
        LoggerError::DirCreate {
            path: path.into(),
            reason: reason.into(),
            source,
        }
    }

    pub fn file_write(
        path: impl Into<String>,
        reason: impl Into<String>,
        source: Option<Cause>,
    ) -> Self {
        LoggerError::FileWrite {
            path: path.into(),
            reason: reason.into(),
            source,
        }
    }

    /// Rotation failure caused by an IO error
    pub fn rotate(path: impl Into<String>, source: std::io::Error) -> Self {
        LoggerError::Rotate {
            path: path.into(),
            reason: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Cleanup failure caused by an IO error
    pub fn cleanup(source: std::io::Error) -> Self {
        LoggerError::Cleanup {
            reason: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub fn format(reason: impl Into<String>, source: Option<Cause>) -> Self {
        LoggerError::Format {
            reason: reason.into(),
            source,
        }
    }

    pub fn transport_init(reason: impl Into<String>, source: Option<Cause>) -> Self {
        LoggerError::TransportInit {
            reason: reason.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for LoggerError {
    fn from(err: serde_json::Error) -> Self {
        LoggerError::format(err.to_string(), Some(Box::new(err)))
    }
}
