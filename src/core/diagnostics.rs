//! Internal diagnostics surface
//!
//! The facade cannot log through itself while its own transports are being
//! resolved, so warnings about dropped sinks and internal debug tracing go
//! through this trait instead.

use parking_lot::Mutex;
use std::sync::Arc;

pub trait Diagnostics: Send + Sync {
    /// Something was recovered from locally (a sink dropped, a fallback used)
    fn warn(&self, message: &str);

    /// Internal tracing, only surfaced when explicitly enabled
    fn debug(&self, scope: &str, message: &str);
}

/// Writes diagnostics to stderr
#[derive(Debug, Clone, Default)]
pub struct StderrDiagnostics {
    debug_enabled: bool,
}

impl StderrDiagnostics {
    pub fn new(debug_enabled: bool) -> Self {
        Self { debug_enabled }
    }

    pub fn shared(debug_enabled: bool) -> Arc<dyn Diagnostics> {
        Arc::new(Self::new(debug_enabled))
    }
}

impl Diagnostics for StderrDiagnostics {
    fn warn(&self, message: &str) {
        eprintln!("[LOGGER WARNING] {}", message);
    }

    fn debug(&self, scope: &str, message: &str) {
        if self.debug_enabled {
            eprintln!("[LOGGER DEBUG:{}] {}", scope, message);
        }
    }
}

/// Keeps diagnostics in memory
///
/// # Example
///
/// ```
/// use rust_logger_facade::core::{CollectingDiagnostics, Diagnostics};
///
/// let diagnostics = CollectingDiagnostics::new();
/// diagnostics.warn("file sink dropped");
/// assert_eq!(diagnostics.warnings(), vec!["file sink dropped".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CollectingDiagnostics {
    warnings: Arc<Mutex<Vec<String>>>,
    debug: Arc<Mutex<Vec<String>>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().clone()
    }

    pub fn debug_messages(&self) -> Vec<String> {
        self.debug.lock().clone()
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn warn(&self, message: &str) {
        self.warnings.lock().push(message.to_string());
    }

    fn debug(&self, scope: &str, message: &str) {
        self.debug.lock().push(format!("{}: {}", scope, message));
    }
}
