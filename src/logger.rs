//! Application logging capability.
//!
//! Components never reach for a global logger. They hold an
//! `Arc<dyn AppLogger>` handed to them at construction, usually wrapped in a
//! [`ModuleLogger`] that stamps the component's module name on every line.
//!
//! [`TracingLogger`] is the production sink. [`MemoryLogger`] records lines
//! for inspection.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::LoggerConfig;

/// Log severity.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Severity {
    Info,
    Warn,
    Debug,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Debug => "debug",
            Self::Error => "error",
        })
    }
}

/// The logging collaborator.
///
/// `meta` carries structured metadata; sinks only attach it at
/// [`Severity::Error`].
pub trait AppLogger: Send + Sync + 'static {
    fn log(&self, severity: Severity, message: &str, meta: &[Value]);

    /// Logs `[module] : message`.
    fn log_message(&self, severity: Severity, module: &str, message: &str, meta: &[Value]) {
        self.log(severity, &format!("[{module}] : {message}"), meta);
    }
}

/// Writes through `tracing`, tagging each event with the service name.
pub struct TracingLogger {
    service: String,
}

impl TracingLogger {
    pub fn new(config: &LoggerConfig) -> Self {
        Self { service: config.service_name.clone() }
    }
}

impl AppLogger for TracingLogger {
    fn log(&self, severity: Severity, message: &str, meta: &[Value]) {
        let service = &self.service;
        match severity {
            Severity::Info => info!(service = %service, "{message}"),
            Severity::Warn => warn!(service = %service, "{message}"),
            Severity::Debug => debug!(service = %service, "{message}"),
            Severity::Error if meta.is_empty() => error!(service = %service, "{message}"),
            Severity::Error => {
                let meta = Value::Array(meta.to_vec());
                error!(service = %service, meta = %meta, "{message}");
            }
        }
    }
}

/// One captured log line.
#[derive(Clone, Debug, PartialEq)]
pub struct LogLine {
    pub severity: Severity,
    pub message: String,
    pub meta: Vec<Value>,
}

/// Keeps every line in memory.
#[derive(Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<LogLine>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Messages only, in emission order.
    pub fn messages(&self) -> Vec<String> {
        self.lines().into_iter().map(|l| l.message).collect()
    }
}

impl AppLogger for MemoryLogger {
    fn log(&self, severity: Severity, message: &str, meta: &[Value]) {
        if let Ok(mut lines) = self.lines.lock() {
            let meta = if severity == Severity::Error { meta.to_vec() } else { Vec::new() };
            lines.push(LogLine { severity, message: message.to_owned(), meta });
        }
    }
}

/// A logger bound to one module name.
#[derive(Clone)]
pub struct ModuleLogger {
    module: String,
    sink: Arc<dyn AppLogger>,
}

impl ModuleLogger {
    pub fn new(module: impl Into<String>, sink: Arc<dyn AppLogger>) -> Self {
        Self { module: module.into(), sink }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    /// The underlying sink, for components that format their own lines.
    pub fn sink(&self) -> &Arc<dyn AppLogger> {
        &self.sink
    }

    pub fn info(&self, message: &str) {
        self.sink.log_message(Severity::Info, &self.module, message, &[]);
    }

    pub fn warn(&self, message: &str) {
        self.sink.log_message(Severity::Warn, &self.module, message, &[]);
    }

    pub fn debug(&self, message: &str) {
        self.sink.log_message(Severity::Debug, &self.module, message, &[]);
    }

    pub fn error(&self, message: &str, meta: &[Value]) {
        self.sink.log_message(Severity::Error, &self.module, message, meta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn module_logger_prefixes_module() {
        let sink = Arc::new(MemoryLogger::new());
        let log = ModuleLogger::new("Mailer", sink.clone());
        log.info("sent");
        assert_eq!(sink.messages(), vec!["[Mailer] : sent".to_owned()]);
    }

    #[test]
    fn only_error_severity_keeps_meta() {
        let sink = Arc::new(MemoryLogger::new());
        sink.log(Severity::Warn, "w", &[json!({ "k": 1 })]);
        sink.log(Severity::Error, "e", &[json!({ "k": 2 })]);
        let lines = sink.lines();
        assert!(lines[0].meta.is_empty());
        assert_eq!(lines[1].meta, vec![json!({ "k": 2 })]);
    }
}
