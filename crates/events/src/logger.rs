//! Logger contract used by the controller.

use std::error::Error;
use std::sync::{Arc, Mutex, PoisonError};

/// Minimal logging surface the host can redirect (e.g. to logcat).
pub trait Logger: Send + Sync {
    fn debug(&self, message: &str);
    fn error(&self, message: &str, cause: Option<&(dyn Error + 'static)>);
}

pub type LoggerRef = Arc<dyn Logger>;

/// Forwards to `tracing` under the `parkwatch` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "parkwatch", "{message}");
    }

    fn error(&self, message: &str, cause: Option<&(dyn Error + 'static)>) {
        match cause {
            Some(cause) => tracing::error!(target: "parkwatch", error = %cause, "{message}"),
            None => tracing::error!(target: "parkwatch", "{message}"),
        }
    }
}

/// Level of a captured log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Error,
}

/// A captured log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    pub cause: Option<String>,
}

/// Logger that keeps every line for later inspection.
#[derive(Default)]
pub struct RecordingLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn errors(&self) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.level == LogLevel::Error)
            .collect()
    }

    fn push(&self, record: LogRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

impl Logger for RecordingLogger {
    fn debug(&self, message: &str) {
        self.push(LogRecord {
            level: LogLevel::Debug,
            message: message.to_string(),
            cause: None,
        });
    }

    fn error(&self, message: &str, cause: Option<&(dyn Error + 'static)>) {
        self.push(LogRecord {
            level: LogLevel::Error,
            message: message.to_string(),
            cause: cause.map(|c| c.to_string()),
        });
    }
}
