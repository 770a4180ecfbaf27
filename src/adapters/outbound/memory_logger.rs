use crate::domains::logger::{DomainLogger, LogLevel};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub component: String,
    pub msg: String,
}

/// Keeps every record in memory, for tests and diagnostics dumps.
#[derive(Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }

    pub fn warnings(&self) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == LogLevel::Warn)
            .collect()
    }
}

impl DomainLogger for MemoryLogger {
    fn log(&self, level: LogLevel, component: &str, msg: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(LogEntry {
                level,
                component: component.to_string(),
                msg: msg.to_string(),
            });
        }
    }
}
