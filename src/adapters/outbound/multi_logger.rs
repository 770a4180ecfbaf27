use crate::domains::logger::{DomainLogger, LogLevel};
use std::sync::Arc;

/// Forwards every record to a primary and an optional secondary logger.
pub struct MultiLogger {
    primary: Arc<dyn DomainLogger>,
    secondary: Option<Arc<dyn DomainLogger>>,
}

impl MultiLogger {
    pub fn new(primary: Arc<dyn DomainLogger>, secondary: Option<Arc<dyn DomainLogger>>) -> Self {
        Self { primary, secondary }
    }
}

impl DomainLogger for MultiLogger {
    fn log(&self, level: LogLevel, component: &str, msg: &str) {
        self.primary.log(level, component, msg);
        if let Some(sec) = &self.secondary {
            sec.log(level, component, msg);
        }
    }
}

/// Initialize a combined logger: try to initialize file logger and attach console as secondary.
pub fn init_combined_logger(path: &str) -> Arc<dyn DomainLogger> {
    let console = crate::adapters::outbound::init_console_logger();
    match crate::adapters::outbound::file_logger::init_file_logger(path) {
        Ok(file_logger) => Arc::new(MultiLogger::new(file_logger, Some(console))) as Arc<dyn DomainLogger>,
        Err(e) => {
            console.warn("logging", &e);
            console
        }
    }
}
