use chrono::Utc;
use log::{error as log_error, info as log_info, warn as log_warn};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// Domain-level logging port.
/// Every record carries the name of the component that emitted it
/// (`location_cloaking`, `path_confusion`, ...). Logging never fails from the
/// domain's point of view.
pub trait DomainLogger: Send + Sync + 'static {
    fn log(&self, level: LogLevel, component: &str, msg: &str);

    fn info(&self, component: &str, msg: &str) {
        self.log(LogLevel::Info, component, msg);
    }

    fn warn(&self, component: &str, msg: &str) {
        self.log(LogLevel::Warn, component, msg);
    }

    fn error(&self, component: &str, msg: &str) {
        self.log(LogLevel::Error, component, msg);
    }
}

pub type DynLogger = Arc<dyn DomainLogger>;

/// File logger backed by `fast_log`; records go through the `log` facade.
pub struct FileLogger;

impl FileLogger {
    /// Initialize fast_log with console output plus an append-only file at `path`.
    /// fast_log installs a global logger, so this can succeed once per process.
    pub fn init(path: &str) -> Result<(), Box<dyn std::error::Error>> {
        fast_log::init(
            fast_log::config::Config::new()
                .console()
                .file(path)
                .level(log::LevelFilter::Info),
        )?;
        Ok(())
    }
}

impl DomainLogger for FileLogger {
    fn log(&self, level: LogLevel, component: &str, msg: &str) {
        let now = Utc::now().to_rfc3339();
        match level {
            LogLevel::Info => log_info!("{} [{}] {}", now, component, msg),
            LogLevel::Warn => log_warn!("{} [{}] {}", now, component, msg),
            LogLevel::Error => log_error!("{} [{}] {}", now, component, msg),
        }
    }
}
