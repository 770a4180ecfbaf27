use crate::domains::logger::{DomainLogger, LogLevel};
use std::sync::Arc;

struct ConsoleBridge;

impl DomainLogger for ConsoleBridge {
    fn log(&self, level: LogLevel, component: &str, msg: &str) {
        match level {
            LogLevel::Info => println!("[{}] {}", component, msg),
            LogLevel::Warn => println!("WARN [{}] {}", component, msg),
            LogLevel::Error => eprintln!("ERROR [{}] {}", component, msg),
        }
    }
}

/// Initialize a simple console-backed DomainLogger (useful as a fallback)
pub fn init_console_logger() -> Arc<dyn DomainLogger> {
    Arc::new(ConsoleBridge {})
}
