use crate::domains::logger::{DomainLogger, LogLevel};
use std::sync::Arc;
use tokio::sync::mpsc;

struct LogRecord {
    level: LogLevel,
    component: String,
    msg: String,
}

/// Non-blocking buffered logger. Records are forwarded to `bridge` from a
/// background task; when the buffer of `capacity` records is full new
/// records are dropped. Must be called inside a tokio runtime.
pub fn init_buffered_logger(bridge: Arc<dyn DomainLogger>, capacity: usize) -> Arc<dyn DomainLogger> {
    let (tx, mut rx) = mpsc::channel::<LogRecord>(capacity);

    tokio::spawn(async move {
        while let Some(record) = rx.recv().await {
            bridge.log(record.level, &record.component, &record.msg);
        }
    });

    struct BufferedLogger {
        sender: mpsc::Sender<LogRecord>,
    }

    impl DomainLogger for BufferedLogger {
        fn log(&self, level: LogLevel, component: &str, msg: &str) {
            let _ = self.sender.try_send(LogRecord {
                level,
                component: component.to_string(),
                msg: msg.to_string(),
            });
        }
    }

    Arc::new(BufferedLogger { sender: tx })
}
