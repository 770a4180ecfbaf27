use cloakscope::domains::logger::{DomainLogger, LogLevel};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct BridgeCapture {
    messages: Arc<Mutex<Vec<String>>>,
}

impl BridgeCapture {
    fn new() -> Self { Self { messages: Arc::new(Mutex::new(Vec::new())) } }
}

impl DomainLogger for BridgeCapture {
    fn log(&self, level: LogLevel, component: &str, msg: &str) {
        let tag = match level {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERR",
        };
        self.messages.lock().unwrap().push(format!("{}:{}:{}", tag, component, msg));
    }
}

#[tokio::test]
async fn test_buffered_and_noop_logger() {
    let capture = Arc::new(BridgeCapture::new());
    let bridge = capture.clone() as Arc<dyn DomainLogger>;

    let buffered = cloakscope::adapters::outbound::init_buffered_logger(bridge.clone(), 8);

    buffered.info("fleet", "one");
    buffered.warn("fleet", "two");
    buffered.error("fleet", "three");

    // Give the background task a moment
    tokio::time::sleep(Duration::from_millis(50)).await;

    let msgs = capture.messages.lock().unwrap();
    assert!(msgs.iter().any(|m| m == "INFO:fleet:one"));
    assert!(msgs.iter().any(|m| m == "WARN:fleet:two"));
    assert!(msgs.iter().any(|m| m == "ERR:fleet:three"));

    let noop = cloakscope::adapters::outbound::init_noop_logger();
    noop.info("fleet", "ignored");
    noop.error("fleet", "ignored-err");
}

#[test]
fn test_multi_logger_forwards_to_both() {
    let first = Arc::new(BridgeCapture::new());
    let second = Arc::new(BridgeCapture::new());
    let multi = cloakscope::adapters::outbound::MultiLogger::new(first.clone(), Some(second.clone() as Arc<dyn DomainLogger>));

    multi.warn("path_confusion", "hello");

    assert_eq!(*first.messages.lock().unwrap(), vec!["WARN:path_confusion:hello".to_string()]);
    assert_eq!(*second.messages.lock().unwrap(), vec!["WARN:path_confusion:hello".to_string()]);
}

#[test]
fn test_reconciler_logs_through_injected_logger() {
    use cloakscope::common::Reconciler;
    use cloakscope::domains::location_cloaking::LocationCloakingState;

    let capture = Arc::new(BridgeCapture::new());
    let mut reconciler: Reconciler<LocationCloakingState> = Reconciler::new(capture.clone());

    reconciler.handle_frame("not json at all");

    let msgs = capture.messages.lock().unwrap();
    assert_eq!(msgs.len(), 1);
    assert!(msgs[0].starts_with("WARN:location_cloaking:Dropping frame"));
}
