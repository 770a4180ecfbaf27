use crate::common::{FrameStream, StreamConnector, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::time::Instant;

/// What a scripted connection delivers next.
#[derive(Debug, Clone)]
pub enum ScriptedEvent {
    Frame(String),
    /// Remote end closes cleanly.
    Close,
    /// Abnormal termination.
    Error(String),
}

#[derive(Default)]
struct ScriptState {
    pending: VecDeque<mpsc::UnboundedReceiver<ScriptedEvent>>,
    attempts: Vec<Instant>,
    closed: usize,
}

/// In-memory connector: every connection attempt takes the next scripted
/// channel, or is refused when none is queued.
#[derive(Clone, Default)]
pub struct ChannelConnector {
    state: Arc<Mutex<ScriptState>>,
}

impl ChannelConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a connection; events sent on the returned handle are delivered
    /// in order. Dropping the handle ends the stream like a clean close.
    pub fn script(&self) -> mpsc::UnboundedSender<ScriptedEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().pending.push_back(rx);
        tx
    }

    /// Queue a connection that delivers `frames` and then stays open.
    pub fn script_frames<I, S>(&self, frames: I) -> mpsc::UnboundedSender<ScriptedEvent>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tx = self.script();
        for frame in frames {
            let _ = tx.send(ScriptedEvent::Frame(frame.into()));
        }
        tx
    }

    /// Instants of every connection attempt, refused ones included.
    pub fn attempts(&self) -> Vec<Instant> {
        self.lock().attempts.clone()
    }

    /// Number of established streams that were closed by the client.
    pub fn closed(&self) -> usize {
        self.lock().closed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub struct ChannelFrameStream {
    events: mpsc::UnboundedReceiver<ScriptedEvent>,
    state: Arc<Mutex<ScriptState>>,
}

#[async_trait]
impl StreamConnector for ChannelConnector {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn FrameStream>, TransportError> {
        let mut state = self.lock();
        state.attempts.push(Instant::now());
        match state.pending.pop_front() {
            Some(events) => Ok(Box::new(ChannelFrameStream {
                events,
                state: Arc::clone(&self.state),
            })),
            None => Err(TransportError::Connect(format!("{} refused the connection", endpoint))),
        }
    }
}

#[async_trait]
impl FrameStream for ChannelFrameStream {
    async fn next_frame(&mut self) -> Option<Result<String, TransportError>> {
        match self.events.recv().await? {
            ScriptedEvent::Frame(frame) => Some(Ok(frame)),
            ScriptedEvent::Close => None,
            ScriptedEvent::Error(reason) => Some(Err(TransportError::Stream(reason))),
        }
    }

    async fn close(&mut self) {
        self.events.close();
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        state.closed += 1;
    }
}
