use crate::common::{ApplicationError, ApplicationResult, Reconciler, ReconciledState, StreamConnector, TransportError};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use uuid::Uuid;

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(4000);

/// Receives everything a supervised connection produces, in order.
pub trait FrameSink: Send + 'static {
    fn on_frame(&mut self, frame: &str);

    fn on_connection_status(&mut self, online: bool);
}

impl<S: ReconciledState> FrameSink for Reconciler<S> {
    fn on_frame(&mut self, frame: &str) {
        self.handle_frame(frame);
    }

    fn on_connection_status(&mut self, online: bool) {
        let msg = if online { "connected" } else { "disconnected" };
        self.logger().info(S::COMPONENT, msg);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    /// `retrying` is false only before the first attempt and after shutdown.
    Disconnected { retrying: bool },
    Connecting,
    Connected,
}

/// Position of the last forwarded frame. Frame numbers restart with every
/// connection, which gets a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceMarker {
    pub connection: Uuid,
    pub frame: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionState {
    pub phase: ConnectionPhase,
    pub attempts: u64,
    pub last_frame: Option<SequenceMarker>,
    pub last_error: Option<TransportError>,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self {
            phase: ConnectionPhase::Disconnected { retrying: false },
            attempts: 0,
            last_frame: None,
            last_error: None,
        }
    }
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        self.phase == ConnectionPhase::Connected
    }
}

#[derive(Debug, Clone)]
pub struct SupervisorSettings {
    pub endpoint: String,
    pub reconnect_delay: Duration,
}

impl SupervisorSettings {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}

/// Keeps one stream subscription alive: connect, forward frames, and after
/// any closure wait a fixed delay and connect again. Runs as a single task
/// that owns the sink.
pub struct ConnectionSupervisor<K: FrameSink> {
    settings: SupervisorSettings,
    connector: Arc<dyn StreamConnector>,
    sink: K,
    status: watch::Sender<ConnectionState>,
    shutdown: watch::Receiver<bool>,
}

/// Resolves once shutdown was requested or the handle is gone.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

impl<K: FrameSink> ConnectionSupervisor<K> {
    pub fn spawn(settings: SupervisorSettings, connector: Arc<dyn StreamConnector>, sink: K) -> SupervisorHandle<K> {
        let (status_tx, status_rx) = watch::channel(ConnectionState::default());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let supervisor = Self {
            settings,
            connector,
            sink,
            status: status_tx,
            shutdown: shutdown_rx,
        };
        let task = tokio::spawn(supervisor.run());

        SupervisorHandle {
            status: status_rx,
            shutdown: shutdown_tx,
            task,
        }
    }

    fn set_phase(&self, phase: ConnectionPhase) {
        self.status.send_modify(|s| s.phase = phase);
    }

    async fn run(mut self) -> K {
        let endpoint = self.settings.endpoint.clone();

        loop {
            self.status.send_modify(|s| {
                s.phase = ConnectionPhase::Connecting;
                s.attempts += 1;
            });

            let attempt = tokio::select! {
                biased;
                _ = shutdown_requested(&mut self.shutdown) => break,
                result = self.connector.connect(&endpoint) => result,
            };

            match attempt {
                Ok(mut stream) => {
                    let connection = Uuid::new_v4();
                    tracing::info!("connected to {} ({})", endpoint, connection);
                    self.status.send_modify(|s| {
                        s.phase = ConnectionPhase::Connected;
                        s.last_error = None;
                    });
                    self.sink.on_connection_status(true);

                    let stop = self.forward_frames(stream.as_mut(), connection).await;
                    stream.close().await;

                    self.set_phase(ConnectionPhase::Disconnected { retrying: !stop });
                    self.sink.on_connection_status(false);
                    if stop {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("connection to {} failed: {}", endpoint, e);
                    self.status.send_modify(|s| {
                        s.phase = ConnectionPhase::Disconnected { retrying: true };
                        s.last_error = Some(e);
                    });
                }
            }

            tracing::debug!("reconnecting to {} in {:?}", endpoint, self.settings.reconnect_delay);
            tokio::select! {
                biased;
                _ = shutdown_requested(&mut self.shutdown) => break,
                _ = sleep(self.settings.reconnect_delay) => {}
            }
        }

        self.set_phase(ConnectionPhase::Disconnected { retrying: false });
        tracing::info!("supervisor for {} stopped", endpoint);
        self.sink
    }

    /// Forward frames until the stream ends. Returns true if it stopped
    /// because shutdown was requested.
    async fn forward_frames(&mut self, stream: &mut dyn crate::common::FrameStream, connection: Uuid) -> bool {
        let mut frame = 0u64;
        loop {
            let next = tokio::select! {
                biased;
                _ = shutdown_requested(&mut self.shutdown) => return true,
                next = stream.next_frame() => next,
            };

            match next {
                Some(Ok(text)) => {
                    frame += 1;
                    self.sink.on_frame(&text);
                    self.status
                        .send_modify(|s| s.last_frame = Some(SequenceMarker { connection, frame }));
                }
                Some(Err(e)) => {
                    tracing::warn!("stream {} failed: {}", connection, e);
                    self.status.send_modify(|s| s.last_error = Some(e));
                    return false;
                }
                None => {
                    tracing::info!("stream {} closed by server", connection);
                    return false;
                }
            }
        }
    }
}

/// Owner side of a running supervisor. Dropping it stops the supervisor too.
pub struct SupervisorHandle<K> {
    status: watch::Receiver<ConnectionState>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<K>,
}

impl<K> SupervisorHandle<K> {
    pub fn status(&self) -> ConnectionState {
        self.status.borrow().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.status.borrow().is_connected()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.status.clone()
    }

    /// Stop forwarding, close the open stream, cancel a pending reconnect and
    /// hand the sink back.
    pub async fn shutdown(self) -> ApplicationResult<K> {
        let _ = self.shutdown.send(true);
        self.task
            .await
            .map_err(|e| ApplicationError::Task(e.to_string()))
    }
}
