use cloakscope::adapters::inbound::{ChannelConnector, ScriptedEvent};
use cloakscope::adapters::outbound::init_noop_logger;
use cloakscope::application::*;
use cloakscope::common::{StreamConnector, TransportError};
use cloakscope::domains::location_cloaking::*;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::time::{Duration, Instant};

const DELAY: Duration = Duration::from_millis(4000);

#[derive(Default)]
struct RecordingObserver {
    status: Mutex<Vec<(Instant, bool)>>,
    changes: Mutex<usize>,
}

impl CloakingObserver for RecordingObserver {
    fn on_reconciled_state_change(&self, _agents: &HashMap<String, GridAgent>, _plane: Option<&GridPlane>) {
        *self.changes.lock().unwrap() += 1;
    }

    fn on_connection_status_change(&self, online: bool) {
        self.status.lock().unwrap().push((Instant::now(), online));
    }
}

fn plane_frame() -> String {
    json!({
        "type": "MsgInitComplete",
        "planeData": { "lonMin": 0.0, "lonMax": 4.0, "latMin": 0.0, "latMax": 4.0 }
    })
    .to_string()
}

fn sync_frame(alias: &str, position: i64) -> String {
    json!({
        "type": "MsgSync",
        "users": [{
            "alias": [alias],
            "level": 0,
            "granularities": [{
                "encryptedVicinity": { "granules": [position] },
                "encryptedLocation": { "granule": position }
            }],
            "vicinityShape": { "radius": 0.1 }
        }]
    })
    .to_string()
}

fn spawn(
    connector: &ChannelConnector,
    observer: Arc<RecordingObserver>,
) -> SupervisorHandle<LocationCloakingService> {
    let service = LocationCloakingService::new(init_noop_logger(), TileColors::default()).with_observer(observer);
    let connector: Arc<dyn StreamConnector> = Arc::new(connector.clone());
    ConnectionSupervisor::spawn(
        SupervisorSettings::new("ws://127.0.0.1:8000/observe").with_reconnect_delay(DELAY),
        connector,
        service,
    )
}

#[tokio::test(start_paused = true)]
async fn test_reconnects_after_fixed_delay_and_resyncs() {
    let connector = ChannelConnector::new();
    let first = connector.script_frames([plane_frame(), sync_frame("alice", 1)]);
    let observer = Arc::new(RecordingObserver::default());
    let handle = spawn(&connector, observer.clone());

    let mut status = handle.subscribe();
    status
        .wait_for(|s| s.last_frame.map_or(false, |m| m.frame == 2))
        .await
        .unwrap();
    let first_connection = handle.status().last_frame.unwrap().connection;
    assert!(handle.is_connected());

    let _second = connector.script_frames([plane_frame(), sync_frame("alice", 3)]);
    let closed_at = Instant::now();
    first.send(ScriptedEvent::Close).unwrap();

    status
        .wait_for(|s| s.last_frame.map_or(false, |m| m.connection != first_connection && m.frame == 2))
        .await
        .unwrap();

    let attempts = connector.attempts();
    assert_eq!(attempts.len(), 2);
    assert!(attempts[1] - attempts[0] >= DELAY);

    {
        let events = observer.status.lock().unwrap();
        let online: Vec<bool> = events.iter().map(|(_, online)| *online).collect();
        assert_eq!(online, vec![true, false, true]);
        // offline is reported as soon as the stream closes
        assert!(events[1].0 - closed_at < Duration::from_millis(1));
    }

    let service = handle.shutdown().await.unwrap();
    assert_eq!(service.state().agent("alice").unwrap().position_granule, 3);
    assert_eq!(service.state().plane_epoch, 2);
    assert!(!service.is_online());
    assert_eq!(connector.closed(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_refused_connections_retry_without_backoff() {
    let connector = ChannelConnector::new();
    let handle = spawn(&connector, Arc::new(RecordingObserver::default()));

    tokio::time::sleep(Duration::from_millis(12_500)).await;

    let attempts = connector.attempts();
    assert_eq!(attempts.len(), 4);
    for pair in attempts.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= DELAY && gap < DELAY + Duration::from_millis(5), "gap {:?}", gap);
    }
    let status = handle.status();
    assert_eq!(status.phase, ConnectionPhase::Disconnected { retrying: true });
    match status.last_error {
        Some(TransportError::Connect(_)) => {}
        other => panic!("Expected connect error, got {:?}", other),
    }

    handle.shutdown().await.unwrap();
    assert_eq!(connector.closed(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stream_error_is_treated_like_close() {
    let connector = ChannelConnector::new();
    let first = connector.script_frames([plane_frame()]);
    let observer = Arc::new(RecordingObserver::default());
    let handle = spawn(&connector, observer.clone());

    let mut status = handle.subscribe();
    status.wait_for(|s| s.is_connected()).await.unwrap();
    first.send(ScriptedEvent::Error("connection reset".to_string())).unwrap();

    status
        .wait_for(|s| s.phase == ConnectionPhase::Disconnected { retrying: true })
        .await
        .unwrap();
    assert_eq!(
        handle.status().last_error,
        Some(TransportError::Stream("connection reset".to_string()))
    );
    assert_eq!(connector.closed(), 1);

    tokio::time::sleep(DELAY + Duration::from_millis(1)).await;
    assert_eq!(connector.attempts().len(), 2);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_closes_stream_once_and_stops_forwarding() {
    let connector = ChannelConnector::new();
    let stream = connector.script_frames([plane_frame(), sync_frame("alice", 1)]);
    let observer = Arc::new(RecordingObserver::default());
    let handle = spawn(&connector, observer.clone());

    let mut status = handle.subscribe();
    status
        .wait_for(|s| s.last_frame.map_or(false, |m| m.frame == 2))
        .await
        .unwrap();

    let service = handle.shutdown().await.unwrap();

    assert_eq!(connector.closed(), 1);
    assert!(stream.send(ScriptedEvent::Frame(sync_frame("alice", 2))).is_err());
    assert_eq!(service.state().agent("alice").unwrap().position_granule, 1);
    assert_eq!(*observer.changes.lock().unwrap(), 2);
    assert_eq!(connector.attempts().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_reconnect() {
    let connector = ChannelConnector::new();
    let handle = spawn(&connector, Arc::new(RecordingObserver::default()));

    let mut status = handle.subscribe();
    status
        .wait_for(|s| s.phase == ConnectionPhase::Disconnected { retrying: true })
        .await
        .unwrap();

    let start = Instant::now();
    handle.shutdown().await.unwrap();

    assert!(Instant::now() - start < DELAY);
    assert_eq!(connector.attempts().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_frame_keeps_connection_open() {
    let connector = ChannelConnector::new();
    let _stream = connector.script_frames(["{broken".to_string(), plane_frame()]);
    let handle = spawn(&connector, Arc::new(RecordingObserver::default()));

    let mut status = handle.subscribe();
    status
        .wait_for(|s| s.last_frame.map_or(false, |m| m.frame == 2))
        .await
        .unwrap();
    assert!(handle.is_connected());

    let service = handle.shutdown().await.unwrap();
    assert_eq!(service.reconciler().dropped(), 1);
    assert!(service.state().plane.is_some());
}
