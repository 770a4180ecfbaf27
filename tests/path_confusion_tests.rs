use cloakscope::adapters::outbound::{init_noop_logger, MemoryLogger};
use cloakscope::common::{FrameOutcome, Reconciler};
use cloakscope::domains::path_confusion::*;
use geojson::Value as GeoValue;
use serde_json::{json, Value};

fn release(id: &str, t: f64, lat: f64, lon: f64, published: bool, deps: &[&str], neighbors: &[&str]) -> Value {
    json!({
        "createdAtTime": t,
        "vehicleEntry": {
            "id": id,
            "lastConfusionTime": t - 2.0,
            "currentGpsSample": {
                "id": id,
                "time": t,
                "speed": { "velocityX": 1.0, "velocityY": 0.0 },
                "location": { "longitude": lon, "latitude": lat }
            },
            "predictedLoc": { "longitude": lon + 0.001, "latitude": lat },
            "lastVisible": null,
            "dependencies": deps,
            "neighbors": neighbors
        },
        "uncertaintyInterval": null,
        "uncertaintyReleaseSet": 0.4,
        "isInReleaseSet": published
    })
}

fn release_frame(entries: Vec<Value>) -> String {
    json!({ "type": "MsgServerClientReleaseUpdate", "releaseStore": entries }).to_string()
}

fn settings_frame(is_live: bool, k: u32) -> String {
    json!({
        "type": "MsgServerObserverSettingsUpdate",
        "isLive": is_live,
        "settings": {
            "updateRate": 1.0,
            "timeInterval": 1.0,
            "uncertaintyThreshold": 0.4,
            "confusionTimeout": 10.0,
            "tGuard": 2.0,
            "tripTimeout": 30.0,
            "mue": 0.5,
            "kAnonymity": k,
            "applySensitiveLocationCloakingExtension": false,
            "applyWindowingExtension": true
        }
    })
    .to_string()
}

fn reconciler() -> Reconciler<PathConfusionState> {
    Reconciler::new(init_noop_logger())
}

fn times(state: &PathConfusionState) -> Vec<(f64, String)> {
    state
        .release_entries
        .iter()
        .map(|e| (e.created_at_time, e.vehicle_id().to_string()))
        .collect()
}

#[test]
fn test_release_entries_are_kept_in_time_order() {
    let mut r = reconciler();
    r.handle_frame(&release_frame(vec![
        release("CARLA-2", 2.0, 9.1, 48.7, true, &[], &[]),
        release("CARLA-1", 1.0, 9.1, 48.7, true, &[], &[]),
    ]));
    r.handle_frame(&release_frame(vec![release("CARLA-1", 1.5, 9.1, 48.7, false, &[], &[])]));

    assert_eq!(
        times(r.state()),
        vec![
            (1.0, "CARLA-1".to_string()),
            (1.5, "CARLA-1".to_string()),
            (2.0, "CARLA-2".to_string())
        ]
    );
}

#[test]
fn test_release_update_replaces_known_entries() {
    let mut r = reconciler();
    r.handle_frame(&release_frame(vec![release("CARLA-1", 1.0, 9.1, 48.7, false, &[], &[])]));

    let outcome = r.handle_frame(&release_frame(vec![release("CARLA-1", 1.0, 9.1, 48.7, true, &[], &[])]));

    assert_eq!(outcome, FrameOutcome::Changed);
    assert_eq!(r.state().release_entries.len(), 1);
    assert!(r.state().release_entries[0].is_in_release_set);

    let again = r.handle_frame(&release_frame(vec![release("CARLA-1", 1.0, 9.1, 48.7, true, &[], &[])]));
    assert_eq!(again, FrameOutcome::Unchanged);
}

#[test]
fn test_switching_live_mode_clears_release_log() {
    let mut r = reconciler();
    r.handle_frame(&settings_frame(true, 3));
    r.handle_frame(&release_frame(vec![release("CARLA-1", 1.0, 9.1, 48.7, true, &[], &[])]));

    // same mode, new settings: log stays
    r.handle_frame(&settings_frame(true, 4));
    assert_eq!(r.state().release_entries.len(), 1);
    assert_eq!(r.state().settings.as_ref().unwrap().k_anonymity, 4);

    r.handle_frame(&settings_frame(false, 4));
    assert!(r.state().release_entries.is_empty());
    assert_eq!(r.state().is_live, Some(false));
}

#[test]
fn test_recordings_and_vehicles_are_replaced() {
    let mut r = reconciler();
    r.handle_frame(
        &json!({ "type": "MsgServerObserverAvailableRecordings", "fileNames": ["a.json", "b.json"] }).to_string(),
    );
    r.handle_frame(
        &json!({
            "type": "MsgServerObserverVehicles",
            "availableVehicles": ["CARLA-1", "CARLA-2"],
            "relevantVehicles": ["CARLA-2"]
        })
        .to_string(),
    );
    r.handle_frame(
        &json!({ "type": "MsgServerObserverAvailableRecordings", "fileNames": ["b.json"] }).to_string(),
    );

    assert_eq!(r.state().available_recordings, vec!["b.json".to_string()]);
    assert_eq!(r.state().relevant_vehicles, vec!["CARLA-2".to_string()]);
}

#[test]
fn test_action_complete_and_unknown_messages() {
    let logger = MemoryLogger::new();
    let mut r: Reconciler<PathConfusionState> = Reconciler::new(logger.clone());

    assert_eq!(
        r.handle_frame(&json!({ "type": "MsgServerActionComplete" }).to_string()),
        FrameOutcome::Unchanged
    );
    assert_eq!(
        r.handle_frame(&json!({ "type": "MsgServerSomethingElse" }).to_string()),
        FrameOutcome::Ignored
    );
    assert_eq!(logger.warnings().len(), 1);
}

#[test]
fn test_observer_commands_serialize_with_type_tag() {
    assert_eq!(
        serde_json::to_value(ObserverCommand::LoadRecording {
            recording_file_name: "drive.json".to_string()
        })
        .unwrap(),
        json!({ "type": "MsgObserverServerLoadRecording", "recording_file_name": "drive.json" })
    );
    assert_eq!(
        serde_json::to_value(ObserverCommand::AddRecording { name: "drive".to_string() }).unwrap(),
        json!({ "type": "MsgObserverServerAddRecording", "name": "drive" })
    );
    assert_eq!(
        ObserverCommand::Reset.to_frame().unwrap(),
        r#"{"type":"MsgObserverServerReset"}"#
    );
}

#[test]
fn test_related_entries_come_from_same_interval() {
    let mut r = reconciler();
    r.handle_frame(&release_frame(vec![
        release("CARLA-1", 1.0, 9.10, 48.70, true, &["CARLA-2", "CARLA-3"], &["CARLA-3"]),
        release("CARLA-2", 1.0, 9.11, 48.71, false, &[], &[]),
        release("CARLA-3", 1.0, 9.12, 48.72, true, &[], &[]),
        release("CARLA-2", 2.0, 9.13, 48.73, true, &[], &[]),
    ]));
    let state = r.state();
    let selected = &state.release_entries[0];

    let deps: Vec<&str> = related_entries(state, selected, Relation::Dependencies)
        .iter()
        .map(|e| e.vehicle_id())
        .collect();
    assert_eq!(deps, vec!["CARLA-2", "CARLA-3"]);
    assert!(related_entries(state, selected, Relation::Dependencies)
        .iter()
        .all(|e| e.created_at_time == 1.0));

    let neighbors = related_points(state, selected, Relation::Neighbors);
    assert_eq!(neighbors.len(), 1);
}

#[test]
fn test_trajectories_and_release_points() {
    let mut r = reconciler();
    r.handle_frame(&release_frame(vec![
        release("CARLA-1", 1.0, 9.10, 48.70, true, &[], &[]),
        release("CARLA-1", 2.0, 9.11, 48.71, false, &[], &[]),
        release("CARLA-2", 1.0, 9.20, 48.80, true, &[], &[]),
    ]));
    let state = r.state();

    let routes = trajectories(state);
    assert_eq!(routes.len(), 1);
    match &routes[0].geometry.as_ref().unwrap().value {
        GeoValue::LineString(points) => {
            assert_eq!(points, &vec![vec![9.10, 48.70], vec![9.11, 48.71]])
        }
        other => panic!("Expected LineString, got {:?}", other),
    }

    let selected = state.release_entries[0].clone();
    let points = release_points(state, Some(&selected));
    assert_eq!(points.len(), 3);
    let significant: Vec<bool> = points
        .iter()
        .map(|f| f.property("significant") == Some(&json!(true)))
        .collect();
    assert_eq!(significant.iter().filter(|s| **s).count(), 2);
    assert_eq!(points[0].property("selected"), Some(&json!(true)));
    assert_eq!(points[0].property("vehicle_number"), Some(&json!(1)));

    assert_eq!(entry_index(state, &state.release_entries[2]), Some(1));
}

#[test]
fn test_confusion_time_left() {
    let mut r = reconciler();
    r.handle_frame(&settings_frame(true, 3));
    r.handle_frame(&release_frame(vec![release("CARLA-1", 5.0, 9.1, 48.7, true, &[], &[])]));
    let state = r.state();

    // last confusion at 3.0, timeout 10.0
    let left = confusion_time_left(state.settings.as_ref().unwrap(), &state.release_entries[0]);
    assert_eq!(left, 8.0);
}
