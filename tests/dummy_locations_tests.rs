use cloakscope::domains::dummy_locations::*;
use geojson::feature::Id;
use geojson::Value;
use serde_json::json;

fn movement_dump() -> String {
    json!([{
        "R_No": "r1",
        "Birth_Date": 1700000000.0,
        "No_of_Nodes": 2,
        "Used_Freq": 1,
        "Node_List": [
            { "x": 48.74, "y": 9.10, "parent_id": "r1" },
            { "x": 48.75, "y": 9.11, "parent_id": "r1" }
        ]
    }])
    .to_string()
}

fn dummy_dump(current: usize) -> String {
    json!([{
        "D_No": "d7",
        "Birth_Date": 1700000100.0,
        "No_of_Nodes": 2,
        "Used_Freq": 3,
        "Node_List": [
            { "x": 48.70, "y": 9.00, "parent_id": "r1" },
            { "x": 48.71, "y": 9.01, "parent_id": "r1" }
        ],
        "Curr_Node": current
    }])
    .to_string()
}

#[test]
fn test_storage_dumps_decode() {
    let movements = decode_user_movements(&movement_dump()).unwrap();
    assert_eq!(movements[0].record_no, "r1");
    assert_eq!(movements[0].nodes.len(), 2);

    let dummies = decode_dummies(&dummy_dump(1)).unwrap();
    assert_eq!(dummies[0].current().unwrap().x, 48.71);

    let info = decode_visualization_info(r#"{"logs":[{"timestamp":1.5,"location":{"x":48.7,"y":9.0}}]}"#).unwrap();
    assert_eq!(info.logs[0].timestamp, 1.5);

    assert!(decode_dummies(r#"[{"D_No":"d1"}]"#).is_err());
}

#[test]
fn test_dumps_replace_previous_ones() {
    let mut state = DummyLocationsState::new();
    let movements = decode_user_movements(&movement_dump()).unwrap();

    assert!(state.handle_user_movements(movements.clone()).changed);
    assert!(!state.handle_user_movements(movements).changed);
    assert!(state.handle_user_movements(Vec::new()).changed);
    assert!(state.user_movements.is_empty());

    let info = decode_visualization_info(r#"{"logs":[{"timestamp":1.0,"location":{"x":48.7,"y":9.0}}]}"#).unwrap();
    assert!(state.handle_visualization_info(info).changed);
    assert!(state.clear_logs().changed);
    assert!(!state.clear_logs().changed);
}

#[test]
fn test_dangling_current_node_is_reported() {
    let mut state = DummyLocationsState::new();
    let outcome = state.handle_dummies(decode_dummies(&dummy_dump(5)).unwrap());

    assert!(outcome.changed);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(state.dummies.len(), 1);
    // no node is flagged as current
    assert!(dummy_points(&state)
        .iter()
        .all(|f| f.property("current") == Some(&json!(false))));
}

#[test]
fn test_points_use_longitude_first() {
    let mut state = DummyLocationsState::new();
    state.handle_dummies(decode_dummies(&dummy_dump(1)).unwrap());

    let points = dummy_points(&state);
    assert_eq!(points.len(), 2);
    match &points[1].geometry.as_ref().unwrap().value {
        Value::Point(position) => assert_eq!(position, &vec![9.01, 48.71]),
        other => panic!("Expected point, got {:?}", other),
    }
    assert_eq!(points[1].id, Some(Id::String("dummy:dummy:d7:1".to_string())));
    assert_eq!(points[1].property("current"), Some(&json!(true)));
    assert_eq!(points[0].property("group"), Some(&json!("d7")));
}

#[test]
fn test_layers_select_features() {
    let mut state = DummyLocationsState::new();
    state.handle_user_movements(decode_user_movements(&movement_dump()).unwrap());
    state.handle_dummies(decode_dummies(&dummy_dump(0)).unwrap());
    state.handle_visualization_info(
        decode_visualization_info(r#"{"logs":[{"timestamp":1.0,"location":{"x":48.7,"y":9.0}}]}"#).unwrap(),
    );

    assert_eq!(layer_features(&state, &DummyLayers::default()).len(), 1);

    let all = DummyLayers {
        location_server_logs: true,
        user_movements: true,
        dummies: true,
    };
    assert_eq!(layer_features(&state, &all).len(), 5);
    assert_eq!(user_movement_points(&state).len(), 2);
    assert_eq!(log_points(&state).len(), 1);
}
