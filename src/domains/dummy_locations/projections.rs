use super::aggregate::DummyLocationsState;
use super::events::{LocationNode, NodeLocation};
use geojson::{feature::Id, Feature, Geometry, Value};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Which dumps end up on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DummyLayers {
    pub location_server_logs: bool,
    pub user_movements: bool,
    pub dummies: bool,
}

impl Default for DummyLayers {
    fn default() -> Self {
        Self {
            location_server_logs: true,
            user_movements: false,
            dummies: false,
        }
    }
}

fn point(id: String, location: NodeLocation, properties: serde_json::Value) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![location.y, location.x]))),
        id: Some(Id::String(id)),
        properties: properties.as_object().cloned(),
        foreign_members: None,
    }
}

/// What the location based service saw, one point per request.
pub fn log_points(state: &DummyLocationsState) -> Vec<Feature> {
    state
        .location_server_logs
        .iter()
        .enumerate()
        .map(|(i, item)| {
            point(
                format!("dummy:log:{}", i),
                item.location,
                json!({ "kind": "log", "timestamp": item.timestamp }),
            )
        })
        .collect()
}

fn node_points<'a>(kind: &str, group: &str, nodes: &'a [LocationNode], current: Option<usize>) -> impl Iterator<Item = Feature> + 'a {
    let kind = kind.to_string();
    let group = group.to_string();
    nodes.iter().enumerate().map(move |(i, node)| {
        point(
            format!("dummy:{}:{}:{}", kind, group, i),
            node.location(),
            json!({
                "kind": kind,
                "group": group,
                "parent_id": node.parent_id,
                "current": current == Some(i),
            }),
        )
    })
}

/// Nodes of the user movement storage; `group` tells the records apart.
pub fn user_movement_points(state: &DummyLocationsState) -> Vec<Feature> {
    state
        .user_movements
        .iter()
        .flat_map(|m| node_points("movement", &m.record_no, &m.nodes, None))
        .collect()
}

/// Nodes of the dummy storage; the node each dummy currently reports is flagged.
pub fn dummy_points(state: &DummyLocationsState) -> Vec<Feature> {
    state
        .dummies
        .iter()
        .flat_map(|d| node_points("dummy", &d.dummy_no, &d.nodes, Some(d.current_node)))
        .collect()
}

pub fn layer_features(state: &DummyLocationsState, layers: &DummyLayers) -> Vec<Feature> {
    let mut features = Vec::new();
    if layers.location_server_logs {
        features.extend(log_points(state));
    }
    if layers.user_movements {
        features.extend(user_movement_points(state));
    }
    if layers.dummies {
        features.extend(dummy_points(state));
    }
    features
}
