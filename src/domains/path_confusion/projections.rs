use super::aggregate::PathConfusionState;
use super::events::{AlgorithmSettings, Location, ReleaseEntry};
use crate::domains::fleet::vehicle_number;
use geojson::{feature::Id, Feature, Geometry, JsonObject, Value};
use serde_json::json;
use std::collections::BTreeMap;

/// Which k-nearest list of a selected entry to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Relation {
    #[default]
    Dependencies,
    Neighbors,
}

/// Map position of a reported location. The server reports the east-west
/// axis under `latitude`.
pub fn map_position(location: &Location) -> Vec<f64> {
    vec![location.latitude, location.longitude]
}

fn feature(id: Option<String>, geometry: Value, properties: serde_json::Value) -> Feature {
    let properties: Option<JsonObject> = match properties {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    };
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geometry)),
        id: id.map(Id::String),
        properties,
        foreign_members: None,
    }
}

/// One line string per vehicle through its released samples, in time order.
/// Vehicles with a single sample have no trajectory yet.
pub fn trajectories(state: &PathConfusionState) -> Vec<Feature> {
    let mut routes: BTreeMap<&str, Vec<Vec<f64>>> = BTreeMap::new();
    for entry in &state.release_entries {
        routes
            .entry(entry.vehicle_id())
            .or_default()
            .push(map_position(&entry.vehicle_entry.current_gps_sample.location));
    }

    routes
        .into_iter()
        .filter(|(_, points)| points.len() >= 2)
        .map(|(vehicle, points)| {
            feature(
                Some(format!("trajectory:{}", vehicle)),
                Value::LineString(points),
                json!({ "vehicle": vehicle, "vehicle_number": vehicle_number(vehicle) }),
            )
        })
        .collect()
}

/// Every release entry as a point. With a selection, entries from other
/// intervals are flagged as not significant.
pub fn release_points(state: &PathConfusionState, selected: Option<&ReleaseEntry>) -> Vec<Feature> {
    state
        .release_entries
        .iter()
        .map(|entry| {
            let significant = selected.map_or(true, |s| s.created_at_time == entry.created_at_time);
            feature(
                Some(format!("release:{}:{}", entry.vehicle_id(), entry.created_at_time)),
                Value::Point(map_position(&entry.vehicle_entry.current_gps_sample.location)),
                json!({
                    "vehicle": entry.vehicle_id(),
                    "vehicle_number": vehicle_number(entry.vehicle_id()),
                    "created_at_time": entry.created_at_time,
                    "published": entry.is_in_release_set,
                    "significant": significant,
                    "selected": selected.is_some_and(|s| s.has_key(&entry.key())),
                }),
            )
        })
        .collect()
}

/// Entries of the selected entry's dependencies or neighbors released in the
/// same interval. Ids without an entry in that interval are left out.
pub fn related_entries<'a>(
    state: &'a PathConfusionState,
    selected: &ReleaseEntry,
    relation: Relation,
) -> Vec<&'a ReleaseEntry> {
    let ids = match relation {
        Relation::Dependencies => &selected.vehicle_entry.dependencies,
        Relation::Neighbors => &selected.vehicle_entry.neighbors,
    };
    ids.iter()
        .filter_map(|id| {
            state
                .release_entries
                .iter()
                .find(|e| e.vehicle_id() == id && e.created_at_time == selected.created_at_time)
        })
        .collect()
}

pub fn related_points(state: &PathConfusionState, selected: &ReleaseEntry, relation: Relation) -> Vec<Feature> {
    related_entries(state, selected, relation)
        .into_iter()
        .map(|entry| {
            feature(
                None,
                Value::Point(map_position(&entry.vehicle_entry.current_gps_sample.location)),
                json!({ "vehicle": entry.vehicle_id() }),
            )
        })
        .collect()
}

pub fn predicted_point(entry: &ReleaseEntry) -> Feature {
    feature(
        None,
        Value::Point(map_position(&entry.vehicle_entry.predicted_loc)),
        json!({ "vehicle": entry.vehicle_id(), "kind": "predicted" }),
    )
}

/// Position of `entry` among its vehicle's entries.
pub fn entry_index(state: &PathConfusionState, entry: &ReleaseEntry) -> Option<usize> {
    let key = entry.key();
    state.entries_of(entry.vehicle_id()).position(|e| e.has_key(&key))
}

/// Time left until the vehicle's confusion timeout expires, relative to the
/// entry's interval.
pub fn confusion_time_left(settings: &AlgorithmSettings, entry: &ReleaseEntry) -> f64 {
    entry.vehicle_entry.last_confusion_time + settings.confusion_timeout - entry.created_at_time
}
