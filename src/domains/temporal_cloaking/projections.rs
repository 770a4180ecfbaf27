use super::aggregate::CloakingOutcome;
use geojson::{feature::Id, Feature, JsonObject};
use serde_json::json;

pub fn outcome_features(outcome: &CloakingOutcome) -> Vec<Feature> {
    let mut features: Vec<Feature> = outcome
        .steps
        .iter()
        .zip(&outcome.counts)
        .enumerate()
        .map(|(step, (bounds, count))| {
            make_feature(
                format!("temporal:step:{}", step),
                bounds.to_geometry(),
                json!({ "kind": "step", "step": step, "vehicles": count }),
            )
        })
        .collect();

    features.push(make_feature(
        "temporal:disclosed".to_string(),
        outcome.disclosed.to_geometry(),
        json!({ "kind": "disclosed", "ego_vehicle": outcome.ego_vehicle }),
    ));
    features
}

fn make_feature(id: String, geometry: geojson::Geometry, properties: serde_json::Value) -> Feature {
    let properties: Option<JsonObject> = properties.as_object().cloned();
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: Some(Id::String(id)),
        properties,
        foreign_members: None,
    }
}
