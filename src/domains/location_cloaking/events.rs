use super::granule::{GranuleId, GridPlane};
use crate::common::ObserverMessage;
use serde::{Deserialize, Serialize};

/// Messages published by the location server on `/observe`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LocationServerMessage {
    /// Grid plane established for this connection.
    #[serde(rename = "MsgInitComplete")]
    InitComplete {
        #[serde(rename = "planeData")]
        plane_data: PlaneData,
    },
    /// Authoritative snapshot of the tracked users, sent once per connection.
    #[serde(rename = "MsgSync")]
    Sync { users: Vec<SyncUser> },
    #[serde(rename = "MsgIncrementalUpdate")]
    IncrementalUpdate(IncrementalUpdate),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaneData {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl From<&PlaneData> for GridPlane {
    fn from(p: &PlaneData) -> Self {
        GridPlane::new(p.lon_min, p.lon_max, p.lat_min, p.lat_max)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GranuleList {
    pub granules: Vec<GranuleId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleGranule {
    pub granule: GranuleId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VicinityShape {
    pub radius: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Granularity {
    pub encrypted_vicinity: GranuleList,
    pub encrypted_location: SingleGranule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncUser {
    pub alias: Vec<String>,
    pub level: u32,
    /// Ordered shallowest to deepest.
    pub granularities: Vec<Granularity>,
    pub vicinity_shape: VicinityShape,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncrementalUpdate {
    pub alias: Vec<String>,
    pub level: u32,
    pub new_location: SingleGranule,
    pub vicinity_insert: GranuleList,
    pub vicinity_delete: GranuleList,
    pub vicinity_shape: VicinityShape,
}

/// Aliases arrive as one-element arrays; the first element is the agent key.
pub fn primary_alias(alias: &[String]) -> Option<&str> {
    alias.first().map(String::as_str).filter(|a| !a.is_empty())
}

impl ObserverMessage for LocationServerMessage {
    fn message_type(&self) -> &'static str {
        match self {
            LocationServerMessage::InitComplete { .. } => "MsgInitComplete",
            LocationServerMessage::Sync { .. } => "MsgSync",
            LocationServerMessage::IncrementalUpdate(_) => "MsgIncrementalUpdate",
            LocationServerMessage::Unknown => "Unknown",
        }
    }

    fn subject(&self) -> Option<&str> {
        match self {
            LocationServerMessage::IncrementalUpdate(update) => primary_alias(&update.alias),
            _ => None,
        }
    }

    fn is_recognized(&self) -> bool {
        !matches!(self, LocationServerMessage::Unknown)
    }
}
