use crate::common::{DomainResult, ObserverMessage};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Speed {
    pub velocity_x: f64,
    pub velocity_y: f64,
}

/// A raw GPS sample as produced by the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsSample {
    pub id: String,
    pub time: f64,
    pub speed: Speed,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalVehicleEntry {
    pub id: String,
    /// Last time the uncertainty exceeded the threshold.
    pub last_confusion_time: f64,
    pub current_gps_sample: GpsSample,
    pub predicted_loc: Location,
    /// Last sample the server decided to publish.
    #[serde(default)]
    pub last_visible: Option<GpsSample>,
    /// k nearest of all entries in the interval.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// k nearest of the published entries in the interval.
    #[serde(default)]
    pub neighbors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseEntry {
    pub created_at_time: f64,
    pub vehicle_entry: IntervalVehicleEntry,
    #[serde(default)]
    pub uncertainty_interval: Option<f64>,
    #[serde(default)]
    pub uncertainty_release_set: Option<f64>,
    pub is_in_release_set: bool,
}

impl ReleaseEntry {
    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_entry.id
    }

    pub fn key(&self) -> ReleaseKey {
        ReleaseKey {
            created_at_time: self.created_at_time,
            vehicle_id: self.vehicle_entry.id.clone(),
        }
    }

    pub fn has_key(&self, key: &ReleaseKey) -> bool {
        self.created_at_time == key.created_at_time && self.vehicle_entry.id == key.vehicle_id
    }
}

/// Identifies one release entry: a vehicle in one release interval.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseKey {
    pub created_at_time: f64,
    pub vehicle_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmSettings {
    pub update_rate: f64,
    pub time_interval: f64,
    pub uncertainty_threshold: f64,
    pub confusion_timeout: f64,
    pub t_guard: f64,
    pub trip_timeout: f64,
    pub mue: f64,
    pub k_anonymity: u32,
    pub apply_sensitive_location_cloaking_extension: bool,
    pub apply_windowing_extension: bool,
}

/// Messages published by the path confusion server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PathConfusionMessage {
    #[serde(rename = "MsgServerObserverAvailableRecordings")]
    AvailableRecordings {
        #[serde(rename = "fileNames")]
        file_names: Vec<String>,
    },
    #[serde(rename = "MsgServerObserverSettingsUpdate")]
    SettingsUpdate {
        settings: AlgorithmSettings,
        #[serde(rename = "isLive")]
        is_live: bool,
    },
    #[serde(rename = "MsgServerClientReleaseUpdate")]
    ReleaseUpdate {
        #[serde(rename = "releaseStore")]
        release_store: Vec<ReleaseEntry>,
    },
    #[serde(rename = "MsgServerObserverVehicles")]
    Vehicles {
        #[serde(rename = "availableVehicles")]
        available_vehicles: Vec<String>,
        #[serde(rename = "relevantVehicles")]
        relevant_vehicles: Vec<String>,
    },
    #[serde(rename = "MsgServerActionComplete")]
    ActionComplete,
    #[serde(other)]
    Unknown,
}

impl ObserverMessage for PathConfusionMessage {
    fn message_type(&self) -> &'static str {
        match self {
            PathConfusionMessage::AvailableRecordings { .. } => "MsgServerObserverAvailableRecordings",
            PathConfusionMessage::SettingsUpdate { .. } => "MsgServerObserverSettingsUpdate",
            PathConfusionMessage::ReleaseUpdate { .. } => "MsgServerClientReleaseUpdate",
            PathConfusionMessage::Vehicles { .. } => "MsgServerObserverVehicles",
            PathConfusionMessage::ActionComplete => "MsgServerActionComplete",
            PathConfusionMessage::Unknown => "Unknown",
        }
    }

    fn is_recognized(&self) -> bool {
        !matches!(self, PathConfusionMessage::Unknown)
    }
}

/// Commands the observer sends to the server's command endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObserverCommand {
    /// Store the current live session as a recording.
    #[serde(rename = "MsgObserverServerAddRecording")]
    AddRecording { name: String },
    #[serde(rename = "MsgObserverServerReset")]
    Reset,
    #[serde(rename = "MsgObserverServerGoLive")]
    GoLive,
    #[serde(rename = "MsgObserverServerLoadRecording")]
    LoadRecording { recording_file_name: String },
    #[serde(rename = "MsgObserverServerDeleteRecording")]
    DeleteRecording { recording_file_name: String },
}

impl ObserverCommand {
    pub fn to_frame(&self) -> DomainResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
