use crate::common::{decode_frame, DomainResult};
use serde::{Deserialize, Serialize};

/// Position as reported by the dummy-locations services: `x` is the
/// latitude, `y` the longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeLocation {
    pub x: f64,
    pub y: f64,
}

/// One request the location based service received; what it can see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogItem {
    pub timestamp: f64,
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationNode {
    pub x: f64,
    pub y: f64,
    pub parent_id: String,
}

impl LocationNode {
    pub fn location(&self) -> NodeLocation {
        NodeLocation { x: self.x, y: self.y }
    }
}

/// Element of the user movement storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMovement {
    #[serde(rename = "R_No")]
    pub record_no: String,
    /// Seconds since the epoch.
    #[serde(rename = "Birth_Date")]
    pub birth_date: f64,
    #[serde(rename = "No_of_Nodes")]
    pub node_count: u32,
    #[serde(rename = "Used_Freq")]
    pub used_frequency: u32,
    #[serde(rename = "Node_List")]
    pub nodes: Vec<LocationNode>,
}

/// Element of the dummy storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dummy {
    #[serde(rename = "D_No")]
    pub dummy_no: String,
    #[serde(rename = "Birth_Date")]
    pub birth_date: f64,
    #[serde(rename = "No_of_Nodes")]
    pub node_count: u32,
    #[serde(rename = "Used_Freq")]
    pub used_frequency: u32,
    #[serde(rename = "Node_List")]
    pub nodes: Vec<LocationNode>,
    /// Index into `nodes` of the position currently reported for the dummy.
    #[serde(rename = "Curr_Node")]
    pub current_node: usize,
}

impl Dummy {
    pub fn current(&self) -> Option<&LocationNode> {
        self.nodes.get(self.current_node)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationInfo {
    pub logs: Vec<LogItem>,
}

/// Body of the location based service's `visualization_info` response.
pub fn decode_visualization_info(body: &str) -> DomainResult<VisualizationInfo> {
    decode_frame(body)
}

/// Body of the `user_movement_storage` dump.
pub fn decode_user_movements(body: &str) -> DomainResult<Vec<UserMovement>> {
    decode_frame(body)
}

/// Body of the `dummy_storage` dump.
pub fn decode_dummies(body: &str) -> DomainResult<Vec<Dummy>> {
    decode_frame(body)
}
