use crate::common::ObserverMessage;
use serde::{Deserialize, Serialize};

/// Simulator coordinates: `x` is latitude, `y` is longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimLocation {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetVehicle {
    pub id: String,
    pub location: SimLocation,
    /// Degrees per meter at the vehicle's latitude.
    pub great_circle_distance_factor: f64,
}

impl FleetVehicle {
    /// Numeric suffix of simulator ids such as `CARLA-12`.
    pub fn vehicle_number(&self) -> Option<u32> {
        vehicle_number(&self.id)
    }
}

pub fn vehicle_number(id: &str) -> Option<u32> {
    id.rsplit_once('-').and_then(|(_, n)| n.parse().ok())
}

/// One frame of the simulator's agent stream: every active vehicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetSnapshot {
    pub data: Vec<FleetVehicle>,
}

impl ObserverMessage for FleetSnapshot {
    fn message_type(&self) -> &'static str {
        "FleetSnapshot"
    }
}
