use crate::domains::fleet::{FleetState, FleetVehicle};
use crate::domains::location_cloaking::CellBounds;
use serde::{Deserialize, Serialize};

/// South-west corner and northern edge of the observed square.
pub const ORIGIN_LON_MIN: f64 = 9.07962801;
pub const ORIGIN_LAT_MIN: f64 = 48.72741225;
pub const ORIGIN_LAT_MAX: f64 = 48.75670065;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalCloakingSettings {
    /// Other vehicles that must share the disclosed quadrant.
    pub constraint_k: usize,
    pub max_steps: u32,
    /// Vehicle number of the ego vehicle; the lowest number seen if unset.
    pub ego_vehicle: Option<u32>,
}

impl Default for TemporalCloakingSettings {
    fn default() -> Self {
        Self {
            constraint_k: 3,
            max_steps: 7,
            ego_vehicle: None,
        }
    }
}

/// Quadrants visited while shrinking towards the ego vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct CloakingOutcome {
    pub ego_vehicle: String,
    /// Every quadrant that was checked, largest first.
    pub steps: Vec<CellBounds>,
    /// Number of other vehicles inside each checked quadrant.
    pub counts: Vec<usize>,
    /// What a location server would learn about the ego vehicle.
    pub disclosed: CellBounds,
}

/// The full square, roughly as wide in meters as it is high.
pub fn origin_square() -> CellBounds {
    let lat_span = ORIGIN_LAT_MAX - ORIGIN_LAT_MIN;
    let lon_span = lat_span / ORIGIN_LAT_MIN.to_radians().cos();
    CellBounds {
        lon_min: ORIGIN_LON_MIN,
        lat_min: ORIGIN_LAT_MIN,
        lon_max: ORIGIN_LON_MIN + lon_span,
        lat_max: ORIGIN_LAT_MAX,
    }
}

fn lon_lat(vehicle: &FleetVehicle) -> (f64, f64) {
    (vehicle.location.y, vehicle.location.x)
}

fn inside(bounds: &CellBounds, (lon, lat): (f64, f64)) -> bool {
    lon >= bounds.lon_min && lon <= bounds.lon_max && lat >= bounds.lat_min && lat <= bounds.lat_max
}

/// Sub-quadrant containing the point. Points on a split line go west or south.
fn sub_quadrant(bounds: &CellBounds, (lon, lat): (f64, f64)) -> CellBounds {
    let (lon_mid, lat_mid) = bounds.center();
    let (lon_min, lon_max) = if lon <= lon_mid {
        (bounds.lon_min, lon_mid)
    } else {
        (lon_mid, bounds.lon_max)
    };
    let (lat_min, lat_max) = if lat <= lat_mid {
        (bounds.lat_min, lat_mid)
    } else {
        (lat_mid, bounds.lat_max)
    };
    CellBounds {
        lon_min,
        lat_min,
        lon_max,
        lat_max,
    }
}

/// Spatial k-anonymity by repeated quadrant halving.
pub struct TemporalCloaking {
    settings: TemporalCloakingSettings,
}

impl TemporalCloaking {
    pub fn new(settings: TemporalCloakingSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &TemporalCloakingSettings {
        &self.settings
    }

    pub fn ego_vehicle<'a>(&self, fleet: &'a FleetState) -> Option<&'a FleetVehicle> {
        match self.settings.ego_vehicle {
            Some(number) => fleet.agents.values().find(|v| v.vehicle_number() == Some(number)),
            None => fleet
                .agents
                .values()
                .filter(|v| v.vehicle_number().is_some())
                .min_by_key(|v| v.vehicle_number()),
        }
    }

    /// Shrink the origin square towards the ego vehicle for as long as at
    /// least `constraint_k` other vehicles share the quadrant.
    pub fn shrink(&self, fleet: &FleetState) -> Option<CloakingOutcome> {
        let ego = self.ego_vehicle(fleet)?;
        let ego_position = lon_lat(ego);

        let mut steps = Vec::new();
        let mut counts = Vec::new();
        let mut current = origin_square();
        let mut disclosed = current;

        for _ in 0..self.settings.max_steps {
            let count = fleet
                .agents
                .values()
                .filter(|v| v.id != ego.id && inside(&current, lon_lat(v)))
                .count();
            steps.push(current);
            counts.push(count);

            if count < self.settings.constraint_k {
                break;
            }
            disclosed = current;
            current = sub_quadrant(&current, ego_position);
        }

        Some(CloakingOutcome {
            ego_vehicle: ego.id.clone(),
            steps,
            counts,
            disclosed,
        })
    }
}
