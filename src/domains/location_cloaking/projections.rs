use super::aggregate::{GranuleSet, LocationCloakingState};
use super::granule::{geometry_of, CellBounds, GranuleId, GridPlane};
use crate::common::ReconciledState;
use crate::domains::fleet::FleetState;
use crate::domains::logger::DynLogger;
use geojson::{feature::Id, Feature, Geometry, JsonObject, Value};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::f64::consts::TAU;

/// Vicinity tiles are inset so position tiles underneath stay visible.
pub const VICINITY_TILE_SCALE: f64 = 0.9;
/// Grid levels below this are not drawn; a level adds `2^(L+2)` lines.
pub const MAX_DRAWN_GRID_LEVEL: u32 = 10;
const BOUNDING_BOX_ID: &str = "grid:bbox";
const CIRCLE_SEGMENTS: usize = 32;

/// Display colors chosen for one agent. `None` hides that tile kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionVicinityColors {
    pub position: Option<String>,
    pub vicinity: Option<String>,
}

/// Per-agent tile colors with a fallback for agents nobody picked colors for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TileColors {
    #[serde(default)]
    pub default: PositionVicinityColors,
    #[serde(default)]
    pub per_agent: HashMap<String, PositionVicinityColors>,
}

impl TileColors {
    pub fn for_agent(&self, alias: &str) -> &PositionVicinityColors {
        self.per_agent.get(alias).unwrap_or(&self.default)
    }

    pub fn set(&mut self, alias: impl Into<String>, colors: PositionVicinityColors) {
        self.per_agent.insert(alias.into(), colors);
    }
}

/// Changes to one rendered collection. Apply `remove` before `add`: a tile
/// redrawn in place is removed and re-added under the same id.
#[derive(Debug, Clone, Default)]
pub struct GeometryOps {
    pub add: Vec<Feature>,
    /// Feature ids.
    pub remove: Vec<String>,
}

impl GeometryOps {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }

    pub fn added_ids(&self) -> Vec<String> {
        self.add.iter().filter_map(feature_id).map(str::to_string).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MaterializedOps {
    pub grid_lines: GeometryOps,
    pub position_tiles: GeometryOps,
    pub vicinity_tiles: GeometryOps,
}

impl MaterializedOps {
    pub fn is_empty(&self) -> bool {
        self.grid_lines.is_empty() && self.position_tiles.is_empty() && self.vicinity_tiles.is_empty()
    }
}

pub fn feature_id(feature: &Feature) -> Option<&str> {
    match &feature.id {
        Some(Id::String(id)) => Some(id.as_str()),
        _ => None,
    }
}

pub fn tile_id(alias: &str, granule: GranuleId) -> String {
    format!("{}:{}", alias, granule)
}

fn feature(id: String, geometry: Geometry, properties: serde_json::Value) -> Feature {
    let properties: Option<JsonObject> = match properties {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    };
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: Some(Id::String(id)),
        properties,
        foreign_members: None,
    }
}

fn tile_feature(alias: &str, granule: GranuleId, bounds: &CellBounds, kind: &str, color: &str) -> Feature {
    feature(
        tile_id(alias, granule),
        bounds.to_geometry(),
        json!({ "alias": alias, "granule": granule, "kind": kind, "color": color }),
    )
}

#[derive(Debug, Clone, PartialEq)]
struct DrawnPosition {
    granule: GranuleId,
    color: String,
    /// False when the granule had no valid geometry; nothing to remove then.
    rendered: bool,
}

#[derive(Debug, Clone)]
struct DrawnVicinity {
    color: String,
    granules: BTreeMap<GranuleId, bool>,
}

/// Derives incremental drawing operations from the reconciled cloaking state.
///
/// Holds what has been handed to the renderer so far; `materialize` only
/// returns the difference to the current state.
pub struct GridMaterializer {
    logger: DynLogger,
    drawn_epoch: Option<u64>,
    drawn_max_level: Option<u32>,
    grid_line_ids: Vec<String>,
    level_cap_reported: bool,
    position_tiles: HashMap<String, DrawnPosition>,
    vicinity_tiles: HashMap<String, DrawnVicinity>,
}

impl GridMaterializer {
    pub fn new(logger: DynLogger) -> Self {
        Self {
            logger,
            drawn_epoch: None,
            drawn_max_level: None,
            grid_line_ids: Vec::new(),
            level_cap_reported: false,
            position_tiles: HashMap::new(),
            vicinity_tiles: HashMap::new(),
        }
    }

    pub fn drawn_max_level(&self) -> Option<u32> {
        self.drawn_max_level
    }

    pub fn materialize(&mut self, state: &LocationCloakingState, colors: &TileColors) -> MaterializedOps {
        let mut ops = MaterializedOps::default();

        let Some(plane) = state.plane else {
            self.clear(&mut ops);
            return ops;
        };

        if self.drawn_epoch != Some(state.plane_epoch) {
            self.clear(&mut ops);
            ops.grid_lines.add.push(feature(
                BOUNDING_BOX_ID.to_string(),
                Geometry::new(Value::LineString(plane.bounds().ring())),
                json!({ "kind": "bounding_box" }),
            ));
            self.grid_line_ids.push(BOUNDING_BOX_ID.to_string());
            self.drawn_epoch = Some(state.plane_epoch);
        }

        self.materialize_grid_lines(&plane, state.max_level(), &mut ops.grid_lines);
        self.materialize_position_tiles(&plane, state, colors, &mut ops.position_tiles);
        self.materialize_vicinity_tiles(&plane, state, colors, &mut ops.vicinity_tiles);
        ops
    }

    /// Remove everything drawn so far.
    fn clear(&mut self, ops: &mut MaterializedOps) {
        ops.grid_lines.remove.append(&mut self.grid_line_ids);
        for (alias, drawn) in self.position_tiles.drain() {
            if drawn.rendered {
                ops.position_tiles.remove.push(tile_id(&alias, drawn.granule));
            }
        }
        for (alias, drawn) in self.vicinity_tiles.drain() {
            for (granule, rendered) in drawn.granules {
                if rendered {
                    ops.vicinity_tiles.remove.push(tile_id(&alias, granule));
                }
            }
        }
        self.drawn_epoch = None;
        self.drawn_max_level = None;
        self.level_cap_reported = false;
    }

    fn materialize_grid_lines(&mut self, plane: &GridPlane, actual_max_level: u32, ops: &mut GeometryOps) {
        if actual_max_level > MAX_DRAWN_GRID_LEVEL && !self.level_cap_reported {
            self.logger.warn(
                LocationCloakingState::COMPONENT,
                &format!(
                    "Agents report level {}, grid lines are only drawn up to level {}",
                    actual_max_level, MAX_DRAWN_GRID_LEVEL
                ),
            );
            self.level_cap_reported = true;
        }

        let target = actual_max_level.min(MAX_DRAWN_GRID_LEVEL);
        let first = self.drawn_max_level.map_or(0, |l| l + 1);
        if first > target {
            return;
        }

        for level in first..=target {
            let divisions = 1u64 << (level + 1);
            let dx = plane.width() / divisions as f64;
            let dy = plane.height() / divisions as f64;

            // Even division points coincide with lines of shallower levels.
            for i in (1..divisions).step_by(2) {
                let lon = plane.lon_min + dx * i as f64;
                let lat = plane.lat_min + dy * i as f64;

                let north_south = format!("grid:{}:ns:{}", level, i);
                let east_west = format!("grid:{}:ew:{}", level, i);
                ops.add.push(feature(
                    north_south.clone(),
                    Geometry::new(Value::LineString(vec![
                        vec![lon, plane.lat_max],
                        vec![lon, plane.lat_min],
                    ])),
                    json!({ "kind": "grid_line", "level": level }),
                ));
                ops.add.push(feature(
                    east_west.clone(),
                    Geometry::new(Value::LineString(vec![
                        vec![plane.lon_min, lat],
                        vec![plane.lon_max, lat],
                    ])),
                    json!({ "kind": "grid_line", "level": level }),
                ));
                self.grid_line_ids.push(north_south);
                self.grid_line_ids.push(east_west);
            }
        }
        self.drawn_max_level = Some(target);
    }

    fn materialize_position_tiles(
        &mut self,
        plane: &GridPlane,
        state: &LocationCloakingState,
        colors: &TileColors,
        ops: &mut GeometryOps,
    ) {
        let vanished: Vec<String> = self
            .position_tiles
            .keys()
            .filter(|alias| !state.agents.contains_key(*alias))
            .cloned()
            .collect();
        for alias in vanished {
            if let Some(drawn) = self.position_tiles.remove(&alias) {
                if drawn.rendered {
                    ops.remove.push(tile_id(&alias, drawn.granule));
                }
            }
        }

        for (alias, agent) in &state.agents {
            let color = colors.for_agent(alias).position.clone();
            let current = self.position_tiles.get(alias);

            let Some(color) = color else {
                if let Some(drawn) = self.position_tiles.remove(alias) {
                    if drawn.rendered {
                        ops.remove.push(tile_id(alias, drawn.granule));
                    }
                }
                continue;
            };

            if current.is_some_and(|d| d.granule == agent.position_granule && d.color == color) {
                continue;
            }
            if let Some(stale) = self.position_tiles.remove(alias) {
                if stale.rendered {
                    ops.remove.push(tile_id(alias, stale.granule));
                }
            }

            let rendered = match geometry_of(plane, agent.position_granule, 1.0) {
                Ok(bounds) => {
                    ops.add.push(tile_feature(alias, agent.position_granule, &bounds, "position", &color));
                    true
                }
                Err(e) => {
                    self.logger.warn(
                        LocationCloakingState::COMPONENT,
                        &format!("Skipping position tile of {}: {}", alias, e),
                    );
                    false
                }
            };
            self.position_tiles.insert(
                alias.clone(),
                DrawnPosition {
                    granule: agent.position_granule,
                    color,
                    rendered,
                },
            );
        }
    }

    fn materialize_vicinity_tiles(
        &mut self,
        plane: &GridPlane,
        state: &LocationCloakingState,
        colors: &TileColors,
        ops: &mut GeometryOps,
    ) {
        let vanished: Vec<String> = self
            .vicinity_tiles
            .keys()
            .filter(|alias| {
                !state.agents.contains_key(*alias) || colors.for_agent(alias).vicinity.is_none()
            })
            .cloned()
            .collect();
        for alias in vanished {
            if let Some(drawn) = self.vicinity_tiles.remove(&alias) {
                for (granule, rendered) in drawn.granules {
                    if rendered {
                        ops.remove.push(tile_id(&alias, granule));
                    }
                }
            }
        }

        let empty = GranuleSet::new();
        for (alias, agent) in &state.agents {
            let Some(color) = colors.for_agent(alias).vicinity.clone() else {
                continue;
            };
            let top = agent.vicinity_top().unwrap_or(&empty);

            let drawn = self
                .vicinity_tiles
                .entry(alias.clone())
                .or_insert_with(|| DrawnVicinity {
                    color: color.clone(),
                    granules: BTreeMap::new(),
                });

            let recolor = drawn.color != color;
            let stale: Vec<GranuleId> = drawn
                .granules
                .keys()
                .filter(|g| recolor || !top.contains(*g))
                .copied()
                .collect();
            for granule in stale {
                if drawn.granules.remove(&granule) == Some(true) {
                    ops.remove.push(tile_id(alias, granule));
                }
            }
            drawn.color = color;

            for granule in top.iter().copied() {
                if drawn.granules.contains_key(&granule) {
                    continue;
                }
                let rendered = match geometry_of(plane, granule, VICINITY_TILE_SCALE) {
                    Ok(bounds) => {
                        ops.add.push(tile_feature(alias, granule, &bounds, "vicinity", &drawn.color));
                        true
                    }
                    Err(e) => {
                        self.logger.warn(
                            LocationCloakingState::COMPONENT,
                            &format!("Skipping vicinity tile of {}: {}", alias, e),
                        );
                        false
                    }
                };
                drawn.granules.insert(granule, rendered);
            }
        }
    }
}

/// Circles of `vicinity_radius` around the true agent positions reported by
/// the fleet stream. Illustrative only; the algorithm never publishes them.
pub fn vicinity_circles(state: &LocationCloakingState, fleet: &FleetState) -> Vec<Feature> {
    fleet
        .agents
        .values()
        .filter_map(|vehicle| {
            let agent = state.agents.get(&vehicle.id)?;
            let radius = agent.vicinity_radius * vehicle.great_circle_distance_factor;
            let (lon, lat) = (vehicle.location.y, vehicle.location.x);

            let mut ring: Vec<Vec<f64>> = (0..CIRCLE_SEGMENTS)
                .map(|i| {
                    let angle = TAU * i as f64 / CIRCLE_SEGMENTS as f64;
                    vec![lon + radius * angle.cos(), lat + radius * angle.sin()]
                })
                .collect();
            ring.push(ring[0].clone());

            Some(feature(
                vehicle.id.clone(),
                Geometry::new(Value::Polygon(vec![ring])),
                json!({ "kind": "vicinity_circle", "radius": agent.vicinity_radius }),
            ))
        })
        .collect()
}
