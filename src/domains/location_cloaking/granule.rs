use crate::common::{DomainError, DomainResult};
use geojson::{Geometry, Value};
use serde::{Deserialize, Serialize};

/// Identifier of a cell in the implicit quadtree over a `GridPlane`.
///
/// Level `L` splits the plane into `2^(L+1)` columns and rows; ids are
/// numbered level by level, row-major, starting at the top-left cell.
/// Signed so that bogus negative ids coming off the wire can be rejected
/// instead of failing deserialization of the whole message.
pub type GranuleId = i64;

/// Deepest level an `i64` id can address.
pub const MAX_GRANULE_LEVEL: u32 = 31;

/// Bounding rectangle of the tracked area in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPlane {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl GridPlane {
    pub fn new(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Self {
        Self {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        }
    }

    pub fn width(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    pub fn height(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    pub fn bounds(&self) -> CellBounds {
        CellBounds {
            lon_min: self.lon_min,
            lat_min: self.lat_min,
            lon_max: self.lon_max,
            lat_max: self.lat_max,
        }
    }

    pub fn contains(&self, bounds: &CellBounds) -> bool {
        bounds.lon_min >= self.lon_min
            && bounds.lon_max <= self.lon_max
            && bounds.lat_min >= self.lat_min
            && bounds.lat_max <= self.lat_max
    }
}

/// Position of a granule inside the quadtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GranuleCell {
    pub level: u32,
    pub row: u64,
    pub column: u64,
}

impl GranuleCell {
    /// Number of columns (and rows) at this cell's level.
    pub fn divisions(&self) -> u64 {
        1u64 << (self.level + 1)
    }
}

/// Axis-aligned rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellBounds {
    pub lon_min: f64,
    pub lat_min: f64,
    pub lon_max: f64,
    pub lat_max: f64,
}

impl CellBounds {
    pub fn center(&self) -> (f64, f64) {
        (
            (self.lon_min + self.lon_max) / 2.0,
            (self.lat_min + self.lat_max) / 2.0,
        )
    }

    /// Scale about the rectangle's own centre.
    pub fn scaled(&self, scale: f64) -> CellBounds {
        let (lon_c, lat_c) = self.center();
        let half_w = (self.lon_max - self.lon_min) / 2.0 * scale;
        let half_h = (self.lat_max - self.lat_min) / 2.0 * scale;
        CellBounds {
            lon_min: lon_c - half_w,
            lat_min: lat_c - half_h,
            lon_max: lon_c + half_w,
            lat_max: lat_c + half_h,
        }
    }

    /// Closed exterior ring, counter-clockwise, `[lon, lat]` positions.
    pub fn ring(&self) -> Vec<Vec<f64>> {
        vec![
            vec![self.lon_min, self.lat_min],
            vec![self.lon_max, self.lat_min],
            vec![self.lon_max, self.lat_max],
            vec![self.lon_min, self.lat_max],
            vec![self.lon_min, self.lat_min],
        ]
    }

    pub fn to_geometry(&self) -> Geometry {
        Geometry::new(Value::Polygon(vec![self.ring()]))
    }
}

/// Number of cells on all levels strictly above (shallower than) `level`:
/// `(4/3) * (4^level - 1)`.
fn cells_below_level(level: u32) -> u128 {
    4 * ((1u128 << (2 * level)) - 1) / 3
}

/// Decode a granule id into its level, row and column.
pub fn decode(id: GranuleId) -> DomainResult<GranuleCell> {
    if id < 0 {
        return Err(DomainError::InvalidGranuleId { id });
    }

    // log4(3*id/4 + 1), floored. Float error near level boundaries is
    // corrected against the exact integer cell counts below.
    let estimate = ((3.0 * id as f64) / 4.0 + 1.0).ln() / 4f64.ln();
    let mut level = (estimate.floor().max(0.0) as u32).min(MAX_GRANULE_LEVEL);
    let target = id as u128;
    while level > 0 && cells_below_level(level) > target {
        level -= 1;
    }
    while level < MAX_GRANULE_LEVEL && cells_below_level(level + 1) <= target {
        level += 1;
    }

    let offset = target - cells_below_level(level);
    let divisions = 1u128 << (level + 1);
    Ok(GranuleCell {
        level,
        row: (offset / divisions) as u64,
        column: (offset % divisions) as u64,
    })
}

/// Inverse of `decode`. `None` if the cell lies outside its level or the id
/// would not fit.
pub fn encode(cell: GranuleCell) -> Option<GranuleId> {
    if cell.level > MAX_GRANULE_LEVEL {
        return None;
    }
    let divisions = 1u128 << (cell.level + 1);
    if cell.row as u128 >= divisions || cell.column as u128 >= divisions {
        return None;
    }
    let id = cells_below_level(cell.level) + cell.row as u128 * divisions + cell.column as u128;
    GranuleId::try_from(id).ok()
}

/// Rectangle covered by granule `id` on `plane`, scaled about its centre.
pub fn geometry_of(plane: &GridPlane, id: GranuleId, scale: f64) -> DomainResult<CellBounds> {
    let cell = decode(id)?;
    let divisions = cell.divisions() as f64;
    let width = plane.width() / divisions;
    let height = plane.height() / divisions;
    let lon_min = plane.lon_min + width * cell.column as f64;
    let lat_min = plane.lat_max - height * (cell.row as f64 + 1.0);

    let bounds = CellBounds {
        lon_min,
        lat_min,
        lon_max: lon_min + width,
        lat_max: lat_min + height,
    };
    if scale == 1.0 {
        Ok(bounds)
    } else {
        Ok(bounds.scaled(scale))
    }
}
