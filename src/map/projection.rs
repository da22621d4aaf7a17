use crate::geo::{GeoPoint, MapPoint};

/// Width of the base map image in pixels
pub const BASE_MAP_WIDTH: f64 = 5400.0;
/// Height of the base map image in pixels
pub const BASE_MAP_HEIGHT: f64 = 2700.0;

/// Equirectangular projection onto a fixed-size base map
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub width: f64,
    pub height: f64,
}

impl Projection {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Project a geographic coordinate to base-map pixels
    #[inline(always)]
    pub fn project(&self, geo: GeoPoint) -> MapPoint {
        MapPoint::new(
            (geo.lon + 180.0) * (self.width / 360.0),
            (90.0 - geo.lat) * (self.height / 180.0),
        )
    }

    /// Exact inverse of [`Projection::project`]
    #[inline(always)]
    pub fn unproject(&self, map: MapPoint) -> GeoPoint {
        GeoPoint::new(
            90.0 - map.y / (self.height / 180.0),
            map.x / (self.width / 360.0) - 180.0,
        )
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(BASE_MAP_WIDTH, BASE_MAP_HEIGHT)
    }
}
