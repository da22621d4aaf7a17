use glam::DVec2;
use rayon::prelude::*;

use crate::geo::{GeoPoint, Rect};
use crate::map::projection::Projection;

/// A city marker with position, name, and population
#[derive(Clone, Debug, PartialEq)]
pub struct City {
    pub name: String,
    pub location: GeoPoint,
    pub population: u64,
    pub country: Option<String>,
}

/// A country name anchored at a point; lower rank shows up earlier
#[derive(Clone, Debug, PartialEq)]
pub struct CountryLabel {
    pub name: String,
    pub location: GeoPoint,
    pub label_rank: f64,
}

/// Polygon or multi-polygon flattened to its rings (outer rings and holes alike)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundaryFeature {
    pub rings: Vec<Vec<GeoPoint>>,
}

/// A boundary ring already in map space, with its bounds for culling
#[derive(Clone, Debug)]
pub struct ProjectedRing {
    pub points: Vec<DVec2>,
    pub bounds: Rect,
}

/// Boundary data projected once at load time
#[derive(Clone, Debug, Default)]
pub struct BoundaryLayer {
    features: Vec<BoundaryFeature>,
    rings: Vec<ProjectedRing>,
}

impl BoundaryLayer {
    pub fn new(features: Vec<BoundaryFeature>, projection: &Projection) -> Self {
        let rings = features
            .par_iter()
            .flat_map_iter(|feature| feature.rings.iter())
            .filter_map(|ring| {
                let points: Vec<DVec2> = ring.iter().map(|&g| projection.project(g).to_dvec2()).collect();
                let bounds = Rect::bounding(points.iter().copied())?;
                Some(ProjectedRing { points, bounds })
            })
            .collect();
        Self { features, rings }
    }

    pub fn features(&self) -> &[BoundaryFeature] {
        &self.features
    }

    pub fn rings(&self) -> &[ProjectedRing] {
        &self.rings
    }
}
