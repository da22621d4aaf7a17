use crate::geo::ScreenPoint;

/// Minimum population a city needs below a given zoom
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PopulationBand {
    /// Band applies while `zoom < below_zoom`
    pub below_zoom: f64,
    pub min_population: u64,
}

/// Zoom-dependent rules deciding which features are drawn and how large
#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityPolicy {
    /// Cities are only considered once zoom exceeds this
    pub city_reveal_zoom: f64,
    /// Ordered by ascending `below_zoom`
    pub bands: Vec<PopulationBand>,
    /// Threshold once zoom is past every band
    pub finest_min_population: u64,
}

impl Default for VisibilityPolicy {
    fn default() -> Self {
        Self {
            city_reveal_zoom: 1.2,
            bands: vec![
                PopulationBand { below_zoom: 1.2, min_population: 3_000_000 },
                PopulationBand { below_zoom: 7.0, min_population: 2_000_000 },
                PopulationBand { below_zoom: 30.0, min_population: 500_000 },
            ],
            finest_min_population: 200_000,
        }
    }
}

impl VisibilityPolicy {
    /// Population cutoff at this zoom
    pub fn min_population(&self, zoom: f64) -> u64 {
        self.bands
            .iter()
            .find(|band| zoom < band.below_zoom)
            .map_or(self.finest_min_population, |band| band.min_population)
    }

    pub fn is_city_visible(&self, population: u64, zoom: f64) -> bool {
        population >= self.min_population(zoom)
    }

    /// Lower rank is more prominent and appears at lower zoom
    pub fn is_country_label_visible(&self, label_rank: f64, zoom: f64) -> bool {
        zoom * 2.0 >= label_rank
    }

    /// Screen-space font size; divide by zoom when drawing inside the map transform
    pub fn font_size_for_population(&self, population: u64) -> f64 {
        if population > 2_000_000 {
            25.0
        } else if population > 1_000_000 {
            22.0
        } else if population > 500_000 {
            18.0
        } else {
            15.0
        }
    }

    /// Population test plus viewport culling against the canvas rectangle
    pub fn city_dot_visible(&self, population: u64, zoom: f64, screen: ScreenPoint, canvas: (f64, f64)) -> bool {
        self.is_city_visible(population, zoom) && on_screen(screen, canvas)
    }
}

/// Inclusive `[0, width] x [0, height]` check
#[inline(always)]
pub fn on_screen(p: ScreenPoint, (width, height): (f64, f64)) -> bool {
    p.x >= 0.0 && p.x <= width && p.y >= 0.0 && p.y <= height
}
