use glam::DVec2;

use crate::geo::{MapPoint, ScreenPoint};

/// Smallest zoom the viewport will accept
pub const MIN_ZOOM: f64 = 1e-3;
/// Largest zoom the viewport will accept
pub const MAX_ZOOM: f64 = 1e3;

/// Pan offset and zoom factor mapping base-map pixels onto the screen.
/// `screen = map * zoom + offset`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub offset: DVec2,
    /// Always within [MIN_ZOOM, MAX_ZOOM]
    zoom: f64,
}

impl Viewport {
    pub fn new(offset: DVec2, zoom: f64) -> Self {
        let zoom = if zoom.is_finite() && zoom > 0.0 { zoom } else { 1.0 };
        Self {
            offset,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    /// Zoom at which a map of `map_width` pixels exactly fills `canvas_width`
    pub fn fit_width_zoom(canvas_width: f64, map_width: f64) -> f64 {
        if canvas_width > 0.0 && map_width > 0.0 {
            (canvas_width / map_width).clamp(MIN_ZOOM, MAX_ZOOM)
        } else {
            1.0
        }
    }

    #[inline(always)]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    #[inline(always)]
    pub fn map_to_screen(&self, p: MapPoint) -> ScreenPoint {
        (p.to_dvec2() * self.zoom + self.offset).into()
    }

    #[inline(always)]
    pub fn screen_to_map(&self, p: ScreenPoint) -> MapPoint {
        ((p.to_dvec2() - self.offset) / self.zoom).into()
    }

    /// Shift the view by a screen-pixel delta. Panning past the map edge is allowed.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        if dx.is_finite() && dy.is_finite() {
            self.offset += DVec2::new(dx, dy);
        }
    }

    /// Scale by `factor` while keeping the map point under `anchor` fixed on screen
    pub fn zoom_at(&mut self, anchor: ScreenPoint, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 || !anchor.x.is_finite() || !anchor.y.is_finite() {
            return;
        }
        let anchor_map = self.screen_to_map(anchor);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        // Re-derive the offset from the zoom actually applied so clamping keeps the anchor
        self.offset = anchor.to_dvec2() - anchor_map.to_dvec2() * self.zoom;
    }

    /// Back to the origin at the given default zoom
    pub fn reset(&mut self, base_zoom: f64) {
        *self = Self::new(DVec2::ZERO, base_zoom);
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DVec2::ZERO, 1.0)
    }
}
