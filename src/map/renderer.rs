use glam::DVec2;

use crate::canvas::{Ink, Sprite, Surface, TextAnchor, TextStyle, Transform};
use crate::geo::{GeoPoint, Rect, ScreenPoint};
use crate::interaction::SelectionState;
use crate::map::features::{BoundaryFeature, BoundaryLayer, City, CountryLabel};
use crate::map::labels::{LabelPlacer, Placement};
use crate::map::projection::Projection;
use crate::map::viewport::Viewport;
use crate::map::visibility::{on_screen, VisibilityPolicy};

/// Display settings for map layers
#[derive(Clone, Debug, PartialEq)]
pub struct DisplaySettings {
    pub show_boundaries: bool,
    pub show_cities: bool,
    pub show_country_labels: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_boundaries: true,
            show_cities: true,
            show_country_labels: true,
        }
    }
}

/// Pixel sizes used when drawing, all in screen pixels
#[derive(Clone, Debug, PartialEq)]
pub struct RenderStyle {
    pub dot_radius: f64,
    pub dot_outline: f64,
    pub label_margin: f64,
    pub label_outline: f64,
    pub boundary_width: f64,
    pub country_font: f64,
    pub country_outline: f64,
    pub connector_width: f64,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            dot_radius: 5.0,
            dot_outline: 5.0,
            label_margin: 7.0,
            label_outline: 5.0,
            boundary_width: 1.0,
            country_font: 28.0,
            country_outline: 1.0,
            connector_width: 2.0,
        }
    }
}

impl RenderStyle {
    /// Sizes for 2x4-dot terminal cells
    pub fn braille() -> Self {
        Self {
            dot_radius: 1.0,
            dot_outline: 0.0,
            label_margin: 2.0,
            label_outline: 0.0,
            connector_width: 1.0,
            ..Self::default()
        }
    }
}

/// Images the renderer draws; each is skipped until ready
#[derive(Clone, Debug)]
pub struct Sprites {
    pub base_map: Sprite,
    pub guess_marker: Sprite,
    pub answer_marker: Sprite,
}

impl Default for Sprites {
    fn default() -> Self {
        Self {
            base_map: Sprite::pending(),
            guess_marker: Sprite::pin(),
            answer_marker: Sprite::pin(),
        }
    }
}

/// Per-frame state the renderer reads but does not own
#[derive(Clone, Copy, Debug)]
pub struct Scene<'a> {
    pub viewport: &'a Viewport,
    pub selection: &'a SelectionState,
    /// Where the answer marker goes once revealed
    pub answer: Option<GeoPoint>,
}

/// What a frame ended up drawing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub rings: usize,
    pub cities: usize,
    pub fallback_labels: usize,
    pub country_labels: usize,
    pub markers: usize,
}

/// Draws the full map each frame from its datasets and the current scene
pub struct MapRenderer {
    pub projection: Projection,
    pub policy: VisibilityPolicy,
    pub style: RenderStyle,
    pub settings: DisplaySettings,
    pub sprites: Sprites,
    placer: LabelPlacer,
    boundaries: Option<BoundaryLayer>,
    cities: Option<Vec<City>>,
    country_labels: Option<Vec<CountryLabel>>,
}

impl MapRenderer {
    pub fn new(projection: Projection, style: RenderStyle) -> Self {
        Self {
            projection,
            policy: VisibilityPolicy::default(),
            placer: LabelPlacer::new(style.label_margin),
            style,
            settings: DisplaySettings::default(),
            sprites: Sprites::default(),
            boundaries: None,
            cities: None,
            country_labels: None,
        }
    }

    pub fn set_boundaries(&mut self, features: Vec<BoundaryFeature>) {
        self.boundaries = Some(BoundaryLayer::new(features, &self.projection));
    }

    pub fn set_cities(&mut self, cities: Vec<City>) {
        self.cities = Some(cities);
    }

    pub fn set_country_labels(&mut self, labels: Vec<CountryLabel>) {
        self.country_labels = Some(labels);
    }

    pub fn boundaries(&self) -> Option<&BoundaryLayer> {
        self.boundaries.as_ref()
    }

    pub fn cities(&self) -> Option<&[City]> {
        self.cities.as_deref()
    }

    pub fn country_labels(&self) -> Option<&[CountryLabel]> {
        self.country_labels.as_deref()
    }

    /// Check if any vector data is loaded
    pub fn has_data(&self) -> bool {
        self.boundaries.is_some() || self.cities.is_some() || self.country_labels.is_some()
    }

    /// City label placements from the most recent frame
    pub fn last_placements(&self) -> &[Placement] {
        self.placer.placed()
    }

    /// Render one frame. Fixed order: base map, boundaries, cities, then
    /// (outside the map transform) country labels, markers, connector.
    pub fn render<S: Surface + ?Sized>(&mut self, surface: &mut S, scene: &Scene) -> FrameStats {
        let viewport = scene.viewport;
        let zoom = viewport.zoom();
        let mut stats = FrameStats::default();

        surface.clear();
        self.placer.begin_pass();

        surface.push_transform(Transform {
            offset: viewport.offset,
            scale: zoom,
        });

        surface.draw_sprite(&self.sprites.base_map, DVec2::ZERO, Ink::BaseMap);

        if self.settings.show_boundaries {
            stats.rings = self.draw_boundaries(surface, viewport);
        }

        if self.settings.show_cities && zoom > self.policy.city_reveal_zoom {
            let (cities, fallbacks) = self.draw_cities(surface, viewport);
            stats.cities = cities;
            stats.fallback_labels = fallbacks;
        }

        surface.pop_transform();

        if self.settings.show_country_labels {
            stats.country_labels = self.draw_country_labels(surface, viewport);
        }

        stats.markers = self.draw_markers(surface, scene);
        stats
    }

    fn draw_boundaries<S: Surface + ?Sized>(&self, surface: &mut S, viewport: &Viewport) -> usize {
        let Some(layer) = &self.boundaries else {
            return 0;
        };
        let (width, height) = surface.size();
        let canvas = Rect::new(0.0, 0.0, width, height);
        let zoom = viewport.zoom();
        let stroke = self.style.boundary_width / zoom;

        let mut drawn = 0;
        for ring in layer.rings() {
            let b = ring.bounds;
            let top_left = viewport.offset + DVec2::new(b.x, b.y) * zoom;
            let on_canvas = Rect::new(top_left.x, top_left.y, b.width * zoom, b.height * zoom);
            if !on_canvas.overlaps(&canvas) {
                continue;
            }
            surface.stroke_path(&ring.points, true, stroke, Ink::Boundary);
            drawn += 1;
        }
        drawn
    }

    /// Dots and collision-avoided labels; returns (cities drawn, fallback labels)
    fn draw_cities<S: Surface + ?Sized>(&mut self, surface: &mut S, viewport: &Viewport) -> (usize, usize) {
        let Some(cities) = &self.cities else {
            return (0, 0);
        };
        let canvas = surface.size();
        let zoom = viewport.zoom();
        let (mut drawn, mut fallbacks) = (0, 0);

        for city in cities {
            let map = self.projection.project(city.location);
            let screen = viewport.map_to_screen(map);
            if !self.policy.city_dot_visible(city.population, zoom, screen, canvas) {
                continue;
            }

            surface.fill_circle(
                map.to_dvec2(),
                self.style.dot_radius / zoom,
                self.style.dot_outline / zoom,
                Ink::CityDot,
            );

            let font = self.policy.font_size_for_population(city.population);
            let size = surface.measure_text(&city.name, font);
            let placement = self.placer.place(screen, size);
            if placement.fallback {
                fallbacks += 1;
            }

            let origin = viewport.screen_to_map(ScreenPoint::new(placement.bbox.x, placement.bbox.y));
            let style = TextStyle {
                font_size: font / zoom,
                anchor: TextAnchor::TopLeft,
                outline: self.style.label_outline / zoom,
            };
            surface.draw_text(&city.name, origin.to_dvec2(), style, Ink::CityLabel);
            drawn += 1;
        }
        (drawn, fallbacks)
    }

    /// Screen-space country names, centered, no collision handling
    fn draw_country_labels<S: Surface + ?Sized>(&self, surface: &mut S, viewport: &Viewport) -> usize {
        let Some(labels) = &self.country_labels else {
            return 0;
        };
        let canvas = surface.size();
        let style = TextStyle {
            font_size: self.style.country_font,
            anchor: TextAnchor::Center,
            outline: self.style.country_outline,
        };

        let mut drawn = 0;
        for label in labels {
            if !self.policy.is_country_label_visible(label.label_rank, viewport.zoom()) {
                continue;
            }
            let screen = viewport.map_to_screen(self.projection.project(label.location));
            if !on_screen(screen, canvas) {
                continue;
            }
            surface.draw_text(&label.name, screen.to_dvec2(), style, Ink::CountryLabel);
            drawn += 1;
        }
        drawn
    }

    /// Guess marker, answer marker, then the line between them.
    /// Natural sprite size, never scaled by zoom.
    fn draw_markers<S: Surface + ?Sized>(&self, surface: &mut S, scene: &Scene) -> usize {
        let to_screen = |geo: GeoPoint| scene.viewport.map_to_screen(self.projection.project(geo));
        let guess = scene.selection.selected.map(to_screen);
        let answer = scene.answer.filter(|_| scene.selection.marker_visible).map(to_screen);

        let mut drawn = 0;
        if let Some(at) = guess {
            drawn += draw_marker(surface, &self.sprites.guess_marker, at, Ink::GuessMarker);
        }
        if let Some(at) = answer {
            drawn += draw_marker(surface, &self.sprites.answer_marker, at, Ink::AnswerMarker);
            if let Some(from) = guess {
                surface.stroke_path(
                    &[from.to_dvec2(), at.to_dvec2()],
                    false,
                    self.style.connector_width,
                    Ink::Connector,
                );
            }
        }
        drawn
    }
}

/// Center a sprite on `at`; returns 1 if drawn
fn draw_marker<S: Surface + ?Sized>(surface: &mut S, sprite: &Sprite, at: ScreenPoint, ink: Ink) -> usize {
    if !sprite.is_ready() {
        return 0;
    }
    let half = DVec2::new(sprite.width() as f64, sprite.height() as f64) / 2.0;
    surface.draw_sprite(sprite, at.to_dvec2() - half, ink);
    1
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self::new(Projection::default(), RenderStyle::default())
    }
}
