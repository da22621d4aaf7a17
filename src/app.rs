use glam::DVec2;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;

use crate::canvas::BrailleSurface;
use crate::config::Config;
use crate::data::DataEvent;
use crate::game::{ChallengeFetcher, ChallengeSource, DistanceService, GameSession, Haversine, LocalChallenges};
use crate::geo::ScreenPoint;
use crate::interaction::{InteractionController, PointerEvent, SelectionState, WHEEL_ZOOM_STEP};
use crate::map::{FrameStats, MapRenderer, Projection, RenderStyle, Scene, Viewport};

/// Application state
pub struct App {
    pub viewport: Viewport,
    pub selection: SelectionState,
    pub map_renderer: MapRenderer,
    pub game: GameSession,
    pub should_quit: bool,
    /// One-line notice shown in the side panel
    pub notice: Option<String>,
    controller: InteractionController,
    fetcher: ChallengeFetcher,
    challenges: Option<Arc<dyn ChallengeSource>>,
    distance: Box<dyn DistanceService>,
    data_rx: Option<Receiver<DataEvent>>,
    surface: BrailleSurface,
    last_stats: FrameStats,
    seed: u64,
    dirty: bool,
}

impl App {
    /// `cols`/`rows` are the character size of the map area
    pub fn new(config: &Config, cols: usize, rows: usize) -> Self {
        let projection = Projection::default();
        let surface = BrailleSurface::new(cols, rows);
        let mut app = Self {
            viewport: Viewport::default(),
            selection: SelectionState::default(),
            map_renderer: MapRenderer::new(projection, RenderStyle::braille()),
            game: GameSession::new(config.rounds),
            should_quit: false,
            notice: None,
            controller: InteractionController::new(projection),
            fetcher: ChallengeFetcher::new(),
            challenges: None,
            distance: Box::new(Haversine),
            data_rx: None,
            surface,
            last_stats: FrameStats::default(),
            seed: config.seed,
            dirty: true,
        };
        app.viewport.reset(app.base_zoom());
        app
    }

    /// Replace the distance provider
    pub fn with_distance_service(mut self, service: Box<dyn DistanceService>) -> Self {
        self.distance = service;
        self
    }

    /// Receive datasets from a background loader
    pub fn attach_loader(&mut self, rx: Receiver<DataEvent>) {
        self.data_rx = Some(rx);
    }

    /// Canvas size in braille pixels
    pub fn canvas_size(&self) -> DVec2 {
        DVec2::new((self.surface.cols() * 2) as f64, (self.surface.rows() * 4) as f64)
    }

    /// Zoom at which the base map fills the canvas width
    pub fn base_zoom(&self) -> f64 {
        Viewport::fit_width_zoom(self.canvas_size().x, self.map_renderer.projection.width)
    }

    pub fn needs_redraw(&self) -> bool {
        self.dirty
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    pub fn surface(&self) -> &BrailleSurface {
        &self.surface
    }

    /// Redraw the map into the braille surface
    pub fn render_map(&mut self) -> &BrailleSurface {
        let scene = Scene {
            viewport: &self.viewport,
            selection: &self.selection,
            answer: self.game.answer(),
        };
        self.last_stats = self.map_renderer.render(&mut self.surface, &scene);
        self.dirty = false;
        &self.surface
    }

    /// Map area changed size (in characters)
    pub fn resize(&mut self, cols: usize, rows: usize) {
        self.surface.resize(cols, rows);
        self.dirty = true;
    }

    /// Apply whatever background work has finished
    pub fn poll_background(&mut self) {
        if let Some(rx) = &self.data_rx {
            let mut events = Vec::new();
            let disconnected = loop {
                match rx.try_recv() {
                    Ok(event) => events.push(event),
                    Err(TryRecvError::Empty) => break false,
                    Err(TryRecvError::Disconnected) => break true,
                }
            };
            for event in events {
                self.apply_data(event);
            }
            if disconnected {
                self.data_rx = None;
            }
        }

        match self.fetcher.poll() {
            Some(Ok(challenge)) => {
                self.game.challenge_arrived(challenge);
                self.selection.clear();
                self.dirty = true;
            }
            Some(Err(e)) => {
                log::warn!("challenge fetch failed: {e:#}");
                self.game.challenge_failed();
                self.notice = Some("Could not get a new city".into());
                self.dirty = true;
            }
            None => {}
        }
    }

    pub fn apply_data(&mut self, event: DataEvent) {
        match event {
            DataEvent::Boundaries(features) => self.map_renderer.set_boundaries(features),
            DataEvent::Cities(cities) => {
                self.challenges = Some(Arc::new(LocalChallenges::new(cities.clone(), self.seed)));
                self.map_renderer.set_cities(cities);
            }
            DataEvent::CountryLabels(labels) => self.map_renderer.set_country_labels(labels),
            DataEvent::BaseMap(sprite) => self.map_renderer.sprites.base_map = sprite,
            DataEvent::GuessMarker(sprite) => self.map_renderer.sprites.guess_marker = sprite,
            DataEvent::AnswerMarker(sprite) => self.map_renderer.sprites.answer_marker = sprite,
        }
        self.dirty = true;
    }

    /// Feed a pointer event in braille pixel coordinates
    pub fn pointer(&mut self, event: PointerEvent) {
        let response = self.controller.handle(event, &mut self.viewport, &mut self.selection);
        if response.clicked.is_some() {
            self.notice = None;
        }
        self.dirty |= response.redraw;
    }

    /// Pan the map (keyboard)
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.viewport.pan(dx, dy);
        self.dirty = true;
    }

    /// One wheel tick at the canvas center
    pub fn zoom_step(&mut self, zoom_in: bool) {
        let center = self.canvas_size() / 2.0;
        let factor = if zoom_in { WHEEL_ZOOM_STEP } else { 1.0 / WHEEL_ZOOM_STEP };
        self.viewport.zoom_at(ScreenPoint::new(center.x, center.y), factor);
        self.dirty = true;
    }

    pub fn toggle_cities(&mut self) {
        let settings = &mut self.map_renderer.settings;
        settings.show_cities = !settings.show_cities;
        self.dirty = true;
    }

    pub fn toggle_country_labels(&mut self) {
        let settings = &mut self.map_renderer.settings;
        settings.show_country_labels = !settings.show_country_labels;
        self.dirty = true;
    }

    pub fn toggle_boundaries(&mut self) {
        let settings = &mut self.map_renderer.settings;
        settings.show_boundaries = !settings.show_boundaries;
        self.dirty = true;
    }

    /// Request the next city to guess
    pub fn new_challenge(&mut self) {
        let Some(source) = self.challenges.clone() else {
            self.notice = Some("Cities are still loading".into());
            self.dirty = true;
            return;
        };
        self.notice = None;
        self.game.begin_challenge();
        if let Err(e) = self.fetcher.request(source) {
            log::warn!("{e:#}");
            self.game.challenge_failed();
        }
        self.dirty = true;
    }

    /// Score the current selection and reveal the answer
    pub fn submit_guess(&mut self) {
        match self.game.submit(self.selection.selected, self.distance.as_ref()) {
            Ok(Some(_)) => {
                self.selection.reveal();
                self.dirty = true;
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!("distance lookup failed: {e:#}");
                self.notice = Some("Could not measure the distance".into());
                self.dirty = true;
            }
        }
    }

    /// New game, default view, no selection; in-flight challenges are dropped
    pub fn reset(&mut self) {
        self.game.reset();
        self.fetcher.invalidate();
        self.selection.clear();
        self.notice = None;
        let zoom = self.base_zoom();
        self.viewport.reset(zoom);
        self.dirty = true;
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Get current zoom level as a string
    pub fn zoom_level(&self) -> String {
        format!("{:.2}x", self.viewport.zoom())
    }

    /// Current selection as a string
    pub fn selection_coords(&self) -> String {
        match self.selection.selected {
            Some(p) => format!(
                "{:.2}°{}, {:.2}°{}",
                p.lat.abs(),
                if p.lat >= 0.0 { "N" } else { "S" },
                p.lon.abs(),
                if p.lon >= 0.0 { "E" } else { "W" }
            ),
            None => "no guess".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::testing::gated;
    use crate::game::{Challenge, ChallengeState};
    use crate::geo::GeoPoint;
    use crate::map::{BoundaryFeature, City};
    use anyhow::Result;
    use std::thread;
    use std::time::{Duration, Instant};

    struct Fixed(f64);

    impl DistanceService for Fixed {
        fn distance_km(&self, _: GeoPoint, _: GeoPoint) -> Result<f64> {
            Ok(self.0)
        }
    }

    fn europe() -> BoundaryFeature {
        let corners = [(-10.0, 36.0), (40.0, 36.0), (40.0, 60.0), (-10.0, 60.0), (-10.0, 36.0)];
        BoundaryFeature {
            rings: vec![corners.iter().map(|&(lon, lat)| GeoPoint::new(lat, lon)).collect()],
        }
    }

    fn cities() -> Vec<City> {
        [("Paris", 48.9, 2.3), ("Madrid", 40.4, -3.7), ("Rome", 41.9, 12.5)]
            .into_iter()
            .map(|(name, lat, lon)| City {
                name: name.to_string(),
                location: GeoPoint::new(lat, lon),
                population: 3_000_000,
                country: None,
            })
            .collect()
    }

    fn app() -> App {
        let mut app = App::new(&Config::default(), 100, 40).with_distance_service(Box::new(Fixed(100.0)));
        app.apply_data(DataEvent::Boundaries(vec![europe()]));
        app.apply_data(DataEvent::Cities(cities()));
        app
    }

    fn wait_for_challenge(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            app.poll_background();
            if matches!(app.game.challenge(), ChallengeState::Ready(_)) {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("challenge never arrived");
    }

    fn click(app: &mut App, x: f64, y: f64) {
        let at = ScreenPoint::new(x, y);
        app.pointer(PointerEvent::Down(at));
        app.pointer(PointerEvent::Up(at));
    }

    #[test]
    fn test_starts_fit_to_width() {
        let app = app();
        assert!((app.viewport.zoom() - 200.0 / 5400.0).abs() < 1e-12);
        assert_eq!(app.viewport.offset, DVec2::ZERO);
        assert!(app.needs_redraw());
    }

    #[test]
    fn test_render_clears_dirty() {
        let mut app = app();
        app.render_map();
        assert!(!app.needs_redraw());
        assert!(app.last_stats().rings > 0);
        app.pan(3.0, 0.0);
        assert!(app.needs_redraw());
    }

    #[test]
    fn test_full_round() {
        let mut app = app();
        app.new_challenge();
        assert_eq!(app.game.challenge(), &ChallengeState::Pending);
        wait_for_challenge(&mut app);

        click(&mut app, 50.0, 40.0);
        assert!(app.selection.selected.is_some());
        app.submit_guess();
        assert!(app.selection.marker_visible);
        assert_eq!(app.game.round(), 1);
        assert_eq!(app.game.total_score(), 4950);

        // A new click hides the answer again
        click(&mut app, 10.0, 10.0);
        assert!(!app.selection.marker_visible);
    }

    #[test]
    fn test_reset_drops_pending_challenge() {
        let mut app = app();
        let (source, release) = gated(Challenge {
            city: "Paris".into(),
            country: "France".into(),
            latitude: 48.9,
            longitude: 2.3,
            image: "cities/paris.jpg".into(),
        });
        app.challenges = Some(source);
        app.new_challenge();
        assert_eq!(app.game.challenge(), &ChallengeState::Pending);
        app.reset();
        release.send(()).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while app.fetcher.discarded() == 0 {
            app.poll_background();
            assert!(Instant::now() < deadline, "stale challenge never arrived");
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(app.game.challenge(), &ChallengeState::Empty);
        assert!(app.selection.selected.is_none());
    }

    #[test]
    fn test_new_challenge_before_cities() {
        let mut app = App::new(&Config::default(), 10, 10);
        app.new_challenge();
        assert!(app.notice.is_some());
        assert_eq!(app.game.challenge(), &ChallengeState::Empty);
    }

    #[test]
    fn test_toggles() {
        let mut app = app();
        app.toggle_cities();
        app.toggle_country_labels();
        app.toggle_boundaries();
        let s = &app.map_renderer.settings;
        assert!(!s.show_cities && !s.show_country_labels && !s.show_boundaries);
        app.render_map();
        assert_eq!(app.last_stats().rings, 0);
    }
}
