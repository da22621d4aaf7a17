#[path = "../tests/common/mod.rs"]
mod common;

use common::sample_world;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::DVec2;

use tui_geoguess::canvas::{BrailleSurface, RecordingSurface};
use tui_geoguess::geo::{GeoPoint, ScreenPoint};
use tui_geoguess::interaction::SelectionState;
use tui_geoguess::map::{City, LabelPlacer, MapRenderer, Projection, RenderStyle, Scene, Viewport};

fn dense_cities() -> Vec<City> {
    (0..500)
        .map(|i| City {
            name: format!("City {i}"),
            location: GeoPoint::new(35.0 + (i % 25) as f64 * 0.8, -10.0 + (i / 25) as f64 * 2.0),
            population: 250_000 + i as u64 * 10_000,
            country: None,
        })
        .collect()
}

fn bench_projection(c: &mut Criterion) {
    let projection = Projection::default();
    let viewport = Viewport::new(DVec2::new(-1200.0, -300.0), 3.5);
    c.bench_function("project_to_screen_10k", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for i in 0..10_000 {
                let geo = GeoPoint::new((i % 180) as f64 - 90.0, (i % 360) as f64 - 180.0);
                let screen = viewport.map_to_screen(projection.project(black_box(geo)));
                acc += screen.x + screen.y;
            }
            acc
        })
    });
}

fn bench_label_placement(c: &mut Criterion) {
    let mut placer = LabelPlacer::default();
    c.bench_function("place_labels_500", |b| {
        b.iter(|| {
            placer.begin_pass();
            for i in 0..500 {
                let anchor = ScreenPoint::new((i % 25) as f64 * 40.0, (i / 25) as f64 * 30.0);
                black_box(placer.place(anchor, DVec2::new(60.0, 15.0)));
            }
        })
    });
}

fn bench_render(c: &mut Criterion) {
    let world = sample_world();
    let selection = SelectionState::default();
    let viewport = Viewport::new(DVec2::new(-2200.0, -500.0), 1.6);

    let mut recording_renderer = MapRenderer::new(Projection::default(), RenderStyle::default());
    recording_renderer.set_boundaries(world.boundaries.clone());
    recording_renderer.set_cities(dense_cities());
    recording_renderer.set_country_labels(world.country_labels.clone());
    let mut recording = RecordingSurface::new(1600.0, 900.0);
    c.bench_function("render_recording", |b| {
        b.iter(|| {
            let scene = Scene { viewport: &viewport, selection: &selection, answer: None };
            black_box(recording_renderer.render(&mut recording, &scene))
        })
    });

    let mut braille_renderer = MapRenderer::new(Projection::default(), RenderStyle::braille());
    braille_renderer.set_boundaries(world.boundaries);
    braille_renderer.set_cities(dense_cities());
    braille_renderer.set_country_labels(world.country_labels);
    let mut braille = BrailleSurface::new(200, 60);
    let braille_viewport = Viewport::new(DVec2::ZERO, 400.0 / 5400.0);
    c.bench_function("render_braille", |b| {
        b.iter(|| {
            let scene = Scene { viewport: &braille_viewport, selection: &selection, answer: None };
            black_box(braille_renderer.render(&mut braille, &scene))
        })
    });
}

criterion_group!(benches, bench_projection, bench_label_placement, bench_render);
criterion_main!(benches);
