use anyhow::{Context, Result};
use geojson::{GeoJson, Geometry, Value};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::canvas::Sprite;
use crate::config::Config;
use crate::geo::GeoPoint;
use crate::map::{BoundaryFeature, City, CountryLabel};

/// Country outlines (GeoJSON FeatureCollection)
pub const BOUNDARIES_FILE: &str = "countries_shapes.json";
/// Array of city records
pub const CITIES_FILE: &str = "cities.json";
/// Array of country label records
pub const COUNTRY_LABELS_FILE: &str = "countries.json";

/// A dataset or image that finished loading in the background
pub enum DataEvent {
    Boundaries(Vec<BoundaryFeature>),
    Cities(Vec<City>),
    CountryLabels(Vec<CountryLabel>),
    BaseMap(Sprite),
    GuessMarker(Sprite),
    AnswerMarker(Sprite),
}

/// Start loading every dataset on a worker thread. Each one is sent as soon
/// as it is ready; anything that fails is logged and never sent.
pub fn spawn_loader(config: &Config) -> Result<Receiver<DataEvent>> {
    let (tx, rx) = mpsc::channel();
    let config = config.clone();
    thread::Builder::new()
        .name("geo-loader".into())
        .spawn(move || load_all(&config, &tx))
        .context("spawning loader thread")?;
    Ok(rx)
}

fn load_all(config: &Config, tx: &Sender<DataEvent>) {
    // A closed channel only means the app is shutting down
    let send = |event| {
        let _ = tx.send(event);
    };

    if let Some(path) = &config.guess_marker {
        match Sprite::load(path, config.marker_threshold) {
            Ok(sprite) => send(DataEvent::GuessMarker(sprite)),
            Err(e) => log::warn!("guess marker {}: {e:#}", path.display()),
        }
    }
    if let Some(path) = &config.answer_marker {
        match Sprite::load(path, config.marker_threshold) {
            Ok(sprite) => send(DataEvent::AnswerMarker(sprite)),
            Err(e) => log::warn!("answer marker {}: {e:#}", path.display()),
        }
    }

    let data_dir = &config.data_dir;
    match load_boundaries(&data_dir.join(BOUNDARIES_FILE)) {
        Ok(features) => {
            log::info!("loaded {} boundary features", features.len());
            send(DataEvent::Boundaries(features));
        }
        Err(e) => log::warn!("boundaries unavailable: {e:#}"),
    }
    match load_cities(&data_dir.join(CITIES_FILE)) {
        Ok(cities) => {
            log::info!("loaded {} cities", cities.len());
            send(DataEvent::Cities(cities));
        }
        Err(e) => log::warn!("cities unavailable: {e:#}"),
    }
    match load_country_labels(&data_dir.join(COUNTRY_LABELS_FILE)) {
        Ok(labels) => {
            log::info!("loaded {} country labels", labels.len());
            send(DataEvent::CountryLabels(labels));
        }
        Err(e) => log::warn!("country labels unavailable: {e:#}"),
    }

    // The base map is by far the largest file, so it comes last
    match Sprite::load(&config.base_map, config.base_map_threshold) {
        Ok(sprite) => {
            log::info!("base map {}x{}", sprite.width(), sprite.height());
            send(DataEvent::BaseMap(sprite));
        }
        Err(e) => log::warn!("base map {}: {e:#}", config.base_map.display()),
    }
}

/// Load country boundary GeoJSON data
pub fn load_boundaries(path: &Path) -> Result<Vec<BoundaryFeature>> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_boundaries(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Load the city list
pub fn load_cities(path: &Path) -> Result<Vec<City>> {
    let mut bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    parse_cities(&mut bytes).with_context(|| format!("parsing {}", path.display()))
}

/// Load country label anchors
pub fn load_country_labels(path: &Path) -> Result<Vec<CountryLabel>> {
    let mut bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    parse_country_labels(&mut bytes).with_context(|| format!("parsing {}", path.display()))
}

/// Extract Polygon/MultiPolygon features; every other geometry is skipped
pub fn parse_boundaries(content: &str) -> Result<Vec<BoundaryFeature>> {
    let geojson: GeoJson = content.parse()?;
    let mut features = Vec::new();
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in fc.features {
                if let Some(geometry) = feature.geometry {
                    features.extend(boundary_from_geometry(&geometry));
                }
            }
        }
        GeoJson::Feature(f) => {
            if let Some(geometry) = f.geometry {
                features.extend(boundary_from_geometry(&geometry));
            }
        }
        GeoJson::Geometry(geometry) => features.extend(boundary_from_geometry(&geometry)),
    }
    Ok(features)
}

fn boundary_from_geometry(geometry: &Geometry) -> Option<BoundaryFeature> {
    let to_ring = |coords: &Vec<Vec<f64>>| -> Vec<GeoPoint> {
        coords
            .iter()
            .filter(|c| c.len() >= 2)
            .map(|c| GeoPoint::new(c[1], c[0])) // GeoJSON => [lon, lat]
            .collect()
    };

    let rings = match &geometry.value {
        Value::Polygon(rings) => rings.iter().map(to_ring).collect(),
        Value::MultiPolygon(polygons) => polygons.iter().flatten().map(to_ring).collect(),
        _ => return None,
    };
    Some(BoundaryFeature { rings })
}

#[derive(Deserialize)]
struct CityRecord {
    #[serde(alias = "city")]
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    population: Option<f64>,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Deserialize)]
struct CountryLabelRecord {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(rename = "labelrank", alias = "labelRank")]
    label_rank: f64,
}

fn valid_location(lat: f64, lon: f64) -> Option<GeoPoint> {
    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)).then(|| GeoPoint::new(lat, lon))
}

/// Parse a JSON array of cities, keeping dataset order.
/// Missing populations count as zero; out-of-range coordinates are dropped.
pub fn parse_cities(bytes: &mut [u8]) -> Result<Vec<City>> {
    let records: Vec<CityRecord> = simd_json::serde::from_slice(bytes)?;
    let total = records.len();
    let cities: Vec<City> = records
        .into_iter()
        .filter_map(|r| {
            Some(City {
                location: valid_location(r.latitude, r.longitude)?,
                name: r.name,
                population: r.population.filter(|p| p.is_finite() && *p > 0.0).map_or(0, |p| p as u64),
                country: r.country,
            })
        })
        .collect();
    if cities.len() < total {
        log::debug!("dropped {} cities with invalid coordinates", total - cities.len());
    }
    Ok(cities)
}

/// Parse a JSON array of country label anchors
pub fn parse_country_labels(bytes: &mut [u8]) -> Result<Vec<CountryLabel>> {
    let records: Vec<CountryLabelRecord> = simd_json::serde::from_slice(bytes)?;
    Ok(records
        .into_iter()
        .filter_map(|r| {
            Some(CountryLabel {
                location: valid_location(r.latitude, r.longitude)?,
                name: r.name,
                label_rank: r.label_rank,
            })
        })
        .collect())
}
