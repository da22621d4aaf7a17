#![allow(dead_code)]

use tui_geoguess::geo::GeoPoint;
use tui_geoguess::map::{BoundaryFeature, City, CountryLabel};

/// Coarse datasets for scenarios and benches
pub struct SampleWorld {
    pub boundaries: Vec<BoundaryFeature>,
    pub cities: Vec<City>,
    pub country_labels: Vec<CountryLabel>,
}

/// Simplified continent outlines, major cities and a few country names
pub fn sample_world() -> SampleWorld {
    let outline = |coords: &[(f64, f64)]| BoundaryFeature {
        rings: vec![coords.iter().map(|&(lon, lat)| GeoPoint::new(lat, lon)).collect()],
    };

    let boundaries = vec![
        // North America
        outline(&[
            (-168.0, 65.0), (-166.0, 60.0), (-141.0, 60.0), (-130.0, 55.0),
            (-125.0, 48.0), (-124.0, 40.0), (-117.0, 32.0), (-110.0, 25.0),
            (-97.0, 25.0), (-97.0, 28.0), (-82.0, 24.0), (-80.0, 25.0),
            (-81.0, 31.0), (-75.0, 35.0), (-70.0, 41.0), (-67.0, 45.0),
            (-65.0, 47.0), (-55.0, 47.0), (-52.0, 47.0), (-55.0, 52.0),
            (-58.0, 55.0), (-64.0, 60.0), (-73.0, 62.0), (-80.0, 63.0),
            (-95.0, 62.0), (-110.0, 68.0), (-130.0, 70.0), (-145.0, 70.0),
        ]),
        // South America
        outline(&[
            (-80.0, 10.0), (-75.0, 5.0), (-70.0, 5.0), (-60.0, 5.0),
            (-50.0, 0.0), (-35.0, -5.0), (-35.0, -10.0), (-38.0, -15.0),
            (-40.0, -22.0), (-48.0, -25.0), (-55.0, -34.0), (-58.0, -38.0),
            (-65.0, -42.0), (-68.0, -50.0), (-75.0, -52.0), (-75.0, -45.0),
            (-72.0, -40.0), (-72.0, -30.0), (-70.0, -20.0), (-70.0, -15.0),
            (-80.0, -5.0), (-80.0, 0.0),
        ]),
        // Europe
        outline(&[
            (-10.0, 36.0), (-5.0, 36.0), (0.0, 38.0), (5.0, 43.0),
            (10.0, 44.0), (15.0, 45.0), (20.0, 40.0), (25.0, 37.0),
            (30.0, 40.0), (35.0, 42.0), (40.0, 43.0), (40.0, 55.0),
            (30.0, 60.0), (25.0, 65.0), (20.0, 70.0), (10.0, 71.0),
            (5.0, 62.0), (5.0, 58.0), (-5.0, 58.0), (-10.0, 52.0),
            (-5.0, 48.0), (-5.0, 43.0),
        ]),
        // Africa
        outline(&[
            (-17.0, 15.0), (-17.0, 20.0), (-15.0, 28.0), (-5.0, 35.0),
            (10.0, 37.0), (20.0, 33.0), (25.0, 32.0), (35.0, 30.0),
            (35.0, 20.0), (42.0, 12.0), (50.0, 12.0), (45.0, 5.0),
            (35.0, -5.0), (35.0, -20.0), (35.0, -25.0), (30.0, -30.0),
            (20.0, -35.0), (18.0, -35.0), (15.0, -30.0), (10.0, -15.0),
            (10.0, 0.0), (5.0, 5.0), (-5.0, 5.0), (-10.0, 10.0),
        ]),
        // Australia
        outline(&[
            (115.0, -20.0), (120.0, -18.0), (130.0, -12.0), (140.0, -12.0),
            (145.0, -15.0), (150.0, -25.0), (153.0, -30.0), (150.0, -35.0),
            (145.0, -38.0), (140.0, -38.0), (135.0, -35.0), (130.0, -32.0),
            (125.0, -32.0), (115.0, -35.0), (115.0, -25.0),
        ]),
    ];

    let city = |name: &str, country: &str, lat: f64, lon: f64, population: u64| City {
        name: name.to_string(),
        location: GeoPoint::new(lat, lon),
        population,
        country: Some(country.to_string()),
    };
    let cities = vec![
        city("New York", "United States", 40.7, -74.0, 18_800_000),
        city("London", "United Kingdom", 51.5, -0.1, 9_000_000),
        city("Paris", "France", 48.9, 2.3, 11_000_000),
        city("Tokyo", "Japan", 35.7, 139.7, 37_400_000),
        city("Sydney", "Australia", -33.9, 151.2, 5_300_000),
        city("Rio de Janeiro", "Brazil", -22.9, -43.2, 13_500_000),
        city("Moscow", "Russia", 55.8, 37.6, 12_500_000),
        city("Delhi", "India", 28.6, 77.2, 32_900_000),
        city("Mexico City", "Mexico", 19.4, -99.1, 21_800_000),
        city("Cairo", "Egypt", 30.0, 31.2, 21_300_000),
        city("Lagos", "Nigeria", 6.5, 3.4, 15_400_000),
    ];

    let label = |name: &str, lat: f64, lon: f64, label_rank: f64| CountryLabel {
        name: name.to_string(),
        location: GeoPoint::new(lat, lon),
        label_rank,
    };
    let country_labels = vec![
        label("United States", 39.5, -98.5, 2.0),
        label("Brazil", -10.0, -52.0, 2.0),
        label("Australia", -25.0, 134.0, 2.0),
        label("India", 22.0, 79.0, 2.0),
        label("France", 46.5, 2.5, 3.0),
        label("Egypt", 26.5, 30.0, 4.0),
    ];

    SampleWorld {
        boundaries,
        cities,
        country_labels,
    }
}
