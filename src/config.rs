use clap::Parser;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Guess where a city is on a terminal world map
#[derive(Parser, Debug)]
#[command(name = "tui-geoguess", version, about)]
pub struct Args {
    /// Directory holding countries_shapes.json, cities.json and countries.json
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Base map image (PNG or JPEG); defaults to <data-dir>/world_map.png
    #[arg(long)]
    pub base_map: Option<PathBuf>,

    /// Luma cutoff: base-map pixels at or below it are drawn
    #[arg(long, default_value_t = 96)]
    pub base_map_threshold: u8,

    /// Image for the player's guess marker
    #[arg(long)]
    pub guess_marker: Option<PathBuf>,

    /// Image for the revealed answer marker
    #[arg(long)]
    pub answer_marker: Option<PathBuf>,

    /// Rounds per game
    #[arg(long, default_value_t = 5)]
    pub rounds: u32,

    /// Seed for picking challenge cities (defaults to the clock)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Where log output goes; the terminal is busy drawing the map
    #[arg(long, default_value = "tui-geoguess.log")]
    pub log_file: PathBuf,
}

/// Resolved runtime configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub base_map: PathBuf,
    pub base_map_threshold: u8,
    pub guess_marker: Option<PathBuf>,
    pub answer_marker: Option<PathBuf>,
    pub marker_threshold: u8,
    pub rounds: u32,
    pub seed: u64,
    pub log_file: PathBuf,
}

impl Config {
    pub fn from_args(args: Args) -> Self {
        let seed = args.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        });
        Self {
            base_map: args
                .base_map
                .unwrap_or_else(|| args.data_dir.join("world_map.png")),
            data_dir: args.data_dir,
            base_map_threshold: args.base_map_threshold,
            guess_marker: args.guess_marker,
            answer_marker: args.answer_marker,
            marker_threshold: 200,
            rounds: args.rounds.max(1),
            seed,
            log_file: args.log_file,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_args(Args::parse_from(["tui-geoguess", "--seed", "0"]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.base_map, PathBuf::from("data").join("world_map.png"));
        assert_eq!(config.rounds, 5);
        assert_eq!(config.seed, 0);
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "tui-geoguess",
            "--data-dir",
            "/srv/geo",
            "--base-map",
            "map.jpg",
            "--rounds",
            "0",
            "--seed",
            "42",
        ]);
        let config = Config::from_args(args);
        assert_eq!(config.base_map, PathBuf::from("map.jpg"));
        assert_eq!(config.data_dir, PathBuf::from("/srv/geo"));
        assert_eq!(config.rounds, 1);
        assert_eq!(config.seed, 42);
    }
}
