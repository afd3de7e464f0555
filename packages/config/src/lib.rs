#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Configuration for the taxi profit toolchain.
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then `TAXI_PROFIT_*` environment variables. Command-line flags are
//! applied on top by the binary.
//!
//! ```toml
//! [paths]
//! raw_dir = "data/raw"
//! zone_lookup = "data/taxi_zone_lookup.csv"
//!
//! [model]
//! zone_count = 266
//! fuel_cost_per_distance = 0.6
//!
//! [sampling]
//! fraction = 0.1
//! seed = 42
//! ```

pub mod env;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use taxi_profit_trip_models::{
    DEFAULT_FUEL_COST_PER_DISTANCE, DEFAULT_ZONE_COUNT, MAX_TRIP_DISTANCE,
};

/// Environment variable naming a config file to load.
pub const CONFIG_PATH_VAR: &str = "TAXI_PROFIT_CONFIG";

/// Largest accepted `model.zone_count`.
pub const MAX_ZONE_COUNT: usize = 100_000;

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has unknown keys.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is outside its allowed range.
    #[error("Invalid config value for {key}: {message}")]
    Invalid {
        /// Dotted key, e.g. `sampling.fraction`.
        key: String,
        /// Description of what went wrong.
        message: String,
    },
}

/// File system locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Directory holding raw monthly trip files.
    pub raw_dir: PathBuf,
    /// Directory the sampler writes to.
    pub sampled_dir: PathBuf,
    /// Trip file the profit table is built from.
    pub trips_file: PathBuf,
    /// Optional TLC `taxi_zone_lookup.csv`.
    pub zone_lookup: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            sampled_dir: PathBuf::from("data/sampled"),
            trips_file: PathBuf::from("data/sampled/combined_sampled_data.parquet"),
            zone_lookup: None,
        }
    }
}

/// Profit model and recommendation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Number of zones in the profit table (ids `0..zone_count`).
    pub zone_count: usize,
    /// Fuel cost per unit of distance.
    pub fuel_cost_per_distance: f64,
    /// How many zone ids on either side are considered neighbors.
    pub neighbor_radius: usize,
    /// Ratio the best neighbor must beat the current zone by to move.
    pub move_threshold: f64,
    /// Ranked candidates returned with a recommendation.
    pub top_candidates: usize,
    /// Trips longer than this are dropped while loading.
    pub max_trip_distance: f64,
    /// Only trips picked up in this year are kept, when set.
    pub target_year: Option<i32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            zone_count: DEFAULT_ZONE_COUNT,
            fuel_cost_per_distance: DEFAULT_FUEL_COST_PER_DISTANCE,
            neighbor_radius: 5,
            move_threshold: 1.2,
            top_candidates: 3,
            max_trip_distance: MAX_TRIP_DISTANCE,
            target_year: Some(2025),
        }
    }
}

/// Stratified sampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplingConfig {
    /// Fraction of rows kept, in `(0, 1)`.
    pub fraction: f64,
    /// RNG seed so repeated runs pick the same rows.
    pub seed: u64,
    /// File name prefix of raw monthly files.
    pub raw_file_prefix: String,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            fraction: 0.1,
            seed: 42,
            raw_file_prefix: "yellow_tripdata_".to_string(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// File system locations.
    pub paths: PathsConfig,
    /// Profit model and recommendation parameters.
    pub model: ModelConfig,
    /// Stratified sampling parameters.
    pub sampling: SamplingConfig,
}

impl AppConfig {
    /// Parses a TOML document. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the document is invalid or a value is out
    /// of range.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::de::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Loads configuration from `path` (or `TAXI_PROFIT_CONFIG` when no path
    /// is given), then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a config file is named but unreadable, or
    /// any resulting value is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from);
        let file = path.map(Path::to_path_buf).or(from_env);

        let mut config = match file {
            Some(file) => {
                log::info!("Loading config from {}", file.display());
                Self::from_path(&file)?
            }
            None => Self::default(),
        };

        env::apply_overrides(&mut config, |key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value is within its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fraction = self.sampling.fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(invalid(
                "sampling.fraction",
                format!("{fraction} is not between 0 and 1"),
            ));
        }
        if self.model.zone_count == 0 {
            return Err(invalid("model.zone_count", "must be at least 1"));
        }
        if self.model.zone_count > MAX_ZONE_COUNT {
            return Err(invalid(
                "model.zone_count",
                format!("{} exceeds the maximum of {MAX_ZONE_COUNT}", self.model.zone_count),
            ));
        }
        if !(self.model.fuel_cost_per_distance >= 0.0 && self.model.fuel_cost_per_distance.is_finite()) {
            return Err(invalid(
                "model.fuel_cost_per_distance",
                "must be a finite non-negative number",
            ));
        }
        if !(self.model.move_threshold >= 1.0) {
            return Err(invalid("model.move_threshold", "must be at least 1.0"));
        }
        if self.model.top_candidates == 0 {
            return Err(invalid("model.top_candidates", "must be at least 1"));
        }
        if !(self.model.max_trip_distance > 0.0) {
            return Err(invalid("model.max_trip_distance", "must be positive"));
        }
        Ok(())
    }
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        message: message.into(),
    }
}
