//! `TAXI_PROFIT_*` environment overrides.
//!
//! Each override maps one environment variable onto one config key. The
//! variable lookup is passed in so callers (and tests) control where values
//! come from.

use std::path::PathBuf;
use std::str::FromStr;

use crate::{AppConfig, ConfigError};

/// Raw trip file directory.
pub const RAW_DIR: &str = "TAXI_PROFIT_RAW_DIR";
/// Sampler output directory.
pub const SAMPLED_DIR: &str = "TAXI_PROFIT_SAMPLED_DIR";
/// Trip file used to build the profit table.
pub const TRIPS_FILE: &str = "TAXI_PROFIT_TRIPS_FILE";
/// Zone lookup CSV.
pub const ZONE_LOOKUP: &str = "TAXI_PROFIT_ZONE_LOOKUP";
/// Number of zones.
pub const ZONE_COUNT: &str = "TAXI_PROFIT_ZONE_COUNT";
/// Fuel cost per distance unit.
pub const FUEL_RATE: &str = "TAXI_PROFIT_FUEL_RATE";
/// Neighbor radius.
pub const NEIGHBOR_RADIUS: &str = "TAXI_PROFIT_NEIGHBOR_RADIUS";
/// Target pickup year; `any` disables the year filter.
pub const TARGET_YEAR: &str = "TAXI_PROFIT_TARGET_YEAR";
/// Sample fraction.
pub const SAMPLE_FRACTION: &str = "TAXI_PROFIT_SAMPLE_FRACTION";
/// Sampling seed.
pub const SEED: &str = "TAXI_PROFIT_SEED";

/// Applies every override whose variable `lookup` returns a value for.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if a variable holds an unparseable value.
pub fn apply_overrides(
    config: &mut AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(v) = lookup(RAW_DIR) {
        config.paths.raw_dir = PathBuf::from(v);
    }
    if let Some(v) = lookup(SAMPLED_DIR) {
        config.paths.sampled_dir = PathBuf::from(v);
    }
    if let Some(v) = lookup(TRIPS_FILE) {
        config.paths.trips_file = PathBuf::from(v);
    }
    if let Some(v) = lookup(ZONE_LOOKUP) {
        config.paths.zone_lookup = Some(PathBuf::from(v));
    }
    if let Some(v) = lookup(ZONE_COUNT) {
        config.model.zone_count = parse(ZONE_COUNT, &v)?;
    }
    if let Some(v) = lookup(FUEL_RATE) {
        config.model.fuel_cost_per_distance = parse(FUEL_RATE, &v)?;
    }
    if let Some(v) = lookup(NEIGHBOR_RADIUS) {
        config.model.neighbor_radius = parse(NEIGHBOR_RADIUS, &v)?;
    }
    if let Some(v) = lookup(TARGET_YEAR) {
        config.model.target_year = if v.eq_ignore_ascii_case("any") {
            None
        } else {
            Some(parse(TARGET_YEAR, &v)?)
        };
    }
    if let Some(v) = lookup(SAMPLE_FRACTION) {
        config.sampling.fraction = parse(SAMPLE_FRACTION, &v)?;
    }
    if let Some(v) = lookup(SEED) {
        config.sampling.seed = parse(SEED, &v)?;
    }
    Ok(())
}

fn parse<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| ConfigError::Invalid {
        key: var.to_string(),
        message: format!("{value:?}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn overrides_selected_keys() {
        let mut config = AppConfig::default();
        apply_overrides(
            &mut config,
            lookup_from(&[
                (ZONE_COUNT, "300"),
                (FUEL_RATE, "0.75"),
                (SEED, "7"),
                (ZONE_LOOKUP, "/tmp/zones.csv"),
            ]),
        )
        .unwrap();

        assert_eq!(config.model.zone_count, 300);
        assert!((config.model.fuel_cost_per_distance - 0.75).abs() < f64::EPSILON);
        assert_eq!(config.sampling.seed, 7);
        assert_eq!(
            config.paths.zone_lookup,
            Some(PathBuf::from("/tmp/zones.csv"))
        );
        assert_eq!(config.model.neighbor_radius, 5);
    }

    #[test]
    fn any_year_disables_filter() {
        let mut config = AppConfig::default();
        apply_overrides(&mut config, lookup_from(&[(TARGET_YEAR, "ANY")])).unwrap();
        assert_eq!(config.model.target_year, None);
    }

    #[test]
    fn unparseable_value_names_variable() {
        let mut config = AppConfig::default();
        let err = apply_overrides(&mut config, lookup_from(&[(ZONE_COUNT, "many")])).unwrap_err();
        assert!(matches!(&err, ConfigError::Invalid { key, .. } if key == ZONE_COUNT));
    }
}
