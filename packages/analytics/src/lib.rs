#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Zone × hour profit engine.
//!
//! Turns cleaned [`Trip`]s into a dense [`ProfitTable`] of expected
//! per-trip profit and answers queries over it:
//!
//! 1. [`profit::ProfitCalculator`] prices each trip (fare + tip − fuel).
//! 2. [`aggregate::ZoneHourAggregator`] reduces trips to per-`(zone, hour)`
//!    means and counts.
//! 3. [`ProfitTable`] densifies the sparse stats into `zone_count × 24`
//!    cells, marking unobserved cells as empty.
//! 4. [`recommend::RecommendationEngine`] ranks nearby zones for the next
//!    hour and decides whether moving is worth it.
//!
//! The table is immutable once built. Rebuilding on new data produces a new
//! table, so readers holding a reference never see a partial one.

pub mod aggregate;
pub mod demand;
pub mod insights;
pub mod profit;
pub mod recommend;
pub mod table;

use taxi_profit_analytics_models::RecommendationResult;
use taxi_profit_trip_models::{HOURS_PER_DAY, Trip};
use thiserror::Error;

pub use table::ProfitTable;

/// Which index of the table a bad value was given for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Zone id.
    Zone,
    /// Hour of day.
    Hour,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zone => write!(f, "zone"),
            Self::Hour => write!(f, "hour"),
        }
    }
}

/// Errors that can occur during analytics queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    /// An index lies outside the table bounds.
    #[error("{axis} {value} is out of range (expected 0..{bound})")]
    OutOfRange {
        /// Which index was bad.
        axis: Axis,
        /// The value given.
        value: i64,
        /// Exclusive upper bound.
        bound: usize,
    },
}

/// Hour slot following `hour`, wrapping 23 → 0.
#[must_use]
pub const fn next_hour(hour: u32) -> u32 {
    (hour + 1) % HOURS_PER_DAY as u32
}

/// Builds a profit table from trips.
///
/// Trips whose zone falls outside `0..zone_count` are counted and reported
/// in the log but cannot be placed in the table.
#[must_use]
pub fn compute_table(trips: &[Trip], fuel_rate: f64, zone_count: usize) -> ProfitTable {
    let calculator = profit::ProfitCalculator::new(fuel_rate);
    let stats = aggregate::aggregate(trips.iter().map(|t| calculator.trip_profit(t)));
    log::debug!(
        "Aggregated {} trips into {} zone/hour groups",
        trips.len(),
        stats.len()
    );
    ProfitTable::from_stats(&stats, zone_count)
}

/// Recommends whether to move from `zone` at `hour`, searching `radius`
/// zone ids on either side. Zone names fall back to `"Zone {id}"`.
///
/// # Errors
///
/// Returns [`AnalyticsError::OutOfRange`] if `zone` or `hour` is outside the
/// table.
pub fn recommend(
    table: &ProfitTable,
    zone: i64,
    hour: i64,
    radius: usize,
) -> Result<RecommendationResult, AnalyticsError> {
    recommend::RecommendationEngine::new(table)
        .with_radius(radius)
        .recommend(zone, hour)
}

/// Expected profit for `(zone, hour)`, [`FILL_VALUE`] when unobserved.
///
/// [`FILL_VALUE`]: taxi_profit_analytics_models::FILL_VALUE
///
/// # Errors
///
/// Returns [`AnalyticsError::OutOfRange`] if `zone` or `hour` is outside the
/// table.
pub fn lookup(table: &ProfitTable, zone: i64, hour: i64) -> Result<f64, AnalyticsError> {
    table.get(zone, hour)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::trip;

    #[test]
    fn next_hour_wraps_at_midnight() {
        assert_eq!(next_hour(5), 6);
        assert_eq!(next_hour(23), 0);
    }

    #[test]
    fn end_to_end_mean_of_two_trips() {
        let trips = vec![
            trip(10, 5, 20.0, Some(5.0), 10.0),
            trip(10, 5, 10.0, Some(0.0), 5.0),
        ];
        let table = compute_table(&trips, 0.6, 266);

        assert!((lookup(&table, 10, 5).unwrap() - 13.0).abs() < 1e-9);
        assert_eq!(table.trip_count(10, 5).unwrap(), 2);
        assert!(table.has_data(10, 5).unwrap());
        assert!(!table.has_data(10, 6).unwrap());
    }

    #[test]
    fn lookup_rejects_out_of_range_indices() {
        let table = compute_table(&[], 0.6, 266);

        assert_eq!(
            lookup(&table, -1, 0),
            Err(AnalyticsError::OutOfRange {
                axis: Axis::Zone,
                value: -1,
                bound: 266,
            })
        );
        assert_eq!(
            lookup(&table, 0, 24),
            Err(AnalyticsError::OutOfRange {
                axis: Axis::Hour,
                value: 24,
                bound: 24,
            })
        );
        assert_eq!(
            lookup(&table, 266, 0).unwrap_err().to_string(),
            "zone 266 is out of range (expected 0..266)"
        );
    }

    #[test]
    fn recommend_uses_next_hour_slot() {
        let trips = vec![
            trip(100, 15, 10.0, None, 0.0),
            trip(103, 15, 20.0, None, 0.0),
            // same zone, current hour: must not influence the decision
            trip(103, 14, 90.0, None, 0.0),
        ];
        let table = compute_table(&trips, 0.6, 266);
        let result = recommend(&table, 100, 14, 5).unwrap();

        assert_eq!(result.next_hour, 15);
        assert_eq!(result.candidates[0].zone, 103);
        assert_eq!(result.candidates[0].zone_name, "Zone 103");
        assert!((result.candidates[0].expected_profit - 20.0).abs() < 1e-9);
    }

    #[test]
    fn trips_outside_zone_bound_are_not_placed() {
        let trips = vec![trip(300, 1, 10.0, None, 0.0), trip(3, 1, 10.0, None, 0.0)];
        let table = compute_table(&trips, 0.6, 266);
        assert_eq!(table.total_trips(), 1);
        assert_eq!(table.unplaced_trips(), 1);
    }
}
