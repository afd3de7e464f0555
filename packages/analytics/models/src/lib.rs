#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result types for the zone × hour profit engine.
//!
//! These are the values the analytics crate hands to presentation layers:
//! per-cell statistics, ranked recommendations, and the insight summaries
//! shown alongside them. All of them serialize to camelCase JSON.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use taxi_profit_trip_models::HOURS_PER_DAY;

/// Profit reported for a cell with no observed trips.
pub const FILL_VALUE: f64 = 0.0;

/// Profit of a single trip, keyed for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripProfit {
    /// Pickup zone id.
    pub zone: i64,
    /// Pickup hour, `0..24`.
    pub hour: u32,
    /// Revenue minus cost.
    pub profit: f64,
}

/// Aggregate over all trips sharing a `(zone, hour)` key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneHourStat {
    /// Pickup zone id.
    pub zone: i64,
    /// Pickup hour, `0..24`.
    pub hour: u32,
    /// Mean profit per trip.
    pub mean_profit: f64,
    /// Number of trips in the group (always at least 1).
    pub trip_count: u64,
}

/// One cell of the profit table.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Cell {
    /// At least one trip was observed.
    #[serde(rename_all = "camelCase")]
    Observed {
        /// Mean profit per trip.
        mean_profit: f64,
        /// Number of trips observed.
        trip_count: u64,
    },
    /// No trips were observed.
    #[default]
    Empty,
}

impl Cell {
    /// Expected profit, or [`FILL_VALUE`] for an empty cell.
    #[must_use]
    pub const fn profit(&self) -> f64 {
        match self {
            Self::Observed { mean_profit, .. } => *mean_profit,
            Self::Empty => FILL_VALUE,
        }
    }

    /// Trips observed, zero for an empty cell.
    #[must_use]
    pub const fn trip_count(&self) -> u64 {
        match self {
            Self::Observed { trip_count, .. } => *trip_count,
            Self::Empty => 0,
        }
    }

    /// Whether any trips were observed.
    #[must_use]
    pub const fn is_observed(&self) -> bool {
        matches!(self, Self::Observed { .. })
    }
}

impl From<&ZoneHourStat> for Cell {
    fn from(stat: &ZoneHourStat) -> Self {
        Self::Observed {
            mean_profit: stat.mean_profit,
            trip_count: stat.trip_count,
        }
    }
}

/// The most profitable cell of the whole table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestCell {
    /// Zone id.
    pub zone: i64,
    /// Hour, `0..24`.
    pub hour: u32,
    /// Expected profit.
    pub profit: f64,
}

/// The most profitable hour for one zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestHour {
    /// Hour, `0..24`.
    pub hour: u32,
    /// Expected profit.
    pub profit: f64,
}

/// A ranked candidate zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// Candidate zone id.
    pub zone: i64,
    /// Display name, `"Zone {id}"` when unknown.
    pub zone_name: String,
    /// Expected profit in the next hour.
    pub expected_profit: f64,
    /// Whether the profit is backed by observed trips.
    pub observed: bool,
}

/// Whether to stay put or move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Decision {
    /// No neighbor is enough better than the current zone.
    Stay,
    /// Move to the best neighbor.
    #[serde(rename_all = "camelCase")]
    Move {
        /// Destination zone id.
        zone: i64,
        /// Destination display name.
        zone_name: String,
        /// Expected profit at the destination.
        expected_profit: f64,
        /// Percentage improvement over staying. `None` when the current
        /// zone's expected profit is not positive, where a ratio is
        /// meaningless.
        improvement_pct: Option<f64>,
    },
    /// No neighbors exist (fewer than two zones).
    Unavailable,
}

/// Output of a recommendation query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    /// Zone the driver is in.
    pub current_zone: i64,
    /// Hour the query was made for.
    pub current_hour: u32,
    /// Hour slot candidates were evaluated in.
    pub next_hour: u32,
    /// Expected profit of staying in the current zone next hour.
    pub current_next_profit: f64,
    /// Top ranked neighbors, best first.
    pub candidates: Vec<Recommendation>,
    /// Stay/move verdict.
    pub decision: Decision,
    /// Set when even the best neighbor has no positive expected profit.
    pub limited_data: bool,
}

/// Expected profit of one hour in a zone's daily profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourProfit {
    /// Hour, `0..24`.
    pub hour: u32,
    /// Expected profit.
    pub expected_profit: f64,
    /// Whether trips were observed.
    pub observed: bool,
}

/// Expected profit of one zone at a fixed hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneProfit {
    /// Zone id.
    pub zone: i64,
    /// Display name.
    pub zone_name: String,
    /// Expected profit.
    pub expected_profit: f64,
    /// Whether trips were observed.
    pub observed: bool,
}

/// How the current hour compares to the zone's best hour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Efficiency {
    /// Current profit as a percentage of the best hour's profit.
    pub percent: f64,
    /// Current profit minus the best hour's profit.
    pub delta: f64,
    /// The zone's best hour.
    pub best: BestHour,
}

/// Dataset-level figures shown above the table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitSummary {
    /// Trips that went into the table.
    pub total_trips: u64,
    /// Mean profit over all trips, `None` with no trips.
    pub average_profit: Option<f64>,
    /// Cells backed by at least one trip.
    pub observed_cells: usize,
    /// Zones in the table.
    pub zone_count: usize,
}

/// Ride counts for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthCount {
    /// Calendar year.
    pub year: i32,
    /// Month, `1..=12`.
    pub month: u32,
    /// Rides picked up in the month.
    pub count: u64,
}

/// Ride counts for one Monday–Sunday week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekCount {
    /// The Sunday that closes the week.
    pub week_ending: NaiveDate,
    /// Rides picked up during the week.
    pub count: u64,
}

/// Rides whose distance falls in `[lower, upper)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceBin {
    /// Display label such as `"5-10"`.
    pub label: String,
    /// Inclusive lower edge.
    pub lower: f64,
    /// Exclusive upper edge.
    pub upper: f64,
    /// Rides in the bin.
    pub count: u64,
}

/// Pickups in one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneCount {
    /// Pickup zone id.
    pub zone: i64,
    /// Display name.
    pub zone_name: String,
    /// Borough, when known.
    pub borough: Option<String>,
    /// Rides picked up in the zone.
    pub count: u64,
}

/// Pickups in one borough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoroughCount {
    /// Borough name, `"Unknown"` for zones without one.
    pub borough: String,
    /// Rides picked up in the borough.
    pub count: u64,
}

/// Busiest pickup zones and boroughs, most pickups first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupHotspots {
    /// Top zones.
    pub zones: Vec<ZoneCount>,
    /// Top boroughs.
    pub boroughs: Vec<BoroughCount>,
}

/// When rides happen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandSummary {
    /// Rides per pickup hour.
    pub by_hour: [u64; HOURS_PER_DAY],
    /// Monday–Friday rides per pickup hour.
    pub weekday_by_hour: [u64; HOURS_PER_DAY],
    /// Saturday–Sunday rides per pickup hour.
    pub weekend_by_hour: [u64; HOURS_PER_DAY],
    /// Rides per month, chronological.
    pub by_month: Vec<MonthCount>,
    /// Rides per week from the first to the last pickup, empty weeks
    /// included.
    pub by_week: Vec<WeekCount>,
    /// Rides per trip-distance range.
    pub distance_bins: Vec<DistanceBin>,
    /// Rides whose distance fits no bin.
    pub unbinned_distance: u64,
}

impl Default for DemandSummary {
    fn default() -> Self {
        Self {
            by_hour: [0; HOURS_PER_DAY],
            weekday_by_hour: [0; HOURS_PER_DAY],
            weekend_by_hour: [0; HOURS_PER_DAY],
            by_month: Vec::new(),
            by_week: Vec::new(),
            distance_bins: Vec::new(),
            unbinned_distance: 0,
        }
    }
}

impl DemandSummary {
    /// Hour with the most rides, earliest on ties. `None` with no rides.
    #[must_use]
    pub fn peak_hour(&self) -> Option<u32> {
        let (hour, &count) = self
            .by_hour
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, &u64)>, (h, c)| match best {
                Some((_, bc)) if c <= bc => best,
                _ => Some((h, c)),
            })?;
        if count == 0 {
            return None;
        }
        u32::try_from(hour).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cell_reads_as_fill_value() {
        let cell = Cell::Empty;
        assert!(cell.profit().abs() < f64::EPSILON);
        assert_eq!(cell.trip_count(), 0);
        assert!(!cell.is_observed());
    }

    #[test]
    fn observed_zero_profit_is_distinct_from_empty() {
        let cell = Cell::Observed {
            mean_profit: 0.0,
            trip_count: 4,
        };
        assert!(cell.is_observed());
        assert_ne!(cell, Cell::Empty);
        assert_eq!(cell.trip_count(), 4);
    }

    #[test]
    fn decision_serializes_with_kind_tag() {
        let json = serde_json::to_value(Decision::Move {
            zone: 163,
            zone_name: "Midtown North".to_string(),
            expected_profit: 13.0,
            improvement_pct: Some(30.0),
        })
        .unwrap();
        assert_eq!(json["kind"], "move");
        assert_eq!(json["zoneName"], "Midtown North");
        assert_eq!(json["improvementPct"], 30.0);

        let stay = serde_json::to_value(Decision::Stay).unwrap();
        assert_eq!(stay["kind"], "stay");
    }

    #[test]
    fn peak_hour_prefers_earliest_tie() {
        let mut demand = DemandSummary::default();
        assert_eq!(demand.peak_hour(), None);

        demand.by_hour[8] = 5;
        demand.by_hour[17] = 5;
        demand.by_hour[3] = 1;
        assert_eq!(demand.peak_hour(), Some(8));
    }
}
