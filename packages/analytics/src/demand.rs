//! Ride counts by hour, weekday/weekend, month, week, trip distance and
//! pickup location.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use taxi_profit_analytics_models::{
    BoroughCount, DemandSummary, DistanceBin, MonthCount, PickupHotspots, WeekCount, ZoneCount,
};
use taxi_profit_trip_models::{DayType, Trip};
use taxi_profit_zones::ZoneDirectory;

/// Edges of the trip-distance bins. Each bin is `[edges[i], edges[i + 1])`.
pub const DISTANCE_BIN_EDGES: [f64; 7] = [0.0, 5.0, 10.0, 20.0, 30.0, 50.0, 100.0];

/// Pickup zones listed by default.
pub const TOP_PICKUP_ZONES: usize = 30;

/// Pickup boroughs listed by default.
pub const TOP_PICKUP_BOROUGHS: usize = 5;

/// Borough reported for zones the directory has no borough for.
pub const UNKNOWN_BOROUGH: &str = "Unknown";

const WEEK: Days = Days::new(7);

/// The Sunday closing the Monday–Sunday week that contains `date`.
fn week_ending(date: NaiveDate) -> Option<NaiveDate> {
    let to_sunday = 6 - u64::from(date.weekday().num_days_from_monday());
    date.checked_add_days(Days::new(to_sunday))
}

/// Weekly counts from the first to the last week, gaps filled with zero.
fn weekly_series(weeks: &BTreeMap<NaiveDate, u64>) -> Vec<WeekCount> {
    let (Some((&first, _)), Some((&last, _))) = (weeks.first_key_value(), weeks.last_key_value())
    else {
        return Vec::new();
    };

    let mut series = Vec::new();
    let mut week = Some(first);
    while let Some(current) = week.filter(|w| *w <= last) {
        series.push(WeekCount {
            week_ending: current,
            count: weeks.get(&current).copied().unwrap_or(0),
        });
        week = current.checked_add_days(WEEK);
    }
    series
}

/// Index of the distance bin holding `distance`.
fn distance_bin(distance: f64) -> Option<usize> {
    DISTANCE_BIN_EDGES
        .windows(2)
        .position(|edge| distance >= edge[0] && distance < edge[1])
}

fn empty_distance_bins() -> Vec<DistanceBin> {
    DISTANCE_BIN_EDGES
        .windows(2)
        .map(|edge| DistanceBin {
            label: format!("{}-{}", edge[0], edge[1]),
            lower: edge[0],
            upper: edge[1],
            count: 0,
        })
        .collect()
}

/// Counts rides by pickup hour, weekday vs weekend, calendar month, week
/// and trip-distance range.
#[must_use]
pub fn demand_summary(trips: &[Trip]) -> DemandSummary {
    let mut summary = DemandSummary {
        distance_bins: empty_distance_bins(),
        ..DemandSummary::default()
    };
    let mut months: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    let mut weeks: BTreeMap<NaiveDate, u64> = BTreeMap::new();

    for trip in trips {
        let hour = trip.pickup_hour() as usize;
        summary.by_hour[hour] += 1;
        match trip.day_type() {
            DayType::Weekday => summary.weekday_by_hour[hour] += 1,
            DayType::Weekend => summary.weekend_by_hour[hour] += 1,
        }
        *months
            .entry((trip.pickup_year(), trip.pickup_month()))
            .or_default() += 1;
        if let Some(week) = week_ending(trip.pickup_at.date()) {
            *weeks.entry(week).or_default() += 1;
        }
        match distance_bin(trip.trip_distance) {
            Some(bin) => summary.distance_bins[bin].count += 1,
            None => summary.unbinned_distance += 1,
        }
    }

    summary.by_month = months
        .into_iter()
        .map(|((year, month), count)| MonthCount { year, month, count })
        .collect();
    summary.by_week = weekly_series(&weeks);

    summary
}

/// The `zone_limit` busiest pickup zones and `borough_limit` busiest
/// boroughs. Ties go to the lower zone id or the borough name first in
/// alphabetical order.
#[must_use]
pub fn pickup_hotspots(
    trips: &[Trip],
    zones: &ZoneDirectory,
    zone_limit: usize,
    borough_limit: usize,
) -> PickupHotspots {
    let mut by_zone: BTreeMap<i64, u64> = BTreeMap::new();
    for trip in trips {
        *by_zone.entry(trip.pickup_zone).or_default() += 1;
    }

    let mut by_borough: BTreeMap<String, u64> = BTreeMap::new();
    for (&zone, &count) in &by_zone {
        let borough = zones
            .get(zone)
            .and_then(|info| info.borough.clone())
            .unwrap_or_else(|| UNKNOWN_BOROUGH.to_string());
        *by_borough.entry(borough).or_default() += count;
    }

    let mut top_zones: Vec<(i64, u64)> = by_zone.into_iter().collect();
    top_zones.sort_by_key(|&(zone, count)| (Reverse(count), zone));
    top_zones.truncate(zone_limit);

    let mut boroughs: Vec<BoroughCount> = by_borough
        .into_iter()
        .map(|(borough, count)| BoroughCount { borough, count })
        .collect();
    boroughs.sort_by_key(|b| Reverse(b.count));
    boroughs.truncate(borough_limit);

    PickupHotspots {
        zones: top_zones
            .into_iter()
            .map(|(zone, count)| ZoneCount {
                zone,
                zone_name: zones.display_name(zone),
                borough: zones.get(zone).and_then(|info| info.borough.clone()),
                count,
            })
            .collect(),
        boroughs,
    }
}
