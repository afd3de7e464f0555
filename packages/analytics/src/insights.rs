//! Summaries shown next to a lookup: the whole-dataset figures, a zone's
//! profile across the day, how zones compare at one hour, and how the
//! current hour stacks up against the zone's best.

use taxi_profit_analytics_models::{Efficiency, HourProfit, ProfitSummary, ZoneProfit};
use taxi_profit_zones::ZoneDirectory;

use crate::{AnalyticsError, ProfitTable};

/// Dataset-level figures.
#[must_use]
pub fn summary(table: &ProfitTable) -> ProfitSummary {
    ProfitSummary {
        total_trips: table.total_trips(),
        average_profit: table.average_profit(),
        observed_cells: table.observed_cells(),
        zone_count: table.zone_count(),
    }
}

/// Expected profit of `zone` for each hour of the day.
///
/// # Errors
///
/// Returns [`AnalyticsError::OutOfRange`] if `zone` is outside the table.
pub fn hourly_profile(table: &ProfitTable, zone: i64) -> Result<Vec<HourProfit>, AnalyticsError> {
    Ok(table
        .row(zone)?
        .iter()
        .zip(0u32..)
        .map(|(cell, hour)| HourProfit {
            hour,
            expected_profit: cell.profit(),
            observed: cell.is_observed(),
        })
        .collect())
}

/// Zones ranked by expected profit at `hour`, best first.
///
/// Compares the named zones in `zones` that lie inside the table; with no
/// named zones every zone in the table is compared.
///
/// # Errors
///
/// Returns [`AnalyticsError::OutOfRange`] if `hour` is outside `0..24`.
pub fn compare_zones(
    table: &ProfitTable,
    hour: i64,
    zones: &ZoneDirectory,
) -> Result<Vec<ZoneProfit>, AnalyticsError> {
    ProfitTable::check_hour(hour)?;

    let ids: Vec<i64> = if zones.is_empty() {
        (0..i64::try_from(table.zone_count()).unwrap_or(i64::MAX)).collect()
    } else {
        zones
            .iter()
            .map(|(id, _)| id)
            .filter(|&id| table.check_zone(id).is_ok())
            .collect()
    };

    let mut ranked = ids
        .into_iter()
        .map(|zone| -> Result<ZoneProfit, AnalyticsError> {
            let cell = table.cell(zone, hour)?;
            Ok(ZoneProfit {
                zone,
                zone_name: zones.display_name(zone),
                expected_profit: cell.profit(),
                observed: cell.is_observed(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    ranked.sort_by(|a, b| {
        b.expected_profit
            .total_cmp(&a.expected_profit)
            .then(a.zone.cmp(&b.zone))
    });
    Ok(ranked)
}

/// Current hour's profit relative to the zone's best hour.
///
/// `None` when the best hour has no positive profit to compare against.
///
/// # Errors
///
/// Returns [`AnalyticsError::OutOfRange`] if `zone` or `hour` is outside the
/// table.
pub fn efficiency(
    table: &ProfitTable,
    zone: i64,
    hour: i64,
) -> Result<Option<Efficiency>, AnalyticsError> {
    let current = table.get(zone, hour)?;
    let best = table.best_hour_for(zone)?;

    if best.profit <= 0.0 {
        return Ok(None);
    }

    Ok(Some(Efficiency {
        percent: current / best.profit * 100.0,
        delta: current - best.profit,
        best,
    }))
}
