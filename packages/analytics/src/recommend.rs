//! Next-zone recommendations.
//!
//! Neighbors are the zone ids within `radius` of the current zone (purely
//! numeric adjacency, no wraparound). Each neighbor is scored by its
//! expected profit in the next hour slot, and the driver is told to move
//! when the best neighbor beats staying by the move threshold.

use std::cmp::Ordering;

use taxi_profit_analytics_models::{Decision, Recommendation, RecommendationResult};
use taxi_profit_zones::{ZoneDirectory, generic_label};

use crate::{AnalyticsError, ProfitTable, next_hour};

/// Zone ids searched on either side of the current zone.
pub const DEFAULT_RADIUS: usize = 5;

/// The best neighbor must exceed staying by this ratio to recommend moving.
pub const DEFAULT_MOVE_THRESHOLD: f64 = 1.2;

/// Ranked candidates returned with each recommendation.
pub const DEFAULT_TOP_CANDIDATES: usize = 3;

/// Whether moving is worthwhile.
///
/// With a positive `current_next` the best neighbor must beat it by
/// `threshold` (strictly). When staying is expected to earn nothing or lose
/// money, any positive neighbor is worth moving to.
#[must_use]
pub fn should_move(current_next: f64, best: f64, threshold: f64) -> bool {
    if current_next > 0.0 {
        best > current_next * threshold
    } else {
        best > 0.0
    }
}

/// Percentage by which `best` beats `current_next`, only defined for a
/// positive `current_next`.
#[must_use]
pub fn improvement_pct(current_next: f64, best: f64) -> Option<f64> {
    (current_next > 0.0).then(|| (best / current_next - 1.0) * 100.0)
}

/// Descending profit order with NaN after every number.
fn profit_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => b.total_cmp(&a),
        (a_nan, b_nan) => a_nan.cmp(&b_nan),
    }
}

/// Ranks neighbor zones over a borrowed [`ProfitTable`].
#[derive(Debug, Clone, Copy)]
pub struct RecommendationEngine<'a> {
    table: &'a ProfitTable,
    zones: Option<&'a ZoneDirectory>,
    radius: usize,
    move_threshold: f64,
    top_candidates: usize,
}

impl<'a> RecommendationEngine<'a> {
    /// Engine with the default radius, threshold, and candidate count.
    #[must_use]
    pub const fn new(table: &'a ProfitTable) -> Self {
        Self {
            table,
            zones: None,
            radius: DEFAULT_RADIUS,
            move_threshold: DEFAULT_MOVE_THRESHOLD,
            top_candidates: DEFAULT_TOP_CANDIDATES,
        }
    }

    /// Sets the neighbor radius.
    #[must_use]
    pub const fn with_radius(mut self, radius: usize) -> Self {
        self.radius = radius;
        self
    }

    /// Sets the move threshold ratio.
    #[must_use]
    pub const fn with_move_threshold(mut self, threshold: f64) -> Self {
        self.move_threshold = threshold;
        self
    }

    /// Sets how many ranked candidates are returned.
    #[must_use]
    pub const fn with_top_candidates(mut self, top: usize) -> Self {
        self.top_candidates = top;
        self
    }

    /// Uses `zones` for candidate display names.
    #[must_use]
    pub const fn with_zone_names(mut self, zones: &'a ZoneDirectory) -> Self {
        self.zones = Some(zones);
        self
    }

    fn zone_name(&self, zone: i64) -> String {
        self.zones
            .map_or_else(|| generic_label(zone), |z| z.display_name(zone))
    }

    /// Neighbor zone ids of `zone` inside the table, ascending, excluding
    /// `zone` itself.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::OutOfRange`] if `zone` is outside the table.
    pub fn candidate_zones(&self, zone: i64) -> Result<Vec<i64>, AnalyticsError> {
        self.table.check_zone(zone)?;
        let radius = i64::try_from(self.radius).unwrap_or(i64::MAX);
        let last = i64::try_from(self.table.zone_count()).unwrap_or(i64::MAX) - 1;

        let lo = zone.saturating_sub(radius).max(0);
        let hi = zone.saturating_add(radius).min(last);
        Ok((lo..=hi).filter(|&z| z != zone).collect())
    }

    /// Every neighbor scored at the hour after `hour`, best first, ties by
    /// ascending zone id.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::OutOfRange`] if `zone` or `hour` is outside
    /// the table.
    pub fn rank(&self, zone: i64, hour: i64) -> Result<Vec<Recommendation>, AnalyticsError> {
        let hour = u32::try_from(ProfitTable::check_hour(hour)?).unwrap_or(0);
        let next = i64::from(next_hour(hour));

        let mut ranked = self
            .candidate_zones(zone)?
            .into_iter()
            .map(|candidate| -> Result<Recommendation, AnalyticsError> {
                let cell = self.table.cell(candidate, next)?;
                Ok(Recommendation {
                    zone: candidate,
                    zone_name: self.zone_name(candidate),
                    expected_profit: cell.profit(),
                    observed: cell.is_observed(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        ranked.sort_by(|a, b| {
            profit_desc(a.expected_profit, b.expected_profit).then(a.zone.cmp(&b.zone))
        });
        Ok(ranked)
    }

    /// Ranks neighbors and decides whether to stay or move.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::OutOfRange`] if `zone` or `hour` is outside
    /// the table.
    pub fn recommend(&self, zone: i64, hour: i64) -> Result<RecommendationResult, AnalyticsError> {
        let mut candidates = self.rank(zone, hour)?;
        let current_hour = u32::try_from(hour).unwrap_or(0);
        let next = next_hour(current_hour);
        let current_next_profit = self.table.get(zone, i64::from(next))?;

        let decision = match candidates.first() {
            None => {
                log::debug!("Zone {zone} has no neighbors within radius {}", self.radius);
                Decision::Unavailable
            }
            Some(best)
                if should_move(current_next_profit, best.expected_profit, self.move_threshold) =>
            {
                Decision::Move {
                    zone: best.zone,
                    zone_name: best.zone_name.clone(),
                    expected_profit: best.expected_profit,
                    improvement_pct: improvement_pct(current_next_profit, best.expected_profit),
                }
            }
            Some(_) => Decision::Stay,
        };

        let limited_data = candidates.first().is_none_or(|best| best.expected_profit <= 0.0);
        candidates.truncate(self.top_candidates);

        Ok(RecommendationResult {
            current_zone: zone,
            current_hour,
            next_hour: next,
            current_next_profit,
            candidates,
            decision,
            limited_data,
        })
    }
}
