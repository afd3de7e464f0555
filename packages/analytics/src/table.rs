//! Dense zone × hour profit lookup.

use taxi_profit_analytics_models::{BestCell, BestHour, Cell, ZoneHourStat};
use taxi_profit_trip_models::HOURS_PER_DAY;

use crate::{AnalyticsError, Axis};

/// Expected profit for every `(zone, hour)` in `0..zone_count × 0..24`.
///
/// Cells without observations are [`Cell::Empty`] and read as
/// [`FILL_VALUE`](taxi_profit_analytics_models::FILL_VALUE) through
/// [`get`](Self::get). Use [`cell`](Self::cell) or
/// [`has_data`](Self::has_data) to tell "no data" apart from a real zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfitTable {
    zone_count: usize,
    /// Zone-major: `cells[zone * 24 + hour]`.
    cells: Vec<Cell>,
    total_trips: u64,
    unplaced_trips: u64,
}

impl ProfitTable {
    /// A table with every cell empty.
    #[must_use]
    pub fn empty(zone_count: usize) -> Self {
        Self {
            zone_count,
            cells: vec![Cell::Empty; zone_count * HOURS_PER_DAY],
            total_trips: 0,
            unplaced_trips: 0,
        }
    }

    /// Densifies sparse stats. Stats whose key lies outside the table, or
    /// whose mean profit is not finite, are skipped and reported.
    #[must_use]
    pub fn from_stats(stats: &[ZoneHourStat], zone_count: usize) -> Self {
        let mut table = Self::empty(zone_count);
        let mut skipped_groups = 0usize;
        let mut non_finite_groups = 0usize;

        for stat in stats {
            if !stat.mean_profit.is_finite() {
                non_finite_groups += 1;
                table.unplaced_trips += stat.trip_count;
                continue;
            }
            match table.index(stat.zone, i64::from(stat.hour)) {
                Ok(idx) => {
                    table.cells[idx] = Cell::from(stat);
                    table.total_trips += stat.trip_count;
                }
                Err(_) => {
                    skipped_groups += 1;
                    table.unplaced_trips += stat.trip_count;
                }
            }
        }

        if non_finite_groups > 0 {
            log::warn!(
                "{non_finite_groups} zone/hour group(s) have a non-finite mean profit and were not placed"
            );
        }
        if skipped_groups > 0 {
            log::warn!(
                "{skipped_groups} zone/hour group(s) ({} trips) fall outside the {zone_count}-zone table and were not placed",
                table.unplaced_trips
            );
        }
        log::info!(
            "Built profit table: {zone_count} zones x {HOURS_PER_DAY} hours, {} observed cells, {} trips",
            table.observed_cells(),
            table.total_trips
        );

        table
    }

    /// Number of zones (rows).
    #[must_use]
    pub const fn zone_count(&self) -> usize {
        self.zone_count
    }

    /// Trips placed in the table.
    #[must_use]
    pub const fn total_trips(&self) -> u64 {
        self.total_trips
    }

    /// Trips whose zone or hour fell outside the table, or whose group mean
    /// was not finite.
    #[must_use]
    pub const fn unplaced_trips(&self) -> u64 {
        self.unplaced_trips
    }

    /// Cells backed by at least one trip.
    #[must_use]
    pub fn observed_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_observed()).count()
    }

    /// Trip-weighted mean profit over the whole table, `None` when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_profit(&self) -> Option<f64> {
        if self.total_trips == 0 {
            return None;
        }
        let sum: f64 = self
            .cells
            .iter()
            .map(|c| c.profit() * c.trip_count() as f64)
            .sum();
        Some(sum / self.total_trips as f64)
    }

    /// Checks `zone` against the table bounds.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::OutOfRange`] if `zone` is outside `0..zone_count`.
    pub fn check_zone(&self, zone: i64) -> Result<usize, AnalyticsError> {
        usize::try_from(zone)
            .ok()
            .filter(|&z| z < self.zone_count)
            .ok_or(AnalyticsError::OutOfRange {
                axis: Axis::Zone,
                value: zone,
                bound: self.zone_count,
            })
    }

    /// Checks `hour` against `0..24`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::OutOfRange`] if `hour` is outside `0..24`.
    pub fn check_hour(hour: i64) -> Result<usize, AnalyticsError> {
        usize::try_from(hour)
            .ok()
            .filter(|&h| h < HOURS_PER_DAY)
            .ok_or(AnalyticsError::OutOfRange {
                axis: Axis::Hour,
                value: hour,
                bound: HOURS_PER_DAY,
            })
    }

    fn index(&self, zone: i64, hour: i64) -> Result<usize, AnalyticsError> {
        let z = self.check_zone(zone)?;
        let h = Self::check_hour(hour)?;
        Ok(z * HOURS_PER_DAY + h)
    }

    /// The cell at `(zone, hour)`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::OutOfRange`] for indices outside the table.
    pub fn cell(&self, zone: i64, hour: i64) -> Result<Cell, AnalyticsError> {
        Ok(self.cells[self.index(zone, hour)?])
    }

    /// Expected profit at `(zone, hour)`; the fill value when unobserved.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::OutOfRange`] for indices outside the table.
    pub fn get(&self, zone: i64, hour: i64) -> Result<f64, AnalyticsError> {
        Ok(self.cell(zone, hour)?.profit())
    }

    /// Whether any trips were observed at `(zone, hour)`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::OutOfRange`] for indices outside the table.
    pub fn has_data(&self, zone: i64, hour: i64) -> Result<bool, AnalyticsError> {
        Ok(self.cell(zone, hour)?.is_observed())
    }

    /// Trips observed at `(zone, hour)`; zero when unobserved.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::OutOfRange`] for indices outside the table.
    pub fn trip_count(&self, zone: i64, hour: i64) -> Result<u64, AnalyticsError> {
        Ok(self.cell(zone, hour)?.trip_count())
    }

    /// All 24 cells of one zone, hour 0 first.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::OutOfRange`] if `zone` is outside the table.
    pub fn row(&self, zone: i64) -> Result<&[Cell], AnalyticsError> {
        let start = self.check_zone(zone)? * HOURS_PER_DAY;
        Ok(&self.cells[start..start + HOURS_PER_DAY])
    }

    /// The globally most profitable cell, `None` for a zero-zone table.
    ///
    /// Scans in row-major order and keeps the first maximum, so ties go to
    /// the lowest zone, then the lowest hour. Empty cells take part with the
    /// fill value.
    #[must_use]
    pub fn argmax(&self) -> Option<BestCell> {
        let (idx, profit) = first_max(self.cells.iter().map(Cell::profit))?;
        Some(BestCell {
            zone: i64::try_from(idx / HOURS_PER_DAY).ok()?,
            hour: u32::try_from(idx % HOURS_PER_DAY).ok()?,
            profit,
        })
    }

    /// The most profitable hour of `zone`, earliest on ties.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::OutOfRange`] if `zone` is outside the table.
    pub fn best_hour_for(&self, zone: i64) -> Result<BestHour, AnalyticsError> {
        let row = self.row(zone)?;
        // a row always has 24 cells
        let (hour, profit) = first_max(row.iter().map(Cell::profit)).unwrap_or((0, 0.0));
        Ok(BestHour {
            hour: u32::try_from(hour).unwrap_or(0),
            profit,
        })
    }
}

/// Index and value of the first maximum.
fn first_max(values: impl Iterator<Item = f64>) -> Option<(usize, f64)> {
    values.enumerate().fold(None, |best, (i, v)| match best {
        Some((_, b)) if v <= b => best,
        _ => Some((i, v)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn stat(zone: i64, hour: u32, mean_profit: f64, trip_count: u64) -> ZoneHourStat {
        ZoneHourStat {
            zone,
            hour,
            mean_profit,
            trip_count,
        }
    }

    #[test]
    fn observed_cells_hold_stat_values() {
        let table = ProfitTable::from_stats(&[stat(10, 5, 13.0, 2), stat(0, 23, -4.5, 1)], 266);

        assert!((table.get(10, 5).unwrap() - 13.0).abs() < f64::EPSILON);
        assert_eq!(table.trip_count(10, 5).unwrap(), 2);
        assert!((table.get(0, 23).unwrap() + 4.5).abs() < f64::EPSILON);
        assert_eq!(table.observed_cells(), 2);
        assert_eq!(table.total_trips(), 3);
    }

    #[test]
    fn empty_cells_read_as_fill_value_without_data() {
        let table = ProfitTable::from_stats(&[stat(10, 5, 13.0, 2)], 266);

        for (zone, hour) in [(10, 4), (0, 0), (265, 23)] {
            assert!(table.get(zone, hour).unwrap().abs() < f64::EPSILON);
            assert_eq!(table.trip_count(zone, hour).unwrap(), 0);
            assert!(!table.has_data(zone, hour).unwrap());
            assert_eq!(table.cell(zone, hour).unwrap(), Cell::Empty);
        }
    }

    #[test]
    fn observed_zero_is_not_empty() {
        let table = ProfitTable::from_stats(&[stat(3, 3, 0.0, 5)], 10);
        assert!(table.get(3, 3).unwrap().abs() < f64::EPSILON);
        assert!(table.has_data(3, 3).unwrap());
        assert_eq!(table.trip_count(3, 3).unwrap(), 5);
    }

    #[test]
    fn rejects_out_of_range_indices() {
        let table = ProfitTable::empty(266);
        assert!(matches!(
            table.get(-1, 0),
            Err(AnalyticsError::OutOfRange { axis: Axis::Zone, .. })
        ));
        assert!(matches!(
            table.get(266, 0),
            Err(AnalyticsError::OutOfRange { axis: Axis::Zone, .. })
        ));
        assert!(matches!(
            table.get(0, 24),
            Err(AnalyticsError::OutOfRange { axis: Axis::Hour, .. })
        ));
        assert!(matches!(
            table.trip_count(0, -3),
            Err(AnalyticsError::OutOfRange { axis: Axis::Hour, .. })
        ));
        assert!(table.best_hour_for(300).is_err());
    }

    #[test]
    fn zone_bound_is_configurable() {
        let table = ProfitTable::from_stats(&[stat(4, 0, 1.0, 1), stat(5, 0, 9.0, 1)], 5);
        assert_eq!(table.zone_count(), 5);
        assert!(table.get(4, 0).is_ok());
        assert!(table.get(5, 0).is_err());
        assert_eq!(table.unplaced_trips(), 1);
    }

    #[test]
    fn non_finite_means_are_not_placed() {
        let table = ProfitTable::from_stats(
            &[
                stat(12, 6, f64::NAN, 1),
                stat(13, 6, 29.4, 1),
                stat(14, 6, f64::INFINITY, 2),
            ],
            20,
        );

        assert!(!table.has_data(12, 6).unwrap());
        assert!(table.get(12, 6).unwrap().abs() < f64::EPSILON);
        assert!(!table.has_data(14, 6).unwrap());
        assert_eq!(table.unplaced_trips(), 3);
        assert_eq!(table.total_trips(), 1);

        let best = table.argmax().unwrap();
        assert_eq!((best.zone, best.hour), (13, 6));
        assert!(table.average_profit().unwrap().is_finite());
    }

    #[test]
    fn argmax_is_at_least_every_cell() {
        let table = ProfitTable::from_stats(
            &[stat(2, 7, 8.0, 1), stat(9, 1, 31.5, 4), stat(5, 5, -3.0, 2)],
            12,
        );
        let best = table.argmax().unwrap();
        assert_eq!((best.zone, best.hour), (9, 1));
        for zone in 0..12 {
            for hour in 0..24 {
                assert!(best.profit >= table.get(zone, hour).unwrap());
            }
        }
    }

    #[test]
    fn argmax_ties_go_to_lowest_zone_then_hour() {
        let table = ProfitTable::from_stats(
            &[stat(7, 2, 20.0, 1), stat(3, 9, 20.0, 1), stat(3, 11, 20.0, 1)],
            12,
        );
        let best = table.argmax().unwrap();
        assert_eq!((best.zone, best.hour), (3, 9));
    }

    #[test]
    fn argmax_of_all_negative_table_is_first_empty_cell() {
        let table = ProfitTable::from_stats(&[stat(0, 0, -5.0, 1)], 3);
        let best = table.argmax().unwrap();
        assert_eq!((best.zone, best.hour), (0, 1));
        assert!(best.profit.abs() < f64::EPSILON);
    }

    #[test]
    fn argmax_of_zero_zone_table_is_none() {
        assert!(ProfitTable::empty(0).argmax().is_none());
    }

    #[test]
    fn best_hour_for_zone_uses_same_tie_break() {
        let table = ProfitTable::from_stats(
            &[stat(4, 18, 15.0, 3), stat(4, 6, 15.0, 1), stat(4, 2, 9.0, 2)],
            10,
        );
        let best = table.best_hour_for(4).unwrap();
        assert_eq!(best.hour, 6);
        assert!((best.profit - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn average_profit_is_trip_weighted() {
        let table = ProfitTable::from_stats(&[stat(1, 1, 10.0, 3), stat(2, 2, 2.0, 1)], 5);
        assert!((table.average_profit().unwrap() - 8.0).abs() < 1e-9);
        assert_eq!(ProfitTable::empty(5).average_profit(), None);
    }

    #[test]
    fn table_can_be_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProfitTable>();

        let table = std::sync::Arc::new(ProfitTable::from_stats(&[stat(1, 1, 4.0, 1)], 5));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let table = std::sync::Arc::clone(&table);
                std::thread::spawn(move || table.get(1, 1).unwrap())
            })
            .collect();
        for handle in handles {
            assert!((handle.join().unwrap() - 4.0).abs() < f64::EPSILON);
        }
    }
}
