//! Grouping of trip profits by `(zone, hour)`.

use std::collections::BTreeMap;

use taxi_profit_analytics_models::{TripProfit, ZoneHourStat};

/// Running sum and count for one group.
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    count: u64,
}

/// Reduces trip profits to one [`ZoneHourStat`] per occupied key.
///
/// Every added profit lands in exactly one group. Output order is by zone,
/// then hour, regardless of input order.
#[derive(Debug, Clone, Default)]
pub struct ZoneHourAggregator {
    groups: BTreeMap<(i64, u32), Accumulator>,
    trips: u64,
}

impl ZoneHourAggregator {
    /// Creates an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one trip profit.
    pub fn add(&mut self, profit: TripProfit) {
        let acc = self.groups.entry((profit.zone, profit.hour)).or_default();
        acc.sum += profit.profit;
        acc.count += 1;
        self.trips += 1;
    }

    /// Number of profits added so far.
    #[must_use]
    pub const fn trip_count(&self) -> u64 {
        self.trips
    }

    /// Number of distinct `(zone, hour)` groups so far.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Produces the per-group means and counts.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn finish(self) -> Vec<ZoneHourStat> {
        self.groups
            .into_iter()
            .map(|((zone, hour), acc)| ZoneHourStat {
                zone,
                hour,
                mean_profit: acc.sum / acc.count as f64,
                trip_count: acc.count,
            })
            .collect()
    }
}

impl Extend<TripProfit> for ZoneHourAggregator {
    fn extend<I: IntoIterator<Item = TripProfit>>(&mut self, iter: I) {
        for profit in iter {
            self.add(profit);
        }
    }
}

/// Aggregates a batch of trip profits in one call.
#[must_use]
pub fn aggregate(profits: impl IntoIterator<Item = TripProfit>) -> Vec<ZoneHourStat> {
    let mut aggregator = ZoneHourAggregator::new();
    aggregator.extend(profits);
    aggregator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn tp(zone: i64, hour: u32, profit: f64) -> TripProfit {
        TripProfit { zone, hour, profit }
    }

    #[test]
    fn single_trip_group_mean_is_its_profit() {
        let stats = aggregate([tp(4, 9, 12.25)]);
        assert_eq!(stats.len(), 1);
        assert!((stats[0].mean_profit - 12.25).abs() < f64::EPSILON);
        assert_eq!(stats[0].trip_count, 1);
    }

    #[test]
    fn groups_by_zone_and_hour() {
        let stats = aggregate([
            tp(10, 5, 19.0),
            tp(11, 5, 3.0),
            tp(10, 5, 7.0),
            tp(10, 6, -2.0),
        ]);

        assert_eq!(stats.len(), 3);
        assert_eq!((stats[0].zone, stats[0].hour), (10, 5));
        assert!((stats[0].mean_profit - 13.0).abs() < 1e-9);
        assert_eq!(stats[0].trip_count, 2);
        assert_eq!((stats[1].zone, stats[1].hour), (10, 6));
        assert_eq!((stats[2].zone, stats[2].hour), (11, 5));
    }

    #[test]
    fn every_trip_is_counted_exactly_once() {
        let profits: Vec<TripProfit> = (0..500)
            .map(|i| tp(i % 13, u32::try_from(i % 24).unwrap(), f64::from(i32::try_from(i).unwrap())))
            .collect();

        let mut aggregator = ZoneHourAggregator::new();
        aggregator.extend(profits.iter().copied());
        assert_eq!(aggregator.trip_count(), 500);

        let stats = aggregator.finish();
        let total: u64 = stats.iter().map(|s| s.trip_count).sum();
        assert_eq!(total, 500);
    }

    #[test]
    fn result_does_not_depend_on_input_order() {
        let forward = [tp(1, 1, 0.1), tp(1, 1, 0.2), tp(2, 3, 5.0), tp(1, 1, 0.3)];
        let mut reversed = forward;
        reversed.reverse();

        let a = aggregate(forward);
        let b = aggregate(reversed);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!((x.zone, x.hour, x.trip_count), (y.zone, y.hour, y.trip_count));
            assert!((x.mean_profit - y.mean_profit).abs() < 1e-12);
        }
    }
}
