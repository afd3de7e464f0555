//! Per-trip profit.
//!
//! `profit = (fare + tip) - distance × fuel_cost_per_distance`, with a
//! missing tip counted as zero.

use taxi_profit_analytics_models::TripProfit;
use taxi_profit_trip_models::{DEFAULT_FUEL_COST_PER_DISTANCE, Trip};

/// Prices trips with a fixed fuel cost per unit of distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfitCalculator {
    fuel_cost_per_distance: f64,
}

impl Default for ProfitCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_FUEL_COST_PER_DISTANCE)
    }
}

impl ProfitCalculator {
    /// Creates a calculator with the given fuel rate.
    #[must_use]
    pub const fn new(fuel_cost_per_distance: f64) -> Self {
        Self {
            fuel_cost_per_distance,
        }
    }

    /// The configured fuel rate.
    #[must_use]
    pub const fn fuel_cost_per_distance(&self) -> f64 {
        self.fuel_cost_per_distance
    }

    /// Fare plus tip.
    #[must_use]
    pub fn revenue(&self, trip: &Trip) -> f64 {
        trip.fare_amount + trip.tip_or_zero()
    }

    /// Fuel spent on the trip.
    #[must_use]
    pub fn cost(&self, trip: &Trip) -> f64 {
        trip.trip_distance * self.fuel_cost_per_distance
    }

    /// Revenue minus cost.
    #[must_use]
    pub fn profit(&self, trip: &Trip) -> f64 {
        self.revenue(trip) - self.cost(trip)
    }

    /// Profit keyed by pickup zone and hour, ready for aggregation.
    #[must_use]
    pub fn trip_profit(&self, trip: &Trip) -> TripProfit {
        TripProfit {
            zone: trip.pickup_zone,
            hour: trip.pickup_hour(),
            profit: self.profit(trip),
        }
    }
}
