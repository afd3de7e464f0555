#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Trip record types shared across the taxi profit engine.
//!
//! A [`Trip`] is one observed ride after loading and cleaning. Everything
//! downstream (profit calculation, aggregation, sampling) derives its keys
//! from the fields defined here, so the hour and day-of-week conventions
//! live in this crate and nowhere else.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Number of hour slots in a day. Hours are indexed `0..24`.
pub const HOURS_PER_DAY: usize = 24;

/// Number of weekdays. Days are indexed `0..7` with Monday = 0.
pub const DAYS_PER_WEEK: usize = 7;

/// Number of possible hour × day-of-week strata.
pub const STRATUM_COUNT: usize = HOURS_PER_DAY * DAYS_PER_WEEK;

/// Number of taxi zones in the NYC TLC zone map (ids `0..266`).
pub const DEFAULT_ZONE_COUNT: usize = 266;

/// Trips longer than this (in miles) are treated as recording errors.
pub const MAX_TRIP_DISTANCE: f64 = 100.0;

/// Estimated fuel cost in dollars per mile driven.
pub const DEFAULT_FUEL_COST_PER_DISTANCE: f64 = 0.60;

/// A single observed ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    /// Pickup zone id (`PULocationID`).
    pub pickup_zone: i64,
    /// Pickup timestamp (`tpep_pickup_datetime`), local time.
    pub pickup_at: NaiveDateTime,
    /// Metered fare.
    pub fare_amount: f64,
    /// Tip, when the source recorded one.
    pub tip_amount: Option<f64>,
    /// Distance driven in miles.
    pub trip_distance: f64,
    /// Total charged to the passenger.
    pub total_amount: f64,
}

impl Trip {
    /// Hour of day of the pickup, `0..24`.
    #[must_use]
    pub fn pickup_hour(&self) -> u32 {
        self.pickup_at.hour()
    }

    /// Day of week of the pickup, Monday = 0 through Sunday = 6.
    #[must_use]
    pub fn pickup_weekday(&self) -> u32 {
        self.pickup_at.weekday().num_days_from_monday()
    }

    /// Calendar year of the pickup.
    #[must_use]
    pub fn pickup_year(&self) -> i32 {
        self.pickup_at.year()
    }

    /// Calendar month of the pickup, `1..=12`.
    #[must_use]
    pub fn pickup_month(&self) -> u32 {
        self.pickup_at.month()
    }

    /// Whether the pickup happened on a weekday or the weekend.
    #[must_use]
    pub fn day_type(&self) -> DayType {
        DayType::from_weekday(self.pickup_weekday())
    }

    /// Tip amount with a missing tip read as zero.
    #[must_use]
    pub fn tip_or_zero(&self) -> f64 {
        self.tip_amount.unwrap_or(0.0)
    }
}

/// Weekday/weekend split used by the demand breakdowns.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DayType {
    /// Monday through Friday.
    Weekday,
    /// Saturday and Sunday.
    Weekend,
}

impl DayType {
    /// Classifies a Monday-based day index (`5` and `6` are the weekend).
    #[must_use]
    pub const fn from_weekday(weekday: u32) -> Self {
        if weekday >= 5 {
            Self::Weekend
        } else {
            Self::Weekday
        }
    }
}

/// Hour × day-of-week stratification key used by the sampler.
///
/// Ordered by hour first, then weekday, which is also the order strata
/// are visited in when allocating sample sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StratumKey {
    /// Hour of day, `0..24`.
    pub hour: u8,
    /// Day of week, Monday = 0.
    pub weekday: u8,
}

impl StratumKey {
    /// Creates a key, returning `None` when either component is out of range.
    #[must_use]
    pub fn new(hour: u32, weekday: u32) -> Option<Self> {
        if (hour as usize) < HOURS_PER_DAY && (weekday as usize) < DAYS_PER_WEEK {
            Some(Self {
                hour: u8::try_from(hour).ok()?,
                weekday: u8::try_from(weekday).ok()?,
            })
        } else {
            None
        }
    }

    /// Derives the key from a pickup timestamp.
    #[must_use]
    pub fn from_timestamp(ts: &NaiveDateTime) -> Self {
        // hour() < 24 and num_days_from_monday() < 7 always hold
        Self {
            hour: u8::try_from(ts.hour()).unwrap_or(0),
            weekday: u8::try_from(ts.weekday().num_days_from_monday()).unwrap_or(0),
        }
    }

    /// Dense index in `0..STRATUM_COUNT`.
    #[must_use]
    pub const fn index(self) -> usize {
        self.hour as usize * DAYS_PER_WEEK + self.weekday as usize
    }
}

impl std::fmt::Display for StratumKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.hour, self.weekday)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 15, 0)
            .unwrap()
    }

    fn trip(ts: NaiveDateTime) -> Trip {
        Trip {
            pickup_zone: 161,
            pickup_at: ts,
            fare_amount: 12.5,
            tip_amount: None,
            trip_distance: 2.1,
            total_amount: 16.0,
        }
    }

    #[test]
    fn derives_hour_and_monday_based_weekday() {
        // 2025-01-06 is a Monday
        let t = trip(at(2025, 1, 6, 14));
        assert_eq!(t.pickup_hour(), 14);
        assert_eq!(t.pickup_weekday(), 0);
        assert_eq!(t.day_type(), DayType::Weekday);

        let sunday = trip(at(2025, 1, 12, 23));
        assert_eq!(sunday.pickup_weekday(), 6);
        assert_eq!(sunday.day_type(), DayType::Weekend);
    }

    #[test]
    fn missing_tip_reads_as_zero() {
        let t = trip(at(2025, 3, 1, 8));
        assert!(t.tip_or_zero().abs() < f64::EPSILON);
    }

    #[test]
    fn stratum_key_display_and_index() {
        let key = StratumKey::from_timestamp(&at(2025, 1, 8, 5));
        assert_eq!(key, StratumKey { hour: 5, weekday: 2 });
        assert_eq!(key.to_string(), "5_2");
        assert_eq!(key.index(), 5 * 7 + 2);

        let last = StratumKey::new(23, 6).unwrap();
        assert_eq!(last.index(), STRATUM_COUNT - 1);
    }

    #[test]
    fn stratum_key_rejects_out_of_range() {
        assert!(StratumKey::new(24, 0).is_none());
        assert!(StratumKey::new(0, 7).is_none());
    }

    #[test]
    fn day_type_parses_from_string() {
        assert_eq!("WEEKEND".parse::<DayType>().unwrap(), DayType::Weekend);
        assert_eq!(DayType::Weekday.as_ref(), "WEEKDAY");
    }
}
