//! Loads cleaned [`Trip`] records from a parquet or CSV trip file.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime};
use duckdb::Connection;
use serde::{Deserialize, Serialize};
use taxi_profit_trip_models::{MAX_TRIP_DISTANCE, Trip};

use crate::IngestError;
use crate::scan::{column_names, require_columns, source_expr};

/// Columns every trip file must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "PULocationID",
    "tpep_pickup_datetime",
    "fare_amount",
    "trip_distance",
    "total_amount",
];

/// Optional tip column; treated as 0 when absent.
pub const TIP_COLUMN: &str = "tip_amount";

/// Cleaning rules applied to every row before it becomes a [`Trip`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TripFilter {
    /// Rows with a longer `trip_distance` are dropped.
    pub max_trip_distance: f64,
    /// Rows picked up in any other year are dropped. `None` keeps all years.
    pub target_year: Option<i32>,
}

impl Default for TripFilter {
    fn default() -> Self {
        Self {
            max_trip_distance: MAX_TRIP_DISTANCE,
            target_year: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    NonPositiveTotal,
    TooLong,
    OutsideYear,
}

impl TripFilter {
    fn rejection(&self, trip: &Trip) -> Option<Rejection> {
        if trip.total_amount <= 0.0 {
            Some(Rejection::NonPositiveTotal)
        } else if trip.trip_distance > self.max_trip_distance {
            Some(Rejection::TooLong)
        } else if self
            .target_year
            .is_some_and(|year| trip.pickup_year() != year)
        {
            Some(Rejection::OutsideYear)
        } else {
            None
        }
    }
}

/// Row counts from one [`load_trips`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    /// File that was read.
    pub file: String,
    /// Rows read from the file.
    pub rows_read: u64,
    /// Rows dropped for `total_amount <= 0`.
    pub non_positive_total: u64,
    /// Rows dropped for exceeding the maximum trip distance.
    pub too_long: u64,
    /// Rows dropped for falling outside the target year.
    pub outside_year: u64,
    /// Rows kept.
    pub kept: u64,
}

impl LoadReport {
    /// Total rows dropped by cleaning.
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.non_positive_total + self.too_long + self.outside_year
    }

    fn record(&mut self, rejection: Option<Rejection>) {
        match rejection {
            None => self.kept += 1,
            Some(Rejection::NonPositiveTotal) => self.non_positive_total += 1,
            Some(Rejection::TooLong) => self.too_long += 1,
            Some(Rejection::OutsideYear) => self.outside_year += 1,
        }
    }
}

fn pickup_from_micros(micros: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_micros(micros).map(|dt| dt.naive_utc())
}

/// Reads every row of `path`, converts it to a [`Trip`] and applies
/// `filter`.
///
/// # Errors
///
/// * [`IngestError::MalformedInput`] if the file type is unsupported, a
///   required column is missing, or a row holds a missing, unparseable or
///   non-finite value in a required column (or a non-finite tip). The
///   message names the 1-based row.
/// * [`IngestError::Database`] if `DuckDB` cannot read the file.
pub fn load_trips(path: &Path, filter: &TripFilter) -> Result<(Vec<Trip>, LoadReport), IngestError> {
    let source = source_expr(path)?;
    let conn = Connection::open_in_memory()?;

    let columns = column_names(&conn, &source)?;
    require_columns(path, &columns, &REQUIRED_COLUMNS)?;

    let tip_expr = if columns.contains(TIP_COLUMN) {
        "TRY_CAST(tip_amount AS DOUBLE)"
    } else {
        log::debug!("{} has no {TIP_COLUMN} column; tips count as 0", path.display());
        "CAST(NULL AS DOUBLE)"
    };

    let sql = format!(
        "SELECT
            TRY_CAST(PULocationID AS BIGINT),
            epoch_us(TRY_CAST(tpep_pickup_datetime AS TIMESTAMP)),
            TRY_CAST(fare_amount AS DOUBLE),
            {tip_expr},
            TRY_CAST(trip_distance AS DOUBLE),
            TRY_CAST(total_amount AS DOUBLE)
         FROM {source}"
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    let mut trips = Vec::new();
    let mut report = LoadReport {
        file: path.display().to_string(),
        ..LoadReport::default()
    };

    while let Some(row) = rows.next()? {
        report.rows_read += 1;
        let row_number = report.rows_read;
        let missing = |column: &str| {
            IngestError::malformed(
                path,
                format!("row {row_number}: missing or unparseable {column}"),
            )
        };

        let pickup_zone: Option<i64> = row.get(0)?;
        let pickup_us: Option<i64> = row.get(1)?;
        let fare_amount: Option<f64> = row.get(2)?;
        let tip_amount: Option<f64> = row.get(3)?;
        let trip_distance: Option<f64> = row.get(4)?;
        let total_amount: Option<f64> = row.get(5)?;

        let finite = |column: &str, value: f64| {
            if value.is_finite() {
                Ok(value)
            } else {
                Err(IngestError::malformed(
                    path,
                    format!("row {row_number}: non-finite {column} ({value})"),
                ))
            }
        };

        let trip = Trip {
            pickup_zone: pickup_zone.ok_or_else(|| missing("PULocationID"))?,
            pickup_at: pickup_us
                .and_then(pickup_from_micros)
                .ok_or_else(|| missing("tpep_pickup_datetime"))?,
            fare_amount: finite("fare_amount", fare_amount.ok_or_else(|| missing("fare_amount"))?)?,
            tip_amount: tip_amount.map(|tip| finite(TIP_COLUMN, tip)).transpose()?,
            trip_distance: finite(
                "trip_distance",
                trip_distance.ok_or_else(|| missing("trip_distance"))?,
            )?,
            total_amount: finite(
                "total_amount",
                total_amount.ok_or_else(|| missing("total_amount"))?,
            )?,
        };

        let rejection = filter.rejection(&trip);
        report.record(rejection);
        if rejection.is_none() {
            trips.push(trip);
        }
    }

    log::info!(
        "Loaded {} of {} rows from {} ({} non-positive total, {} over {} distance, {} outside year)",
        report.kept,
        report.rows_read,
        report.file,
        report.non_positive_total,
        report.too_long,
        filter.max_trip_distance,
        report.outside_year,
    );

    Ok((trips, report))
}
