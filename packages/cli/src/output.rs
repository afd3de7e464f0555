//! Formatting helpers for terminal output.

use serde::Serialize;
use taxi_profit_zones::ZoneDirectory;

/// Prints `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Dollar amount with two decimals, sign before the symbol.
#[must_use]
pub fn money(value: f64) -> String {
    if value < 0.0 {
        format!("-${:.2}", -value)
    } else {
        format!("${value:.2}")
    }
}

/// `14` → `14:00`.
#[must_use]
pub fn hour_label(hour: impl Into<i64>) -> String {
    format!("{:02}:00", hour.into())
}

/// `Zone 161 (Midtown Center)`, or just `Zone 5` for unnamed zones.
#[must_use]
pub fn zone_label(zones: &ZoneDirectory, zone: i64) -> String {
    zones
        .name(zone)
        .map_or_else(|| format!("Zone {zone}"), |name| format!("Zone {zone} ({name})"))
}

/// Signed percentage with one decimal.
#[must_use]
pub fn percent(value: f64) -> String {
    format!("{value:+.1}%")
}
