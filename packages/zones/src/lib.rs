#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Taxi zone metadata.
//!
//! Maps numeric zone ids to display names and boroughs. Ships with names
//! for the handful of zones drivers ask about most, and can be extended
//! from the TLC `taxi_zone_lookup.csv` file. Lookups never fail: unknown
//! ids render as `"Zone {id}"`.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

/// Well-known Manhattan and airport zones with friendly names.
pub const BUILTIN_ZONE_NAMES: &[(i64, &str)] = &[
    (79, "East Village"),
    (100, "Garment District"),
    (113, "Greenwich Village"),
    (132, "JFK Airport"),
    (138, "LaGuardia Airport"),
    (142, "Lincoln Square"),
    (161, "Midtown Center"),
    (162, "Midtown East"),
    (163, "Midtown North"),
    (164, "Midtown South"),
    (170, "Murray Hill"),
    (186, "Penn Station"),
    (230, "Times Square"),
    (237, "Upper East Side"),
    (238, "Upper West Side"),
];

/// Errors that can occur while loading zone metadata.
#[derive(Debug, thiserror::Error)]
pub enum ZoneError {
    /// The lookup file could not be opened.
    #[error("Failed to read zone lookup {path}: {source}")]
    Io {
        /// Path that failed to open.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A row of the lookup file could not be parsed.
    #[error("Malformed zone lookup: {0}")]
    Csv(#[from] csv::Error),
}

/// Metadata for one zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneInfo {
    /// Human-readable zone name.
    pub name: String,
    /// Borough, when known.
    pub borough: Option<String>,
}

/// One row of `taxi_zone_lookup.csv`.
#[derive(Debug, Deserialize)]
struct LookupRow {
    #[serde(rename = "LocationID")]
    location_id: i64,
    #[serde(rename = "Borough")]
    borough: Option<String>,
    #[serde(rename = "Zone")]
    zone: Option<String>,
}

/// Zone id → [`ZoneInfo`] directory.
#[derive(Debug, Clone, Default)]
pub struct ZoneDirectory {
    zones: BTreeMap<i64, ZoneInfo>,
}

impl ZoneDirectory {
    /// An empty directory; every lookup falls back to the generic label.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Directory containing [`BUILTIN_ZONE_NAMES`].
    #[must_use]
    pub fn builtin() -> Self {
        let zones = BUILTIN_ZONE_NAMES
            .iter()
            .map(|&(id, name)| {
                (
                    id,
                    ZoneInfo {
                        name: name.to_string(),
                        borough: Some("Manhattan".to_string()).filter(|_| !is_airport(id)),
                    },
                )
            })
            .collect();
        Self { zones }
    }

    /// Reads a TLC lookup CSV (`LocationID,Borough,Zone,service_zone`).
    ///
    /// Rows with an empty or `"N/A"` zone name are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::Csv`] if the header or any row is malformed.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ZoneError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut zones = BTreeMap::new();

        for row in rdr.deserialize::<LookupRow>() {
            let row = row?;
            let Some(name) = row.zone.filter(|z| !z.is_empty() && z != "N/A") else {
                continue;
            };
            let borough = row.borough.filter(|b| !b.is_empty() && b != "N/A" && b != "Unknown");
            zones.insert(row.location_id, ZoneInfo { name, borough });
        }

        Ok(Self { zones })
    }

    /// Reads a TLC lookup CSV from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError`] if the file cannot be opened or parsed.
    pub fn from_csv_path(path: &Path) -> Result<Self, ZoneError> {
        let file = std::fs::File::open(path).map_err(|source| ZoneError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let directory = Self::from_reader(file)?;
        log::info!(
            "Loaded {} zone names from {}",
            directory.len(),
            path.display()
        );
        Ok(directory)
    }

    /// Loads the lookup file when one is configured, layered over the
    /// built-in names. A missing or broken file degrades to the built-in
    /// names with a warning.
    #[must_use]
    pub fn load_or_builtin(path: Option<&Path>) -> Self {
        let mut directory = Self::builtin();
        let Some(path) = path else {
            return directory;
        };

        match Self::from_csv_path(path) {
            Ok(loaded) => directory.zones.extend(loaded.zones),
            Err(e) => log::warn!("Using built-in zone names: {e}"),
        }

        directory
    }

    /// Metadata for a zone, if known.
    #[must_use]
    pub fn get(&self, zone: i64) -> Option<&ZoneInfo> {
        self.zones.get(&zone)
    }

    /// Name for a zone, if known.
    #[must_use]
    pub fn name(&self, zone: i64) -> Option<&str> {
        self.zones.get(&zone).map(|z| z.name.as_str())
    }

    /// Name for a zone, or `"Zone {id}"` when unknown.
    #[must_use]
    pub fn display_name(&self, zone: i64) -> String {
        self.name(zone)
            .map_or_else(|| generic_label(zone), ToString::to_string)
    }

    /// Iterates named zones in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &ZoneInfo)> {
        self.zones.iter().map(|(&id, info)| (id, info))
    }

    /// Number of named zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether no zones are named.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

/// Generic label used for zones without metadata.
#[must_use]
pub fn generic_label(zone: i64) -> String {
    format!("Zone {zone}")
}

const fn is_airport(zone: i64) -> bool {
    // JFK and LaGuardia are in Queens
    matches!(zone, 132 | 138)
}
