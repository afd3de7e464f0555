#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reading taxi trip records from parquet and CSV files, and producing
//! stratified samples of large monthly trip files.
//!
//! All file access goes through short-lived in-memory `DuckDB`
//! connections: each call opens one, reads what it needs, and drops it
//! before returning.

pub mod discover;
pub mod loader;
pub mod progress;
pub mod sampler;
pub mod scan;

pub use discover::{RawFile, discover_raw_files};
pub use loader::{LoadReport, TripFilter, load_trips};
pub use sampler::{
    BatchReport, SampleOptions, SamplePlan, SampleReport, plan_sample, sample_directory,
    sample_file,
};

/// Errors that can occur while reading or sampling trip files.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The file is missing a column, holds an unparseable value, or has an
    /// unsupported format.
    #[error("Malformed input in {file}: {message}")]
    MalformedInput {
        /// File the problem was found in.
        file: String,
        /// What was wrong, including row context where available.
        message: String,
    },

    /// `DuckDB` query or connection error.
    #[error("DuckDB error: {0}")]
    Database(#[from] duckdb::Error),

    /// Filesystem error.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being read or written.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Sample fraction outside `(0, 1]`.
    #[error("Sample fraction must be in (0, 1], got {0}")]
    InvalidFraction(f64),

    /// No raw files matched in the input directory.
    #[error("No files named {prefix}<month>.parquet found in {dir}")]
    NoInputFiles {
        /// Directory that was searched.
        dir: String,
        /// File name prefix that was expected.
        prefix: String,
    },
}

impl IngestError {
    pub(crate) fn malformed(file: &std::path::Path, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            file: file.display().to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::{Path, PathBuf};

    use duckdb::Connection;

    /// Creates a fresh scratch directory under the system temp dir.
    pub fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "taxi_profit_ingest_{name}_{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Writes the result of `select` to `path` as parquet.
    pub fn write_parquet(path: &Path, select: &str) {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(&format!(
            "COPY ({select}) TO '{}' (FORMAT PARQUET)",
            path.display()
        ))
        .unwrap();
    }

    /// Counts rows in a parquet file.
    pub fn parquet_rows(path: &Path) -> i64 {
        let conn = Connection::open_in_memory().unwrap();
        conn.query_row(
            &format!("SELECT COUNT(*) FROM read_parquet('{}')", path.display()),
            [],
            |row| row.get(0),
        )
        .unwrap()
    }
}
