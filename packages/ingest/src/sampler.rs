//! Stratified subsampling of raw trip files.
//!
//! Rows are stratified by pickup hour × day of week. Strata with fewer than
//! [`MIN_STRATUM_SIZE`] rows are excluded; from the remaining `N` rows a
//! sample of `ceil(fraction × N)` is drawn, split across strata by
//! largest-remainder allocation so each stratum keeps its share.
//!
//! The planning step ([`plan_sample`]) is pure and seeded. The file step
//! ([`sample_file`]) reads a file into an in-memory `DuckDB` table, plans on
//! the pickup timestamps, and copies the chosen rows to parquet. Output is
//! written to a temporary file and renamed into place only on success.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use duckdb::Connection;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use serde::{Deserialize, Serialize};
use taxi_profit_trip_models::StratumKey;

use crate::IngestError;
use crate::discover::{RawFile, discover_raw_files};
use crate::progress::ProgressCallback;
use crate::scan::{column_names, create_numbered_table, require_columns, source_expr, sql_string};

/// Strata smaller than this are excluded from sampling.
pub const MIN_STRATUM_SIZE: usize = 2;

/// Default fraction of eligible rows to keep.
pub const DEFAULT_FRACTION: f64 = 0.1;

/// Default random seed.
pub const DEFAULT_SEED: u64 = 42;

/// File name of the concatenated sample.
pub const COMBINED_FILE_NAME: &str = "combined_sampled_data.parquet";

const PICKUP_COLUMN: &str = "tpep_pickup_datetime";
const ROW_ID: &str = "__row_id";

/// Sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleOptions {
    /// Fraction of eligible rows to keep, in `(0, 1]`.
    pub fraction: f64,
    /// Seed for the random draw.
    pub seed: u64,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            fraction: DEFAULT_FRACTION,
            seed: DEFAULT_SEED,
        }
    }
}

impl SampleOptions {
    /// Checks that the fraction is in `(0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::InvalidFraction`] otherwise.
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.fraction > 0.0 && self.fraction <= 1.0 {
            Ok(())
        } else {
            Err(IngestError::InvalidFraction(self.fraction))
        }
    }
}

/// The rows chosen by [`plan_sample`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SamplePlan {
    /// Positions into the input keys, ascending.
    pub selected: Vec<usize>,
    /// Rows in strata large enough to sample from.
    pub eligible_rows: usize,
    /// Excluded strata and their sizes.
    pub excluded: Vec<(StratumKey, usize)>,
    /// Rows drawn from each eligible stratum.
    pub allocation: BTreeMap<StratumKey, usize>,
}

impl SamplePlan {
    /// Rows dropped because their stratum was too small.
    #[must_use]
    pub fn excluded_rows(&self) -> usize {
        self.excluded.iter().map(|(_, n)| n).sum()
    }
}

/// `ceil(fraction × eligible)`, never more than `eligible`.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn sample_size(fraction: f64, eligible: usize) -> usize {
    let n = (fraction * eligible as f64).ceil();
    if n <= 0.0 {
        0
    } else {
        (n as usize).min(eligible)
    }
}

/// Splits `total` draws across strata in proportion to their sizes.
///
/// Each stratum first gets the floor of its exact quota; the draws left over
/// go to the largest remainders, ties broken by larger stratum and then by
/// key order. The result is parallel to `sizes`.
#[must_use]
pub fn allocate(sizes: &[(StratumKey, usize)], total: usize) -> Vec<usize> {
    let population: u128 = sizes.iter().map(|&(_, n)| n as u128).sum();
    if population == 0 {
        return vec![0; sizes.len()];
    }

    let mut counts = Vec::with_capacity(sizes.len());
    let mut remainders = Vec::with_capacity(sizes.len());
    for &(_, n) in sizes {
        let exact = n as u128 * total as u128;
        counts.push(usize::try_from(exact / population).unwrap_or(n));
        remainders.push(exact % population);
    }

    let mut order: Vec<usize> = (0..sizes.len()).collect();
    order.sort_by_key(|&i| (Reverse(remainders[i]), Reverse(sizes[i].1), sizes[i].0));

    let assigned: usize = counts.iter().sum();
    for &i in order.iter().take(total.saturating_sub(assigned)) {
        counts[i] += 1;
    }

    counts
}

/// Chooses which rows to keep given each row's stratum key.
///
/// # Errors
///
/// Returns [`IngestError::InvalidFraction`] if `options.fraction` is not in
/// `(0, 1]`.
pub fn plan_sample(keys: &[StratumKey], options: &SampleOptions) -> Result<SamplePlan, IngestError> {
    options.validate()?;

    let mut strata: BTreeMap<StratumKey, Vec<usize>> = BTreeMap::new();
    for (pos, &key) in keys.iter().enumerate() {
        strata.entry(key).or_default().push(pos);
    }

    let mut plan = SamplePlan::default();
    let mut eligible: Vec<(StratumKey, Vec<usize>)> = Vec::new();
    for (key, members) in strata {
        if members.len() < MIN_STRATUM_SIZE {
            log::info!(
                "Excluding stratum {key} from sampling ({} row(s))",
                members.len()
            );
            plan.excluded.push((key, members.len()));
        } else {
            eligible.push((key, members));
        }
    }

    let sizes: Vec<(StratumKey, usize)> = eligible.iter().map(|(k, m)| (*k, m.len())).collect();
    plan.eligible_rows = sizes.iter().map(|(_, n)| n).sum();
    let counts = allocate(&sizes, sample_size(options.fraction, plan.eligible_rows));

    let mut rng = StdRng::seed_from_u64(options.seed);
    for ((key, members), count) in eligible.iter().zip(counts) {
        plan.allocation.insert(*key, count);
        for i in index::sample(&mut rng, members.len(), count) {
            plan.selected.push(members[i]);
        }
    }
    plan.selected.sort_unstable();

    Ok(plan)
}

/// What [`sample_file`] did with one raw file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleReport {
    /// Month tag of the raw file.
    pub month_tag: String,
    /// Raw file that was read.
    pub input: PathBuf,
    /// Sampled parquet file that was written.
    pub output: PathBuf,
    /// Rows in the raw file.
    pub rows_read: usize,
    /// Rows in strata large enough to sample from.
    pub eligible_rows: usize,
    /// Number of excluded strata.
    pub excluded_strata: usize,
    /// Rows in excluded strata.
    pub excluded_rows: usize,
    /// Rows written to the sample.
    pub sampled_rows: usize,
}

/// Everything [`sample_directory`] produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// One report per raw file, in month order.
    pub files: Vec<SampleReport>,
    /// Concatenated sample.
    pub combined: PathBuf,
    /// Rows in the concatenated sample.
    pub combined_rows: u64,
}

/// File name of the sample for `month_tag`.
#[must_use]
pub fn sampled_file_name(month_tag: &str) -> String {
    format!("{month_tag}_sampled_data.parquet")
}

fn temp_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map_or_else(|| "sample".to_string(), |n| n.to_string_lossy().into_owned());
    output.with_file_name(format!(".{name}.tmp"))
}

/// Copies the result of `query` to `output` as parquet.
///
/// No file exists at `output` unless the whole copy succeeded.
fn write_parquet_atomic(conn: &Connection, query: &str, output: &Path) -> Result<(), IngestError> {
    let tmp = temp_path(output);
    let copy = format!(
        "COPY ({query}) TO {} (FORMAT PARQUET)",
        sql_string(&tmp.to_string_lossy())
    );

    if let Err(e) = conn.execute_batch(&copy) {
        std::fs::remove_file(&tmp).ok();
        return Err(e.into());
    }

    std::fs::rename(&tmp, output).map_err(|e| {
        std::fs::remove_file(&tmp).ok();
        IngestError::io(output, e)
    })
}

/// Reads the pickup stratum of every row in the `raw` table, in row order.
/// `row_count` is only used in error messages.
fn stratum_keys(
    conn: &Connection,
    file: &Path,
    row_count: u64,
) -> Result<(Vec<i64>, Vec<StratumKey>), IngestError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ROW_ID}, hour(ts), isodow(ts) - 1
         FROM (SELECT {ROW_ID}, TRY_CAST({PICKUP_COLUMN} AS TIMESTAMP) AS ts FROM raw)
         ORDER BY {ROW_ID}"
    ))?;
    let mut rows = stmt.query([])?;

    let mut ids = Vec::new();
    let mut keys = Vec::new();
    while let Some(row) = rows.next()? {
        let id: i64 = row.get(0)?;
        let hour: Option<i64> = row.get(1)?;
        let weekday: Option<i64> = row.get(2)?;

        let key = hour
            .zip(weekday)
            .and_then(|(h, w)| StratumKey::new(u32::try_from(h).ok()?, u32::try_from(w).ok()?))
            .ok_or_else(|| {
                IngestError::malformed(
                    file,
                    format!(
                        "row {} of {row_count}: missing or unparseable {PICKUP_COLUMN}",
                        id + 1
                    ),
                )
            })?;

        ids.push(id);
        keys.push(key);
    }

    Ok((ids, keys))
}

/// Samples one raw file into `output_dir/<month-tag>_sampled_data.parquet`.
///
/// The output keeps every column of the input, in input row order.
///
/// # Errors
///
/// * [`IngestError::InvalidFraction`] for a bad fraction.
/// * [`IngestError::MalformedInput`] if the file lacks a usable
///   `tpep_pickup_datetime` column or a row's timestamp is missing or
///   unparseable.
/// * [`IngestError::Database`] or [`IngestError::Io`] if reading or writing
///   fails.
pub fn sample_file(
    raw: &RawFile,
    output_dir: &Path,
    options: &SampleOptions,
) -> Result<SampleReport, IngestError> {
    options.validate()?;

    let source = source_expr(&raw.path)?;
    let conn = Connection::open_in_memory()?;

    let columns = column_names(&conn, &source)?;
    require_columns(&raw.path, &columns, &[PICKUP_COLUMN])?;

    let row_count = create_numbered_table(&conn, &raw.path, "raw", ROW_ID)?;
    log::info!(
        "{}: {row_count} rows x {} columns",
        raw.path.display(),
        columns.len()
    );

    let (ids, keys) = stratum_keys(&conn, &raw.path, row_count)?;

    let plan = plan_sample(&keys, options)?;

    conn.execute_batch("CREATE TABLE selected (row_id BIGINT)")?;
    {
        let mut appender = conn.appender("selected")?;
        for &pos in &plan.selected {
            appender.append_row(duckdb::params![ids[pos]])?;
        }
        appender.flush()?;
    }

    let output = output_dir.join(sampled_file_name(&raw.month_tag));
    write_parquet_atomic(
        &conn,
        &format!(
            "SELECT * EXCLUDE ({ROW_ID}) FROM raw
             WHERE {ROW_ID} IN (SELECT row_id FROM selected)
             ORDER BY {ROW_ID}"
        ),
        &output,
    )?;

    let report = SampleReport {
        month_tag: raw.month_tag.clone(),
        input: raw.path.clone(),
        output,
        rows_read: keys.len(),
        eligible_rows: plan.eligible_rows,
        excluded_strata: plan.excluded.len(),
        excluded_rows: plan.excluded_rows(),
        sampled_rows: plan.selected.len(),
    };

    log::info!(
        "Sampled {} of {} eligible rows ({} excluded in {} strata) -> {}",
        report.sampled_rows,
        report.eligible_rows,
        report.excluded_rows,
        report.excluded_strata,
        report.output.display()
    );

    Ok(report)
}

/// Concatenates sampled parquet files into `output`, matching columns by
/// name. Returns the number of rows written.
///
/// # Errors
///
/// Returns [`IngestError::Database`] or [`IngestError::Io`] if reading or
/// writing fails.
pub fn combine_samples(files: &[PathBuf], output: &Path) -> Result<u64, IngestError> {
    if files.is_empty() {
        log::warn!("No sampled files to combine into {}", output.display());
        return Ok(0);
    }

    let list = files
        .iter()
        .map(|p| sql_string(&p.to_string_lossy()))
        .collect::<Vec<_>>()
        .join(", ");
    let query = format!("SELECT * FROM read_parquet([{list}], union_by_name = true)");

    let conn = Connection::open_in_memory()?;
    let rows: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM ({query})"), [], |row| {
        row.get(0)
    })?;

    write_parquet_atomic(&conn, &query, output)?;
    log::info!("Combined {} file(s), {rows} rows -> {}", files.len(), output.display());

    Ok(u64::try_from(rows).unwrap_or(0))
}

/// Samples every `<prefix><month-tag>.parquet` file in `input_dir` into
/// `output_dir`, then writes the combined sample.
///
/// Stops at the first file that fails; samples already written for earlier
/// files are left in place and no combined file is written.
///
/// # Errors
///
/// * [`IngestError::NoInputFiles`] if nothing in `input_dir` matches.
/// * Any error from [`sample_file`] or [`combine_samples`].
pub fn sample_directory(
    input_dir: &Path,
    output_dir: &Path,
    prefix: &str,
    options: &SampleOptions,
    progress: &dyn ProgressCallback,
) -> Result<BatchReport, IngestError> {
    options.validate()?;

    let raw_files = discover_raw_files(input_dir, prefix)?;
    if raw_files.is_empty() {
        return Err(IngestError::NoInputFiles {
            dir: input_dir.display().to_string(),
            prefix: prefix.to_string(),
        });
    }

    std::fs::create_dir_all(output_dir).map_err(|e| IngestError::io(output_dir, e))?;
    progress.set_total(raw_files.len() as u64);

    let mut files = Vec::with_capacity(raw_files.len());
    for raw in &raw_files {
        progress.set_message(format!("Sampling {}", raw.month_tag));
        match sample_file(raw, output_dir, options) {
            Ok(report) => {
                files.push(report);
                progress.inc(1);
            }
            Err(e) => {
                log::error!("Error sampling {}: {e}", raw.path.display());
                progress.finish(format!("Failed on {}", raw.month_tag));
                return Err(e);
            }
        }
    }

    let outputs: Vec<PathBuf> = files.iter().map(|r| r.output.clone()).collect();
    let combined = output_dir.join(COMBINED_FILE_NAME);
    let combined_rows = combine_samples(&outputs, &combined)?;

    progress.finish(format!(
        "Sampled {} file(s), {combined_rows} rows combined",
        files.len()
    ));

    Ok(BatchReport {
        files,
        combined,
        combined_rows,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::progress::NullProgress;
    use crate::test_support::{parquet_rows, scratch_dir, write_parquet};

    fn key(hour: u32, weekday: u32) -> StratumKey {
        StratumKey::new(hour, weekday).unwrap()
    }

    /// `per_stratum` rows in each of `strata` hours on a Monday.
    fn monday_keys(strata: u32, per_stratum: usize) -> Vec<StratumKey> {
        (0..strata)
            .flat_map(|h| std::iter::repeat_n(key(h, 0), per_stratum))
            .collect()
    }

    fn options(fraction: f64, seed: u64) -> SampleOptions {
        SampleOptions { fraction, seed }
    }

    const TEN_STRATA: &str = "SELECT (i % 3 + 1)::INTEGER AS VendorID,
            TIMESTAMP '2025-01-06 00:00:00' + to_hours(i % 10) + to_minutes(i % 60)
                AS tpep_pickup_datetime,
            (100 + i % 50)::INTEGER AS PULocationID,
            (10 + i % 5)::DOUBLE AS fare_amount
         FROM range(1000) t(i)";

    #[test]
    fn sample_size_rounds_up() {
        assert_eq!(sample_size(0.1, 1000), 100);
        assert_eq!(sample_size(0.1, 7), 1);
        assert_eq!(sample_size(0.1, 0), 0);
        assert_eq!(sample_size(1.0, 12), 12);
    }

    #[test]
    fn equal_strata_get_equal_shares() {
        let sizes: Vec<_> = (0..10).map(|h| (key(h, 0), 100)).collect();
        assert_eq!(allocate(&sizes, 100), vec![10; 10]);
    }

    #[test]
    fn leftover_goes_to_largest_remainder_then_larger_stratum() {
        // quotas 2.5, 1.5, 1.0
        let sizes = vec![(key(0, 0), 5), (key(1, 0), 3), (key(2, 0), 2)];
        assert_eq!(allocate(&sizes, 5), vec![3, 1, 1]);
    }

    #[test]
    fn equal_remainders_and_sizes_fall_back_to_key_order() {
        let sizes = vec![(key(3, 1), 2), (key(3, 0), 2), (key(4, 0), 2)];
        assert_eq!(allocate(&sizes, 1), vec![0, 1, 0]);
    }

    #[test]
    fn allocation_sums_to_total_and_fits_strata() {
        let sizes = vec![(key(0, 0), 7), (key(0, 1), 13), (key(0, 2), 2), (key(5, 6), 41)];
        for total in 0..=63 {
            let counts = allocate(&sizes, total);
            assert_eq!(counts.iter().sum::<usize>(), total);
            for (c, (_, n)) in counts.iter().zip(&sizes) {
                assert!(c <= n);
            }
        }
    }

    #[test]
    fn ten_equal_strata_at_ten_percent() {
        let keys = monday_keys(10, 100);
        let plan = plan_sample(&keys, &SampleOptions::default()).unwrap();

        assert_eq!(plan.eligible_rows, 1000);
        assert_eq!(plan.selected.len(), 100);
        assert!(plan.allocation.values().all(|&n| n == 10));
        for h in 0..10 {
            let in_stratum = plan.selected.iter().filter(|&&p| keys[p] == key(h, 0)).count();
            assert_eq!(in_stratum, 10);
        }

        let unique: BTreeSet<_> = plan.selected.iter().collect();
        assert_eq!(unique.len(), plan.selected.len());
        assert!(plan.selected.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn singleton_stratum_is_excluded() {
        let mut keys = monday_keys(10, 100);
        keys.push(key(15, 5));
        let lonely = keys.len() - 1;

        let plan = plan_sample(&keys, &SampleOptions::default()).unwrap();

        assert_eq!(plan.eligible_rows, 1000);
        assert_eq!(plan.selected.len(), 100);
        assert_eq!(plan.excluded, vec![(key(15, 5), 1)]);
        assert_eq!(plan.excluded_rows(), 1);
        assert!(!plan.selected.contains(&lonely));
    }

    #[test]
    fn same_seed_same_sample() {
        let keys = monday_keys(10, 100);
        let a = plan_sample(&keys, &options(0.1, 7)).unwrap();
        let b = plan_sample(&keys, &options(0.1, 7)).unwrap();
        let c = plan_sample(&keys, &options(0.1, 8)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.selected, c.selected);
    }

    #[test]
    fn rejects_fractions_outside_unit_interval() {
        let keys = monday_keys(2, 5);
        for bad in [0.0, -0.5, 1.5, f64::NAN] {
            assert!(matches!(
                plan_sample(&keys, &options(bad, 1)),
                Err(IngestError::InvalidFraction(_))
            ));
        }
        assert_eq!(plan_sample(&keys, &options(1.0, 1)).unwrap().selected.len(), 10);
    }

    #[test]
    fn only_degenerate_strata_yield_empty_sample() {
        let keys = vec![key(1, 1), key(2, 2)];
        let plan = plan_sample(&keys, &SampleOptions::default()).unwrap();
        assert!(plan.selected.is_empty());
        assert_eq!(plan.eligible_rows, 0);
        assert_eq!(plan.excluded.len(), 2);
    }

    #[test]
    fn samples_file_without_stratification_columns() {
        let dir = scratch_dir("sample_file");
        let input = dir.join("yellow_tripdata_2025-01.parquet");
        write_parquet(
            &input,
            &format!(
                "{TEN_STRATA} UNION ALL
                 SELECT 1, TIMESTAMP '2025-01-11 15:00:00', 7, 3.0"
            ),
        );
        let raw = RawFile {
            month_tag: "2025-01".to_string(),
            path: input,
        };

        let report = sample_file(&raw, &dir, &SampleOptions::default()).unwrap();
        assert_eq!(report.rows_read, 1001);
        assert_eq!(report.eligible_rows, 1000);
        assert_eq!(report.excluded_rows, 1);
        assert_eq!(report.sampled_rows, 100);
        assert!(report.output.ends_with("2025-01_sampled_data.parquet"));
        assert_eq!(parquet_rows(&report.output), 100);

        let conn = Connection::open_in_memory().unwrap();
        let source = sql_string(&report.output.to_string_lossy());
        let columns = column_names(&conn, &format!("read_parquet({source})")).unwrap();
        let expected: BTreeSet<String> = ["vendorid", "tpep_pickup_datetime", "pulocationid", "fare_amount"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(columns, expected);

        let per_hour: i64 = conn
            .query_row(
                &format!(
                    "SELECT MAX(n) - MIN(n) FROM (
                        SELECT hour(tpep_pickup_datetime) AS h, COUNT(*) AS n
                        FROM read_parquet({source}) GROUP BY h)"
                ),
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(per_hour, 0);

        assert!(!dir.join(".2025-01_sampled_data.parquet.tmp").exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn null_timestamp_fails_without_output() {
        let dir = scratch_dir("sample_null_ts");
        let input = dir.join("yellow_tripdata_2025-02.parquet");
        write_parquet(
            &input,
            "SELECT * FROM (VALUES
                (TIMESTAMP '2025-02-03 08:00:00', 1),
                (NULL, 2),
                (TIMESTAMP '2025-02-03 09:00:00', 3)
             ) t(tpep_pickup_datetime, PULocationID)",
        );
        let raw = RawFile {
            month_tag: "2025-02".to_string(),
            path: input,
        };

        let err = sample_file(&raw, &dir, &SampleOptions::default()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("yellow_tripdata_2025-02.parquet"), "{msg}");
        assert!(msg.contains("row 2 of 3"), "{msg}");
        assert!(!dir.join("2025-02_sampled_data.parquet").exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn bad_row_is_numbered_by_file_position() {
        let dir = scratch_dir("sample_bad_row_position");
        let input = dir.join("yellow_tripdata_2025-03.parquet");
        // several row groups so a parallel scan could interleave them
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(&format!(
            "COPY (SELECT CASE WHEN i = 4321 THEN NULL
                               ELSE TIMESTAMP '2025-03-03 00:00:00' + to_minutes(i % 1440)
                          END AS tpep_pickup_datetime,
                          i AS seq
                   FROM range(6000) t(i) ORDER BY i)
             TO {} (FORMAT PARQUET, ROW_GROUP_SIZE 500)",
            sql_string(&input.to_string_lossy())
        ))
        .unwrap();
        let raw = RawFile {
            month_tag: "2025-03".to_string(),
            path: input,
        };

        let msg = sample_file(&raw, &dir, &SampleOptions::default())
            .unwrap_err()
            .to_string();
        assert!(msg.contains("row 4322 of 6000"), "{msg}");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn samples_directory_and_combines() {
        let dir = scratch_dir("sample_dir");
        let raw_dir = dir.join("raw");
        let out_dir = dir.join("sampled");
        std::fs::create_dir_all(&raw_dir).unwrap();
        write_parquet(&raw_dir.join("yellow_tripdata_2025-01.parquet"), TEN_STRATA);
        write_parquet(&raw_dir.join("yellow_tripdata_2025-02.parquet"), TEN_STRATA);

        let report = sample_directory(
            &raw_dir,
            &out_dir,
            "yellow_tripdata_",
            &SampleOptions::default(),
            &NullProgress,
        )
        .unwrap();

        assert_eq!(report.files.len(), 2);
        assert_eq!(report.files[0].month_tag, "2025-01");
        assert_eq!(report.combined_rows, 200);
        assert_eq!(parquet_rows(&report.combined), 200);
        assert!(out_dir.join("2025-02_sampled_data.parquet").exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn directory_run_stops_at_first_failure() {
        let dir = scratch_dir("sample_dir_fail");
        let raw_dir = dir.join("raw");
        let out_dir = dir.join("sampled");
        std::fs::create_dir_all(&raw_dir).unwrap();
        write_parquet(&raw_dir.join("yellow_tripdata_2025-01.parquet"), TEN_STRATA);
        write_parquet(
            &raw_dir.join("yellow_tripdata_2025-02.parquet"),
            "SELECT 1 AS PULocationID",
        );

        let err = sample_directory(
            &raw_dir,
            &out_dir,
            "yellow_tripdata_",
            &SampleOptions::default(),
            &NullProgress,
        )
        .unwrap_err();

        assert!(matches!(err, IngestError::MalformedInput { .. }));
        assert!(out_dir.join("2025-01_sampled_data.parquet").exists());
        assert!(!out_dir.join(COMBINED_FILE_NAME).exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = scratch_dir("sample_dir_empty");
        let err = sample_directory(
            &dir,
            &dir.join("out"),
            "yellow_tripdata_",
            &SampleOptions::default(),
            &NullProgress,
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::NoInputFiles { .. }));
        std::fs::remove_dir_all(&dir).ok();
    }
}
