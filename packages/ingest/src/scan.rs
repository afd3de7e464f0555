//! `DuckDB` table-function expressions for reading trip files.

use std::collections::BTreeSet;
use std::path::Path;

use duckdb::Connection;

use crate::IngestError;

/// Quotes `value` as a SQL string literal.
#[must_use]
pub fn sql_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Returns the table function that reads `path`, chosen by extension.
///
/// # Errors
///
/// Returns [`IngestError::MalformedInput`] for extensions other than
/// `.parquet` and `.csv`.
pub fn source_expr(path: &Path) -> Result<String, IngestError> {
    let quoted = sql_string(&path.to_string_lossy());
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());

    match ext.as_deref() {
        Some("parquet") => Ok(format!("read_parquet({quoted})")),
        Some("csv") => Ok(format!("read_csv_auto({quoted}, header = true)")),
        _ => Err(IngestError::malformed(
            path,
            "unsupported file type (expected .parquet or .csv)",
        )),
    }
}

/// Copies `path` into a new table `table` with a leading 0-based
/// `id_column` holding each row's position in the file. Returns the row
/// count.
///
/// Parquet files use the reader's `file_row_number`. CSV rows are staged
/// first and numbered by insertion order.
///
/// # Errors
///
/// * [`IngestError::MalformedInput`] for unsupported extensions.
/// * [`IngestError::Database`] if `DuckDB` cannot read the file.
pub fn create_numbered_table(
    conn: &Connection,
    path: &Path,
    table: &str,
    id_column: &str,
) -> Result<u64, IngestError> {
    let source = source_expr(path)?;

    if source.starts_with("read_parquet(") {
        let quoted = sql_string(&path.to_string_lossy());
        conn.execute_batch(&format!(
            "CREATE TABLE {table} AS
             SELECT file_row_number AS {id_column}, * EXCLUDE (file_row_number)
             FROM read_parquet({quoted}, file_row_number = true)"
        ))?;
    } else {
        conn.execute_batch(&format!(
            "CREATE TABLE {table}_staged AS SELECT * FROM {source};
             CREATE TABLE {table} AS SELECT rowid AS {id_column}, * FROM {table}_staged;
             DROP TABLE {table}_staged;"
        ))?;
    }

    let rows: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })?;
    Ok(u64::try_from(rows).unwrap_or(0))
}

/// Lowercased column names of `source`.
///
/// # Errors
///
/// Returns [`IngestError::Database`] if `DuckDB` cannot read the file.
pub fn column_names(conn: &Connection, source: &str) -> Result<BTreeSet<String>, IngestError> {
    let mut stmt = conn.prepare(&format!("DESCRIBE SELECT * FROM {source}"))?;
    let mut rows = stmt.query([])?;
    let mut names = BTreeSet::new();

    while let Some(row) = rows.next()? {
        let name: String = row.get(0)?;
        names.insert(name.to_ascii_lowercase());
    }

    Ok(names)
}

/// Fails with [`IngestError::MalformedInput`] naming every column of
/// `required` that `columns` lacks.
///
/// # Errors
///
/// See above.
pub fn require_columns(
    path: &Path,
    columns: &BTreeSet<String>,
    required: &[&str],
) -> Result<(), IngestError> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|c| !columns.contains(&c.to_ascii_lowercase()))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(IngestError::malformed(
            path,
            format!("missing required column(s): {}", missing.join(", ")),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn escapes_single_quotes() {
        assert_eq!(sql_string("it's"), "'it''s'");
    }

    #[test]
    fn picks_reader_by_extension() {
        assert_eq!(
            source_expr(&PathBuf::from("a/b.parquet")).unwrap(),
            "read_parquet('a/b.parquet')"
        );
        assert!(
            source_expr(&PathBuf::from("trips.CSV"))
                .unwrap()
                .starts_with("read_csv_auto('trips.CSV'")
        );
        assert!(matches!(
            source_expr(&PathBuf::from("trips.json")),
            Err(IngestError::MalformedInput { .. })
        ));
    }

    #[test]
    fn numbers_rows_in_file_order() {
        let dir = crate::test_support::scratch_dir("scan_numbered");

        let parquet = dir.join("rows.parquet");
        crate::test_support::write_parquet(
            &parquet,
            "SELECT i AS value FROM range(5000) t(i) ORDER BY i DESC",
        );
        let csv = dir.join("rows.csv");
        std::fs::write(&csv, "value\n30\n10\n20\n").unwrap();

        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(create_numbered_table(&conn, &parquet, "p", "id").unwrap(), 5000);
        assert_eq!(create_numbered_table(&conn, &csv, "c", "id").unwrap(), 3);

        let mismatched: i64 = conn
            .query_row("SELECT COUNT(*) FROM p WHERE id + value <> 4999", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(mismatched, 0);

        let mut stmt = conn.prepare("SELECT value FROM c ORDER BY id").unwrap();
        let values: Vec<i64> = stmt
            .query_map([], |r| r.get(0))
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(values, vec![30, 10, 20]);

        let columns = column_names(&conn, "p").unwrap();
        assert!(!columns.contains("file_row_number"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn reports_every_missing_column() {
        let columns: BTreeSet<String> = ["pulocationid".to_string()].into_iter().collect();
        let err = require_columns(
            &PathBuf::from("x.csv"),
            &columns,
            &["PULocationID", "fare_amount", "total_amount"],
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("x.csv"));
        assert!(msg.contains("fare_amount, total_amount"));
    }
}
