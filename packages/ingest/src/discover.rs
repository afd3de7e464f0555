//! Finds raw monthly trip files in a directory.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::IngestError;

/// One raw trip file and the month tag embedded in its name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RawFile {
    /// Month tag, e.g. `2025-01` for `yellow_tripdata_2025-01.parquet`.
    pub month_tag: String,
    /// Full path to the file.
    pub path: PathBuf,
}

fn name_pattern(prefix: &str) -> Result<Regex, IngestError> {
    Regex::new(&format!(r"^{}(.+)\.parquet$", regex::escape(prefix))).map_err(|e| {
        IngestError::MalformedInput {
            file: prefix.to_string(),
            message: format!("invalid file prefix: {e}"),
        }
    })
}

/// Lists the `<prefix><month-tag>.parquet` files directly inside `dir`,
/// sorted by month tag.
///
/// # Errors
///
/// Returns [`IngestError::Io`] if the directory cannot be read.
pub fn discover_raw_files(dir: &Path, prefix: &str) -> Result<Vec<RawFile>, IngestError> {
    let pattern = name_pattern(prefix)?;
    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| IngestError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(captures) = pattern.captures(name) {
            files.push(RawFile {
                month_tag: captures[1].to_string(),
                path: path.clone(),
            });
        }
    }

    files.sort();
    log::debug!("Found {} raw file(s) in {}", files.len(), dir.display());
    Ok(files)
}
