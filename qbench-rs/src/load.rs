//! Result file discovery and ingestion.

use crate::error::{MalformedRow, Result, RowError};
use crate::parse::{ParseConfig, parse_row};
use crate::record::RunRecord;
use crate::schema::{Schema, SchemaVersion};
use csv::{ReaderBuilder, Trim};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Rows parsed from one file.
#[derive(Debug, Default)]
pub struct FileLoad {
    pub records: Vec<RunRecord>,
    pub malformed: Vec<MalformedRow>,
    /// Repeated header lines that were skipped
    pub header_rows: usize,
    pub version: Option<SchemaVersion>,
}

/// Everything read in one ingestion pass, in enumeration order.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub files: Vec<PathBuf>,
    pub records: Vec<RunRecord>,
    pub malformed: Vec<MalformedRow>,
    /// Files that could not be read at all, with the reason
    pub unreadable: Vec<(PathBuf, String)>,
}

/// List result files directly inside `dir` whose extension matches, sorted by file name.
///
/// A missing directory yields an empty list; the caller reports that as missing input.
pub fn discover_result_files(dir: impl AsRef<Path>, extension: &str) -> Vec<PathBuf> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        debug!("Results directory {} does not exist", dir.display());
        return Vec::new();
    }

    walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable directory entry: {}", e);
                None
            }
        })
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|s| s.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .collect()
}

/// Parse every row of one CSV stream.
///
/// Malformed rows are logged once each and collected; they never fail the stream.
pub fn load_reader<R: Read>(reader: R, source_name: &str, config: &ParseConfig) -> Result<FileLoad> {
    let mut csv_reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let schema = Schema::from_headers(csv_reader.headers()?.iter());
    debug!(
        "{}: schema {} ({} missing mandatory columns)",
        source_name,
        schema.version,
        schema.missing_mandatory().len()
    );

    let mut load = FileLoad {
        version: Some(schema.version),
        ..Default::default()
    };

    for (index, result) in csv_reader.records().enumerate() {
        // header is line 1
        let fallback_line = index as u64 + 2;
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(fallback_line);
                load.malformed.push(report_malformed(
                    source_name,
                    line,
                    RowError::Unreadable(e.to_string()),
                ));
                continue;
            }
        };
        let line = row.position().map(|p| p.line()).unwrap_or(fallback_line);

        if schema.is_header_row(row.iter()) {
            debug!("{}:{}: skipping repeated header", source_name, line);
            load.header_rows += 1;
            continue;
        }

        match parse_row(&row, &schema, source_name, config) {
            Ok(record) => load.records.push(record),
            Err(cause) => load.malformed.push(report_malformed(source_name, line, cause)),
        }
    }

    Ok(load)
}

fn report_malformed(file: &str, line: u64, cause: RowError) -> MalformedRow {
    let row = MalformedRow {
        file: file.to_string(),
        line,
        cause,
    };
    warn!("Dropping malformed row {}", row);
    row
}

pub fn load_file(path: impl AsRef<Path>, config: &ParseConfig) -> Result<FileLoad> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let source_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");
    load_reader(file, source_name, config)
}

/// Load files in the order given. An unreadable file is skipped with a warning.
pub fn load_all(paths: &[PathBuf], config: &ParseConfig) -> LoadReport {
    let mut report = LoadReport::default();

    for path in paths {
        match load_file(path, config) {
            Ok(load) => {
                debug!(
                    "{}: {} rows, {} malformed",
                    path.display(),
                    load.records.len(),
                    load.malformed.len()
                );
                report.records.extend(load.records);
                report.malformed.extend(load.malformed);
                report.files.push(path.clone());
            }
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                report.unreadable.push((path.clone(), e.to_string()));
            }
        }
    }

    info!(
        "Loaded {} rows from {} file(s) ({} malformed rows dropped)",
        report.records.len(),
        report.files.len(),
        report.malformed.len()
    );
    report
}
