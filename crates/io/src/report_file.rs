// Duplicate report interchange file: written by `check`, parsed back by `remove`.

use std::path::Path;

use listwash_dedup::report::REPORT_HEADER;
use listwash_dedup::ReportRow;

use crate::csv::{read_file_as_utf8, sniff_delimiter};
use crate::error::{ReportFileError, StoreError};

/// Columns `remove` cannot work without.
pub const REQUIRED_COLUMNS: [&str; 4] = ["Sheet A Tab", "A - Business Name", "A - Email", "A - Phone"];

/// Write the report with the fixed header, even when there are no rows.
pub fn write_report(path: &Path, rows: &[ReportRow]) -> Result<(), ReportFileError> {
    let err = |source| ReportFileError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(err)?;

    writer.write_record(REPORT_HEADER).map_err(err)?;
    for row in rows {
        writer.serialize(row).map_err(err)?;
    }
    writer.flush().map_err(|e| err(e.into()))?;
    tracing::info!(path = %path.display(), rows = rows.len(), "wrote duplicate report");
    Ok(())
}

/// Parse a report file. Columns may appear in any order; extra columns are
/// ignored and missing optional ones read as empty.
pub fn read_report(path: &Path) -> Result<Vec<ReportRow>, ReportFileError> {
    let content = read_file_as_utf8(path).map_err(|e| match e {
        StoreError::Io { source, .. } => ReportFileError::Open {
            path: path.to_path_buf(),
            source,
        },
        other => ReportFileError::Open {
            path: path.to_path_buf(),
            source: std::io::Error::other(other.to_string()),
        },
    })?;
    let delimiter = sniff_delimiter(&content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers().map_err(|source| ReportFileError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|want| !headers.iter().any(|h| h.trim() == **want))
        .map(|s| s.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ReportFileError::MissingColumns {
            path: path.to_path_buf(),
            missing,
        });
    }

    let mut rows = Vec::new();
    for result in reader.deserialize::<ReportRow>() {
        rows.push(result.map_err(|source| ReportFileError::Parse {
            path: path.to_path_buf(),
            source,
        })?);
    }
    tracing::debug!(path = %path.display(), rows = rows.len(), "read duplicate report");
    Ok(rows)
}
