// src/export/mod.rs
//
// The "produce a raw export file" collaborator seam. The browser
// automation that actually drives the ERP lives outside this crate; all
// the pipeline needs is something that can hand it a finished export
// file, which `DirectoryProvider` does by watching the download folder
// the automation points at.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use calamine::{open_workbook, Data, Reader, Xlsx};
use csv::ReaderBuilder;
use glob::glob;
use thiserror::Error;
use tracing::{debug, info};

use crate::table::{Cell, RawTable};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no completed export appeared in {dir} within {timeout:?}")]
    Timeout { dir: String, timeout: Duration },
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),
    #[error("export {0} has no rows")]
    EmptyExport(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("reading csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("reading workbook: {0}")]
    Xlsx(#[from] calamine::XlsxError),
}

/// External collaborator boundary: deliver the raw export file for one
/// report folder and location.
pub trait ExportProvider {
    fn fetch(&self, report_folder: &str, location: &str) -> Result<PathBuf, ExportError>;
}

/// Watches `<root>/<location>/<report folder>/` for a completed `.csv`
/// or `.xlsx` download, ignoring in-progress `.crdownload` artifacts.
pub struct DirectoryProvider {
    root: PathBuf,
    timeout: Duration,
}

impl DirectoryProvider {
    pub fn new(root: impl Into<PathBuf>, timeout: Duration) -> Self {
        DirectoryProvider {
            root: root.into(),
            timeout,
        }
    }
}

impl ExportProvider for DirectoryProvider {
    fn fetch(&self, report_folder: &str, location: &str) -> Result<PathBuf, ExportError> {
        let dir = self.root.join(location).join(report_folder);
        debug!(dir = %dir.display(), "waiting for export download");
        let deadline = Instant::now() + self.timeout;

        loop {
            let mut candidates: Vec<PathBuf> = Vec::new();
            for pattern in ["*.csv", "*.xlsx"] {
                let full = format!("{}/{}", dir.display(), pattern);
                for entry in glob(&full).into_iter().flatten().flatten() {
                    candidates.push(entry);
                }
            }
            // Newest finished file wins; a re-run may leave older exports behind.
            candidates.sort_by_key(|p| {
                p.metadata()
                    .and_then(|m| m.modified())
                    .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
            });
            if let Some(path) = candidates.pop() {
                info!(path = %path.display(), "export ready");
                return Ok(path);
            }
            if Instant::now() >= deadline {
                return Err(ExportError::Timeout {
                    dir: dir.display().to_string(),
                    timeout: self.timeout,
                });
            }
            std::thread::sleep(Duration::from_secs(1));
        }
    }
}

/// Parse a finished export into a `RawTable`, keyed off the extension.
pub fn read_export(path: &Path) -> Result<RawTable, ExportError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match ext.as_str() {
        "csv" => read_csv(path),
        "xlsx" | "xls" => read_xlsx(path),
        other => Err(ExportError::UnsupportedFormat(other.to_string())),
    }
}

fn read_csv(path: &Path) -> Result<RawTable, ExportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Vec<Cell> = record.iter().map(Cell::from_raw).collect();
        // Fully blank rows carry no information for any cleaner.
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        rows.push(row);
    }
    if headers.is_empty() {
        return Err(ExportError::EmptyExport(path.display().to_string()));
    }
    debug!(path = %path.display(), rows = rows.len(), "parsed csv export");
    Ok(RawTable::new(headers, rows))
}

fn read_xlsx(path: &Path) -> Result<RawTable, ExportError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ExportError::EmptyExport(path.display().to_string()))?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows_iter = range.rows();
    let header_row = rows_iter
        .next()
        .ok_or_else(|| ExportError::EmptyExport(path.display().to_string()))?;
    let headers: Vec<String> = header_row
        .iter()
        .map(|c| c.to_string().trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for data_row in rows_iter {
        let row: Vec<Cell> = data_row.iter().map(convert_xlsx_cell).collect();
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        rows.push(row);
    }
    debug!(path = %path.display(), rows = rows.len(), "parsed xlsx export");
    Ok(RawTable::new(headers, rows))
}

/// Excel cells keep native typing; carry it through instead of flattening
/// everything to text.
fn convert_xlsx_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from_raw(s),
        Data::Int(v) => Cell::Int(*v),
        Data::Float(v) => Cell::Float(*v),
        Data::Bool(v) => Cell::Bool(*v),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => Cell::Date(naive.date()),
            None => Cell::from_raw(&data.to_string()),
        },
        other => Cell::from_raw(&other.to_string()),
    }
}
