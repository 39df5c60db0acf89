pub mod accounts;
pub mod inventory;
pub mod masters;
pub mod normalize;
pub mod purchase;
pub mod sales;

use thiserror::Error;

use crate::table::{NormalizedTable, RawTable};

/// Fatal cleaning failures. One report failing never aborts its siblings;
/// the runner captures this per report.
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("missing required columns {missing:?} (observed columns: {observed:?})")]
    MissingColumns {
        missing: Vec<String>,
        observed: Vec<String>,
    },
}

/// Non-fatal degradations collected while cleaning. The value involved
/// has already been resolved to an empty cell; these exist for audit.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseWarning {
    UnparseableDate {
        column: String,
        row: usize,
        value: String,
    },
    UnparseableNumber {
        column: String,
        row: usize,
        value: String,
    },
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::UnparseableDate { column, row, value } => {
                write!(f, "unparseable date in `{}` row {}: {:?}", column, row, value)
            }
            ParseWarning::UnparseableNumber { column, row, value } => {
                write!(f, "unparseable number in `{}` row {}: {:?}", column, row, value)
            }
        }
    }
}

/// A cleaner's successful result: the normalized table plus any parse
/// degradations that happened along the way.
#[derive(Debug)]
pub struct Cleaned {
    pub table: NormalizedTable,
    pub warnings: Vec<ParseWarning>,
}

impl Cleaned {
    pub fn new(table: NormalizedTable) -> Self {
        Cleaned {
            table,
            warnings: Vec::new(),
        }
    }
}

/// Required-column contract: every cleaner that addresses columns by name
/// validates them up front so a shape drift in the export surfaces as a
/// `MissingColumns` error instead of a silently wrong table.
pub fn require_columns(table: &RawTable, required: &[&str]) -> Result<(), CleanError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !table.has_column(name))
        .map(|name| name.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CleanError::MissingColumns {
            missing,
            observed: table.headers.clone(),
        })
    }
}
