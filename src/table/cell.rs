// src/table/cell.rs

use chrono::NaiveDate;

/// A single cell of an exported report grid.
///
/// Exports arrive with mixed typing (Excel cells keep native numbers and
/// dates, CSV cells are all text), so every value is carried as one of
/// these variants until a cleaner retypes it.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl Cell {
    /// Build a cell from raw export text: trims, and maps blank text to `Empty`.
    pub fn from_raw(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else {
            Cell::Str(trimmed.to_string())
        }
    }

    /// `Empty`, or a string that is blank after trimming. Every row/column
    /// pruning rule in the cleaners uses this definition of "blank".
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Str(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The display-string form used when a cleaner stringifies a table.
    /// `Empty` stays empty rather than becoming a literal `"nan"`.
    pub fn to_display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Str(s) => s.clone(),
            Cell::Int(v) => v.to_string(),
            Cell::Float(v) => v.to_string(),
            Cell::Bool(v) => v.to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    /// Numeric view of the cell, parsing string cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            Cell::Str(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// True when the cell holds a number (natively or as numeric text).
    pub fn is_numeric(&self) -> bool {
        self.as_f64().is_some()
    }
}
