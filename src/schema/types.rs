// src/schema/types.rs

use serde::{Deserialize, Serialize};

/// Warehouse column types. Overrides in config files use the same
/// spellings (`STRING`, `INT64`, `FLOAT64`, `BOOL`, `DATE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    String,
    Int64,
    Float64,
    Bool,
    Date,
}

/// A single destination column.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq, Hash)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
}

/// Ordered column → type mapping for one normalized table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub columns: Vec<Column>,
}

impl ColumnSchema {
    pub fn get(&self, name: &str) -> Option<ColumnType> {
        self.columns.iter().find(|c| c.name == name).map(|c| c.ty)
    }
}
