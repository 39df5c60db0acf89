// src/schema/infer.rs

use std::collections::HashMap;

use tracing::debug;

use super::types::{Column, ColumnSchema, ColumnType};
use crate::clean::normalize::robust_parse_date;
use crate::table::{Cell, NormalizedTable};

/// Reparse every override-flagged DATE column from its normalized string
/// form into real date cells, so the declared type matches the
/// materialized representation. Invalid values become empty cells.
pub fn materialize_date_overrides(
    table: &mut NormalizedTable,
    overrides: &HashMap<String, ColumnType>,
) {
    for (name, ty) in overrides {
        if *ty != ColumnType::Date {
            continue;
        }
        let Some(idx) = table.column_index(name) else {
            continue;
        };
        table.map_column(idx, |cell| match cell {
            Cell::Date(d) => Cell::Date(*d),
            c if c.is_empty() => Cell::Empty,
            c => match robust_parse_date(&c.to_display(), None) {
                Some(d) => Cell::Date(d),
                None => Cell::Empty,
            },
        });
    }
}

/// Map every column to a warehouse type. Overrides apply verbatim; all
/// other columns get the type their non-empty values agree on, falling
/// back to STRING on any disagreement or when the column has no values.
/// Total and deterministic for a given value distribution.
pub fn infer_schema(
    table: &NormalizedTable,
    overrides: &HashMap<String, ColumnType>,
) -> ColumnSchema {
    let columns = table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let ty = match overrides.get(name) {
                Some(ty) => *ty,
                None => infer_column(table, idx, name),
            };
            Column {
                name: name.clone(),
                ty,
            }
        })
        .collect();
    let schema = ColumnSchema { columns };

    // Overrides always win, so a conflict here is a programming error.
    debug_assert!(overrides
        .iter()
        .all(|(name, ty)| schema.get(name).map_or(true, |got| got == *ty)));

    schema
}

fn infer_column(table: &NormalizedTable, idx: usize, name: &str) -> ColumnType {
    let mut agreed: Option<ColumnType> = None;
    for cell in table.column_cells(idx) {
        if cell.is_empty() {
            continue;
        }
        let ty = cell_type(cell);
        agreed = match agreed {
            None => Some(ty),
            Some(prev) => Some(join(prev, ty)),
        };
        if agreed == Some(ColumnType::String) {
            break;
        }
    }
    match agreed {
        Some(ty) => ty,
        None => {
            debug!(column = name, "no non-empty samples, defaulting to STRING");
            ColumnType::String
        }
    }
}

/// The type one cell votes for. String cells are sniffed with the same
/// ladder used for native cells: integer, float, bool, then date.
fn cell_type(cell: &Cell) -> ColumnType {
    match cell {
        Cell::Int(_) => ColumnType::Int64,
        Cell::Float(v) => {
            if v.fract() == 0.0 {
                ColumnType::Int64
            } else {
                ColumnType::Float64
            }
        }
        Cell::Bool(_) => ColumnType::Bool,
        Cell::Date(_) => ColumnType::Date,
        Cell::Str(s) => {
            let v = s.trim();
            if v.parse::<i64>().is_ok() {
                ColumnType::Int64
            } else if v.parse::<f64>().is_ok() {
                ColumnType::Float64
            } else if v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("false") {
                ColumnType::Bool
            } else if robust_parse_date(v, None).is_some() {
                ColumnType::Date
            } else {
                ColumnType::String
            }
        }
        Cell::Empty => ColumnType::String,
    }
}

fn join(a: ColumnType, b: ColumnType) -> ColumnType {
    use ColumnType::*;
    match (a, b) {
        _ if a == b => a,
        (Int64, Float64) | (Float64, Int64) => Float64,
        _ => String,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RawTable;
    use chrono::NaiveDate;

    fn table(headers: &[&str], rows: &[&[&str]]) -> NormalizedTable {
        RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| Cell::from_raw(c)).collect())
                .collect(),
        )
        .finalize()
    }

    #[test]
    fn integer_strings_infer_int64() {
        let t = table(&["col"], &[&["1"], &["2"], &["3"]]);
        let schema = infer_schema(&t, &HashMap::new());
        assert_eq!(schema.get("col"), Some(ColumnType::Int64));
    }

    #[test]
    fn override_wins_regardless_of_content() {
        let t = table(&["col"], &[&["1"], &["2"], &["3"]]);
        let overrides = HashMap::from([("col".to_string(), ColumnType::String)]);
        let schema = infer_schema(&t, &overrides);
        assert_eq!(schema.get("col"), Some(ColumnType::String));
    }

    #[test]
    fn mixed_numeric_widens_to_float() {
        let t = table(&["col"], &[&["1"], &["2.5"]]);
        let schema = infer_schema(&t, &HashMap::new());
        assert_eq!(schema.get("col"), Some(ColumnType::Float64));
    }

    #[test]
    fn mixed_types_fall_back_to_string() {
        let t = table(&["col"], &[&["1"], &["abc"]]);
        let schema = infer_schema(&t, &HashMap::new());
        assert_eq!(schema.get("col"), Some(ColumnType::String));
    }

    #[test]
    fn empty_column_defaults_to_string() {
        let t = table(&["col"], &[&[""], &[""]]);
        let schema = infer_schema(&t, &HashMap::new());
        assert_eq!(schema.get("col"), Some(ColumnType::String));
    }

    #[test]
    fn uniform_dates_infer_date() {
        let t = table(&["d"], &[&["2024-07-17"], &["17-07-2024"]]);
        let schema = infer_schema(&t, &HashMap::new());
        assert_eq!(schema.get("d"), Some(ColumnType::Date));
    }

    #[test]
    fn date_override_materializes_values_before_inference() {
        let mut t = table(&["d", "x"], &[&["2024-07-17", "a"], &["junk", "b"], &["", "c"]]);
        let overrides = HashMap::from([("d".to_string(), ColumnType::Date)]);
        materialize_date_overrides(&mut t, &overrides);
        assert_eq!(
            t.cell(0, 0),
            &Cell::Date(NaiveDate::from_ymd_opt(2024, 7, 17).unwrap())
        );
        assert_eq!(t.cell(1, 0), &Cell::Empty);
        assert_eq!(t.cell(2, 0), &Cell::Empty);
        let schema = infer_schema(&t, &overrides);
        assert_eq!(schema.get("d"), Some(ColumnType::Date));
        assert_eq!(schema.get("x"), Some(ColumnType::String));
    }

    #[test]
    fn inference_is_deterministic() {
        let t = table(&["a", "b"], &[&["1", "true"], &["2", "false"]]);
        let s1 = infer_schema(&t, &HashMap::new());
        let s2 = infer_schema(&t, &HashMap::new());
        assert_eq!(s1, s2);
        assert_eq!(s1.get("b"), Some(ColumnType::Bool));
    }
}
