// src/schema/arrow.rs

use arrow::array::{ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use std::sync::Arc;

use super::types::{ColumnSchema, ColumnType};
use crate::clean::normalize::robust_parse_date;
use crate::table::{Cell, NormalizedTable};

/// Map a warehouse column type into an Arrow DataType.
pub fn map_to_arrow_type(ty: ColumnType) -> DataType {
    match ty {
        ColumnType::String => DataType::Utf8,
        ColumnType::Int64 => DataType::Int64,
        ColumnType::Float64 => DataType::Float64,
        ColumnType::Bool => DataType::Boolean,
        ColumnType::Date => DataType::Date32,
    }
}

/// Build an ArrowSchema (inside an Arc) from a `ColumnSchema`. Every
/// field is nullable: any cell can degrade to empty during cleaning.
pub fn build_arrow_schema(schema: &ColumnSchema) -> Arc<ArrowSchema> {
    let fields: Vec<ArrowField> = schema
        .columns
        .iter()
        .map(|col| ArrowField::new(&col.name, map_to_arrow_type(col.ty), true))
        .collect();
    Arc::new(ArrowSchema::new(fields))
}

/// Materialize a normalized table as a RecordBatch matching `schema`.
/// Cells that cannot be represented in the column's declared type become
/// nulls rather than failing the batch.
pub fn to_record_batch(
    table: &NormalizedTable,
    schema: &ColumnSchema,
) -> Result<RecordBatch, ArrowError> {
    let arrow_schema = build_arrow_schema(schema);
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(schema.columns.len());

    for (idx, col) in schema.columns.iter().enumerate() {
        let array: ArrayRef = match col.ty {
            ColumnType::String => {
                let values: Vec<Option<String>> = table
                    .column_cells(idx)
                    .map(|c| (!c.is_empty()).then(|| c.to_display()))
                    .collect();
                Arc::new(StringArray::from(values))
            }
            ColumnType::Int64 => {
                let values: Vec<Option<i64>> =
                    table.column_cells(idx).map(cell_to_i64).collect();
                Arc::new(Int64Array::from(values))
            }
            ColumnType::Float64 => {
                let values: Vec<Option<f64>> =
                    table.column_cells(idx).map(Cell::as_f64).collect();
                Arc::new(Float64Array::from(values))
            }
            ColumnType::Bool => {
                let values: Vec<Option<bool>> =
                    table.column_cells(idx).map(cell_to_bool).collect();
                Arc::new(BooleanArray::from(values))
            }
            ColumnType::Date => {
                let values: Vec<Option<i32>> =
                    table.column_cells(idx).map(cell_to_date32).collect();
                Arc::new(Date32Array::from(values))
            }
        };
        arrays.push(array);
    }

    RecordBatch::try_new(arrow_schema, arrays)
}

fn cell_to_i64(cell: &Cell) -> Option<i64> {
    match cell {
        Cell::Int(v) => Some(*v),
        Cell::Float(v) if v.fract() == 0.0 => Some(*v as i64),
        Cell::Str(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn cell_to_bool(cell: &Cell) -> Option<bool> {
    match cell {
        Cell::Bool(v) => Some(*v),
        Cell::Str(s) => match s.trim() {
            t if t.eq_ignore_ascii_case("true") => Some(true),
            t if t.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn cell_to_date32(cell: &Cell) -> Option<i32> {
    let date = match cell {
        Cell::Date(d) => Some(*d),
        Cell::Str(s) => robust_parse_date(s, None),
        _ => None,
    }?;
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    Some(date.signed_duration_since(epoch).num_days() as i32)
}
