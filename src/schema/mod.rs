pub mod arrow;
pub mod infer;
pub mod types;

pub use arrow::{build_arrow_schema, map_to_arrow_type, to_record_batch};
pub use infer::{infer_schema, materialize_date_overrides};
pub use types::{Column, ColumnSchema, ColumnType};
