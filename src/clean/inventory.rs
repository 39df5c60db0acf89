// src/clean/inventory.rs
//
// Cleaners for the inventory reports: current stock and stock valuation.

use tracing::debug;

use super::normalize::{drop_rows_where_contains, standardize_column_names};
use super::{CleanError, Cleaned};
use crate::table::RawTable;

/// Stock report: flat rows plus interleaved "Grand Total" subtotal rows
/// keyed on the item column.
pub fn clean_stock(mut t: RawTable) -> Result<Cleaned, CleanError> {
    debug!(rows = t.num_rows(), "cleaning stock report");
    standardize_column_names(&mut t);
    drop_rows_where_contains(&mut t, "Item", "Grand Total", true);
    t.stringify();
    Ok(Cleaned::new(t.finalize()))
}

/// Stock valuation report: flat rows with one trailing aggregate row.
pub fn clean_stock_valuation(mut t: RawTable) -> Result<Cleaned, CleanError> {
    debug!(rows = t.num_rows(), "cleaning stock valuation");
    standardize_column_names(&mut t);
    t.drop_last_row();
    t.stringify();
    Ok(Cleaned::new(t.finalize()))
}
