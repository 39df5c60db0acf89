// src/clean/purchase.rs
//
// Cleaners for the purchase-side reports: the pending purchase order
// report and the purchase invoice register.

use tracing::debug;

use super::normalize::{drop_rows_where_blank, standardize_column_names, standardize_date_column};
use super::{require_columns, CleanError, Cleaned};
use crate::table::{Cell, RawTable};

/// Pending purchase order report. The export groups items under their
/// vendor: the vendor column holds the vendor name on the group's first
/// row and a running serial number on the item rows below it, so the
/// name is carried forward over the numeric continuation cells.
pub fn clean_pending_purchase_order(mut t: RawTable) -> Result<Cleaned, CleanError> {
    debug!(rows = t.num_rows(), "cleaning pending purchase order");
    t.rename_column(0, "Vendor Name");

    let mut last: Option<Cell> = None;
    t.map_column("Vendor Name", |_, cell| {
        if cell.is_empty() {
            cell.clone()
        } else if cell.is_numeric() {
            last.clone().unwrap_or(Cell::Empty)
        } else {
            last = Some(cell.clone());
            cell.clone()
        }
    });

    // Older exports of this report ship the column pre-normalized.
    let item_col = if t.has_column("Item Name") {
        "Item Name"
    } else if t.has_column("Item_Name") {
        "Item_Name"
    } else {
        return Err(CleanError::MissingColumns {
            missing: vec!["Item Name".to_string()],
            observed: t.headers.clone(),
        });
    };
    drop_rows_where_blank(&mut t, item_col);

    standardize_column_names(&mut t);
    require_columns(&t, &["PO_Date", "Last_Delivery_Date"])?;
    let mut warnings = Vec::new();
    standardize_date_column(&mut t, "PO_Date", &mut warnings);
    standardize_date_column(&mut t, "Last_Delivery_Date", &mut warnings);
    t.stringify();
    Ok(Cleaned {
        table: t.finalize(),
        warnings,
    })
}

/// Purchase invoice register. Header separators are mapped but dashes
/// and trailing dots are left alone, matching the export's own naming.
pub fn clean_purchase_invoice(mut t: RawTable) -> Result<Cleaned, CleanError> {
    debug!(rows = t.num_rows(), "cleaning purchase invoice");
    for h in &mut t.headers {
        *h = h.replace(' ', "_").replace('/', "_");
    }
    t.drop_columns_where(|_, h| h.contains("Unnamed:_0"));
    t.drop_blank_header_columns();
    require_columns(&t, &["Date", "Inv_Date", "Created_Date"])?;

    let mut warnings = Vec::new();
    standardize_date_column(&mut t, "Date", &mut warnings);
    standardize_date_column(&mut t, "Inv_Date", &mut warnings);
    standardize_date_column(&mut t, "Created_Date", &mut warnings);
    t.stringify();
    Ok(Cleaned {
        table: t.finalize(),
        warnings,
    })
}
