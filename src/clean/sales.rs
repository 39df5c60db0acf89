// src/clean/sales.rs
//
// Cleaners for the sales-side reports: the item-wise sales report, the
// pending sales order report, sales invoices and sales order details.

use tracing::debug;

use super::normalize::{
    drop_rows_where_blank, drop_rows_where_equals, group_key_column, standardize_column_names,
    standardize_date_column,
};
use super::{require_columns, CleanError, Cleaned};
use crate::table::{Cell, RawTable};

/// Columns the pending sales order feed must deliver, post-normalization.
const PENDING_ORDER_COLUMNS: [&str; 8] = [
    "Customer_Name",
    "Item_Code",
    "Item_Name",
    "Color_Name_Code",
    "Total",
    "SO_No",
    "SO_Date",
    "Broker",
];

/// Item-wise sales report. One logical record spans several physical
/// rows: an item header row carries the item code and color, the
/// following rows carry the per-size sales lines. The header rows also
/// interleave "Size" and "Total" subtotal rows that must go.
pub fn clean_sales_report(mut t: RawTable) -> Result<Cleaned, CleanError> {
    debug!(rows = t.num_rows(), "cleaning sales report");
    t.drop_blank_columns();
    t.drop_columns_where(|_, h| h.starts_with("Unnamed"));
    require_columns(&t, &["Date", "Total", "Order No"])?;

    drop_rows_where_equals(&mut t, "Date", "Total");

    // Item header rows have the leading serial column set; their code and
    // color propagate down through the sales lines of that item.
    let code = group_key_column(&t, 0, 1);
    let color = group_key_column(&t, 0, 2);
    t.set_column("Item Code", code);
    t.set_column("Item Color", color);
    drop_rows_where_blank(&mut t, "Item Code");

    let total_idx = t.column_index("Total").unwrap();
    let date_idx = t.column_index("Date").unwrap();
    t.retain_rows(|t, r| {
        t.cell(r, date_idx).to_display() != "Size" && !t.cell(r, total_idx).is_empty()
    });
    t.drop_column("Size Group");
    drop_rows_where_equals(&mut t, "Date", "Total");
    drop_rows_where_blank(&mut t, "Order No");
    t.drop_first_column();

    standardize_column_names(&mut t);
    let mut warnings = Vec::new();
    standardize_date_column(&mut t, "Date", &mut warnings);
    Ok(Cleaned {
        table: t.finalize(),
        warnings,
    })
}

/// Pending sales order report: a fixed projection of the customer-wise
/// item detail export.
pub fn clean_pending_sales_order(mut t: RawTable) -> Result<Cleaned, CleanError> {
    debug!(rows = t.num_rows(), "cleaning pending sales order");
    standardize_column_names(&mut t);
    require_columns(&t, &PENDING_ORDER_COLUMNS)?;

    let mut warnings = Vec::new();
    standardize_date_column(&mut t, "SO_Date", &mut warnings);

    t.select_columns(&PENDING_ORDER_COLUMNS);
    drop_rows_where_blank(&mut t, "SO_No");
    t.stringify();
    Ok(Cleaned {
        table: t.finalize(),
        warnings,
    })
}

/// Sales invoice register: leading index column, a blank spacer column
/// and a trailing grand-total row around otherwise flat rows.
pub fn clean_sales_invoice(mut t: RawTable) -> Result<Cleaned, CleanError> {
    debug!(rows = t.num_rows(), "cleaning sales invoice");
    t.drop_column("Unnamed: 0");
    standardize_column_names(&mut t);
    t.drop_blank_header_columns();
    require_columns(&t, &["Date", "Created_Date"])?;
    t.drop_last_row();

    let mut warnings = Vec::new();
    standardize_date_column(&mut t, "Date", &mut warnings);
    standardize_date_column(&mut t, "Created_Date", &mut warnings);
    t.stringify();
    Ok(Cleaned {
        table: t.finalize(),
        warnings,
    })
}

/// Sales order details export. Its headers carry `#` markers and
/// bracketed qualifiers, so it gets its own header canonicalization on
/// top of the usual separator mapping.
pub fn clean_sales_order_details(mut t: RawTable) -> Result<Cleaned, CleanError> {
    debug!(rows = t.num_rows(), "cleaning sales order details");
    for h in &mut t.headers {
        *h = h
            .replace(' ', "_")
            .replace('/', "_")
            .replace('#', "column_n")
            .replace(['[', ']'], "");
    }
    require_columns(&t, &["SO_Date", "Expected_Date"])?;

    let mut warnings = Vec::new();
    standardize_date_column(&mut t, "SO_Date", &mut warnings);
    standardize_date_column(&mut t, "Expected_Date", &mut warnings);
    t.drop_last_row();
    t.stringify();
    Ok(Cleaned {
        table: t.finalize(),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::CleanError;

    fn grid(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| Cell::from_raw(c)).collect())
                .collect(),
        )
    }

    #[test]
    fn sales_report_propagates_item_keys_and_drops_structure_rows() {
        // Two item groups: headers rows carry the serial + code + color,
        // sales lines carry date/order/total. Interleaved "Size" and
        // "Total" rows plus a trailing grand total.
        let t = grid(
            &["Sr No", "Item Code", "Item Color", "Date", "Order No", "Size Group", "Total"],
            &[
                &["1", "KRT-01", "Red", "", "", "", ""],
                &["", "", "", "Size", "", "", ""],
                &["", "", "", "17/07/2024", "SO-11", "M", "10"],
                &["", "", "", "18/07/2024", "SO-12", "L", "4"],
                &["", "", "", "Total", "", "", "14"],
                &["2", "KRT-02", "Blue", "", "", "", ""],
                &["", "", "", "19/07/2024", "SO-13", "S", "6"],
                &["", "", "", "Total", "", "", "6"],
            ],
        );
        let out = clean_sales_report(t.clone()).unwrap();
        let n = &out.table;
        // 2 groups with 2 and 1 continuation (sales) rows.
        assert_eq!(n.num_rows(), 3);
        assert_eq!(
            n.columns(),
            &["Item_Code", "Item_Color", "Date", "Order_No", "Total"]
        );
        let code = n.column_index("Item_Code").unwrap();
        assert_eq!(n.cell(0, code), &Cell::Str("KRT-01".into()));
        assert_eq!(n.cell(2, code), &Cell::Str("KRT-02".into()));
        assert!(n.column_cells(code).all(|c| !c.is_empty()));
        let date = n.column_index("Date").unwrap();
        assert_eq!(n.cell(0, date), &Cell::Str("2024-07-17".into()));
        // No sentinel rows survived.
        assert!(n.column_cells(date).all(|c| c.to_display() != "Total"));

        // Deterministic: a second run over the same input agrees.
        let again = clean_sales_report(t).unwrap();
        assert_eq!(again.table, out.table);
    }

    #[test]
    fn pending_order_missing_so_no_is_reported() {
        let t = grid(
            &["Customer Name", "Item Code", "Item Name", "Color Name/Code", "Total", "SO Date", "Broker"],
            &[&["A", "B", "C", "D", "1", "17-07-2024", "X"]],
        );
        let err = clean_pending_sales_order(t).unwrap_err();
        match err {
            CleanError::MissingColumns { missing, observed } => {
                assert_eq!(missing, vec!["SO_No".to_string()]);
                assert!(observed.contains(&"Customer_Name".to_string()));
            }
        }
    }

    #[test]
    fn pending_order_projects_and_drops_blank_so_no() {
        let t = grid(
            &["Customer Name", "Item Code", "Item Name", "Color Name/Code", "Total", "SO No", "SO Date", "Broker", "Extra"],
            &[
                &["A", "I1", "Kurti", "Red-01", "5", "SO-9", "17/07/2024", "BRK", "zz"],
                &["B", "I2", "Saree", "Blue-02", "2", "", "18/07/2024", "BRK", "zz"],
            ],
        );
        let out = clean_pending_sales_order(t).unwrap();
        let n = &out.table;
        assert_eq!(n.columns(), &PENDING_ORDER_COLUMNS);
        assert_eq!(n.num_rows(), 1);
        let so_date = n.column_index("SO_Date").unwrap();
        assert_eq!(n.cell(0, so_date), &Cell::Str("2024-07-17".into()));
    }

    #[test]
    fn sales_invoice_trims_structure() {
        let t = grid(
            &["Unnamed: 0", "Date", "Created Date", "", "Amount"],
            &[
                &["0", "17/07/2024", "18/07/2024", "x", "5"],
                &["1", "19/07/2024", "19/07/2024", "x", "7"],
                &["", "Grand Total", "", "", "12"],
            ],
        );
        let out = clean_sales_invoice(t).unwrap();
        let n = &out.table;
        assert_eq!(n.columns(), &["Date", "Created_Date", "Amount"]);
        assert_eq!(n.num_rows(), 2);
        assert_eq!(n.cell(1, 0), &Cell::Str("2024-07-19".into()));
        // The unparseable "Grand Total" row was dropped positionally, so
        // no date warnings were emitted for it.
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn sales_order_details_mangles_headers_its_own_way() {
        let t = grid(
            &["SO #", "SO Date", "Expected Date", "Qty [Pcs]"],
            &[
                &["9", "17/07/2024", "20/07/2024", "5"],
                &["Total", "", "", "5"],
            ],
        );
        let out = clean_sales_order_details(t).unwrap();
        let n = &out.table;
        assert_eq!(
            n.columns(),
            &["SO_column_n", "SO_Date", "Expected_Date", "Qty_Pcs"]
        );
        assert_eq!(n.num_rows(), 1);
        assert_eq!(n.cell(0, 2), &Cell::Str("2024-07-20".into()));
    }
}
