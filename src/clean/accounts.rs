// src/clean/accounts.rs
//
// Cleaners for the receivable / payable ledger exports.

use tracing::debug;

use super::normalize::{
    drop_rows_where_blank, drop_rows_where_equals, standardize_column_names,
    standardize_date_column,
};
use super::{require_columns, CleanError, Cleaned};
use crate::table::RawTable;

/// Account payable report: vendor-wise outstanding balances. The export
/// leads with an index column and carries a stray `--Select--Udyam`
/// filter widget column that must go.
pub fn clean_account_payable(mut t: RawTable) -> Result<Cleaned, CleanError> {
    debug!(rows = t.num_rows(), "cleaning account payable");
    standardize_column_names(&mut t);
    t.drop_blank_header_columns();
    t.drop_columns_where(|_, h| h.contains("__Select__Udyam"));
    t.drop_first_column();
    require_columns(&t, &["Vendor_Name"])?;
    drop_rows_where_blank(&mut t, "Vendor_Name");
    t.stringify();
    Ok(Cleaned::new(t.finalize()))
}

/// Account receivable report: customer-wise outstanding with collection
/// dates. Customer names arrive as title rows above each block.
pub fn clean_account_receivable(mut t: RawTable) -> Result<Cleaned, CleanError> {
    debug!(rows = t.num_rows(), "cleaning account receivable");
    standardize_column_names(&mut t);
    require_columns(&t, &["Last_Collection_Date"])?;
    let mut warnings = Vec::new();
    standardize_date_column(&mut t, "Last_Collection_Date", &mut warnings);

    // Heuristic: a row with every column after the first blank is a
    // customer title row. A legitimately sparse data row would be
    // misclassified; TODO: validate against a known-good ledger sample.
    t.retain_rows(|t, r| (1..t.num_columns()).any(|c| !t.cell(r, c).is_empty()));
    t.retain_rows(|t, r| t.cell(r, 0).to_display() != "Total");

    t.drop_column("Unnamed:_0");
    t.drop_column("Unnamed:_1");
    drop_rows_where_equals(&mut t, "Broker", "Total");

    Ok(Cleaned {
        table: t.finalize(),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::CleanError;
    use crate::table::Cell;

    fn grid(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| Cell::from_raw(c)).collect())
                .collect(),
        )
    }

    #[test]
    fn payable_requires_vendor_name() {
        let t = grid(&["Idx", "Company", "Amount"], &[&["0", "A", "5"]]);
        let err = clean_account_payable(t).unwrap_err();
        match err {
            CleanError::MissingColumns { missing, .. } => {
                assert_eq!(missing, vec!["Vendor_Name".to_string()]);
            }
        }
    }

    #[test]
    fn payable_drops_widget_column_and_blank_vendors() {
        let t = grid(
            &["Idx", "Vendor Name", "--Select--Udyam Status", "Amount"],
            &[
                &["0", "Acme Textiles", "x", "100"],
                &["1", "", "x", "40"],
                &["2", "Bharat Mills", "x", "60"],
            ],
        );
        let out = clean_account_payable(t).unwrap();
        let n = &out.table;
        assert_eq!(n.columns(), &["Vendor_Name", "Amount"]);
        assert_eq!(n.num_rows(), 2);
        assert_eq!(n.cell(1, 0), &Cell::Str("Bharat Mills".into()));
    }

    #[test]
    fn receivable_drops_title_and_total_rows() {
        let t = grid(
            &["Customer", "Bill No", "Total Amt", "Broker", "Last Collection Date"],
            &[
                &["SHREE FASHION [KOL]", "", "", "", ""],
                &["SHREE FASHION", "B-101", "500", "BRK-1", "17/07/2024"],
                &["SHREE FASHION", "B-102", "200", "BRK-1", ""],
                &["Total", "", "700", "", ""],
                &["", "", "", "Total", ""],
            ],
        );
        let out = clean_account_receivable(t).unwrap();
        let n = &out.table;
        assert_eq!(n.num_rows(), 2);
        let date = n.column_index("Last_Collection_Date").unwrap();
        assert_eq!(n.cell(0, date), &Cell::Str("2024-07-17".into()));
        assert_eq!(n.cell(1, date), &Cell::Empty);
    }
}
