// src/clean/normalize.rs
//
// Shared normalization primitives used by every report cleaner: column
// name canonicalization, date normalization and the generic pruning /
// forward-fill steps the exports keep needing.

use chrono::NaiveDate;
use tracing::debug;

use super::ParseWarning;
use crate::table::{Cell, RawTable};

/// Date formats tried in priority order. Day-first formats come strictly
/// before the month-first fallback so `17-07-2024` style exports win the
/// ambiguity.
pub const DATE_FORMATS: &[&str] = &["%d-%m-%Y", "%Y-%m-%d", "%d-%m-%y", "%m-%d-%Y"];

/// Canonical form of one header: spaces, slashes and dashes become
/// underscores, and a single trailing dot is stripped (`Design_No.`).
pub fn standardize_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| match c {
            ' ' | '/' | '-' => '_',
            other => other,
        })
        .collect();
    if out.ends_with('.') {
        out.pop();
    }
    out
}

/// Canonicalize every header in place. Idempotent.
pub fn standardize_column_names(table: &mut RawTable) {
    for h in &mut table.headers {
        *h = standardize_name(h);
    }
}

pub fn lowercase_column_names(table: &mut RawTable) {
    for h in &mut table.headers {
        *h = h.to_lowercase();
    }
}

/// Parse a date string against [`DATE_FORMATS`] after trimming and
/// mapping `/` separators to `-`. Returns `fallback` when every format
/// fails or the value is blank. Never errors.
pub fn robust_parse_date(value: &str, fallback: Option<NaiveDate>) -> Option<NaiveDate> {
    let v = value.trim().replace('/', "-");
    if v.is_empty() {
        return fallback;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(&v, fmt) {
            return Some(d);
        }
    }
    fallback
}

/// Normalize one date column to the canonical `YYYY-MM-DD` string form.
/// Blank cells are left blank; non-blank cells that fail every format
/// degrade to blank and emit an [`ParseWarning::UnparseableDate`]. The
/// value stays a string here; it only becomes a real date when a schema
/// override flags the column as DATE.
pub fn standardize_date_column(table: &mut RawTable, column: &str, warnings: &mut Vec<ParseWarning>) {
    table.map_column(column, |row, cell| match cell {
        Cell::Empty => Cell::Empty,
        Cell::Date(d) => Cell::Str(d.format("%Y-%m-%d").to_string()),
        other => {
            let text = other.to_display();
            if text.trim().is_empty() {
                return Cell::Empty;
            }
            match robust_parse_date(&text, None) {
                Some(d) => Cell::Str(d.format("%Y-%m-%d").to_string()),
                None => {
                    debug!(column, row, value = %text, "date failed every known format");
                    warnings.push(ParseWarning::UnparseableDate {
                        column: column.to_string(),
                        row,
                        value: text,
                    });
                    Cell::Empty
                }
            }
        }
    });
}

/// Hierarchical forward-fill: group-start rows (marker column non-blank)
/// donate the value column's cell as the group key, and the key
/// propagates through the following blank-key rows until the next group
/// start. Returns one key cell per row; rows before the first group
/// start stay blank.
pub fn group_key_column(table: &RawTable, marker_col: usize, value_col: usize) -> Vec<Cell> {
    let mut keys: Vec<Cell> = (0..table.num_rows())
        .map(|r| {
            if table.cell(r, marker_col).is_empty() {
                Cell::Empty
            } else {
                table.cell(r, value_col).clone()
            }
        })
        .collect();

    let mut last = Cell::Empty;
    for key in keys.iter_mut() {
        if key.is_empty() {
            *key = last.clone();
        } else {
            last = key.clone();
        }
    }
    keys
}

/// Drop rows whose cell in `column` equals `value` exactly.
pub fn drop_rows_where_equals(table: &mut RawTable, column: &str, value: &str) {
    if let Some(idx) = table.column_index(column) {
        table.retain_rows(|t, r| t.cell(r, idx).to_display() != value);
    }
}

/// Drop rows whose cell in `column` contains `needle`.
pub fn drop_rows_where_contains(
    table: &mut RawTable,
    column: &str,
    needle: &str,
    case_insensitive: bool,
) {
    if let Some(idx) = table.column_index(column) {
        let needle_lower = needle.to_lowercase();
        table.retain_rows(|t, r| {
            let text = t.cell(r, idx).to_display();
            if case_insensitive {
                !text.to_lowercase().contains(&needle_lower)
            } else {
                !text.contains(needle)
            }
        });
    }
}

/// Drop rows whose cell in `column` is blank.
pub fn drop_rows_where_blank(table: &mut RawTable, column: &str) {
    if let Some(idx) = table.column_index(column) {
        table.retain_rows(|t, r| !t.cell(r, idx).is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RawTable;

    fn grid(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| Cell::from_raw(c)).collect())
                .collect(),
        )
    }

    #[test]
    fn standardize_column_names_is_idempotent() {
        let mut t = grid(&["Order No.", "Cust/Ved Type", "Item - Code", "Plain"], &[]);
        standardize_column_names(&mut t);
        let once = t.headers.clone();
        assert_eq!(once, vec!["Order_No", "Cust_Ved_Type", "Item___Code", "Plain"]);
        standardize_column_names(&mut t);
        assert_eq!(t.headers, once);
    }

    #[test]
    fn date_round_trips_to_canonical_form() {
        let expected = NaiveDate::from_ymd_opt(2024, 7, 17);
        assert_eq!(robust_parse_date("17/07/2024", None), expected);
        assert_eq!(robust_parse_date("2024-07-17", None), expected);
        // Ambiguous month-first input only matches the last-resort rung,
        // after every day-first format has failed.
        assert_eq!(robust_parse_date("07-17-2024", None), expected);
        assert_eq!(robust_parse_date("", None), None);
        assert_eq!(robust_parse_date("not a date", None), None);
        assert_eq!(
            robust_parse_date("garbage", NaiveDate::from_ymd_opt(2020, 1, 1)),
            NaiveDate::from_ymd_opt(2020, 1, 1)
        );
    }

    #[test]
    fn standardize_date_column_degrades_without_error() {
        let mut t = grid(
            &["Date", "Val"],
            &[
                &["17/07/2024", "a"],
                &["", "b"],
                &["31-31-9999", "c"],
                &["2024-07-18", "d"],
            ],
        );
        let mut warnings = Vec::new();
        standardize_date_column(&mut t, "Date", &mut warnings);
        assert_eq!(t.cell(0, 0), &Cell::Str("2024-07-17".into()));
        assert_eq!(t.cell(1, 0), &Cell::Empty);
        assert_eq!(t.cell(2, 0), &Cell::Empty);
        assert_eq!(t.cell(3, 0), &Cell::Str("2024-07-18".into()));
        assert_eq!(warnings.len(), 1);
        match &warnings[0] {
            ParseWarning::UnparseableDate { column, row, value } => {
                assert_eq!(column, "Date");
                assert_eq!(*row, 2);
                assert_eq!(value, "31-31-9999");
            }
            other => panic!("unexpected warning {:?}", other),
        }
    }

    #[test]
    fn forward_fill_keys_every_continuation_row() {
        // 2 groups with 2 and 3 continuation rows.
        let t = grid(
            &["Sr", "Code"],
            &[
                &["1", "A-1"],
                &["", "x"],
                &["", "y"],
                &["2", "B-7"],
                &["", "p"],
                &["", "q"],
                &["", "r"],
            ],
        );
        let keys = group_key_column(&t, 0, 1);
        assert_eq!(keys.iter().filter(|k| k.is_empty()).count(), 0);
        assert_eq!(keys[1], Cell::Str("A-1".into()));
        assert_eq!(keys[2], Cell::Str("A-1".into()));
        assert_eq!(keys[4], Cell::Str("B-7".into()));
        assert_eq!(keys[6], Cell::Str("B-7".into()));
    }

    #[test]
    fn forward_fill_drops_rows_before_first_group() {
        let mut t = grid(&["Sr", "Code"], &[&["", "stray"], &["1", "A"], &["", "b"]]);
        let keys = group_key_column(&t, 0, 1);
        assert_eq!(keys[0], Cell::Empty);
        t.set_column("Key", keys);
        drop_rows_where_blank(&mut t, "Key");
        assert_eq!(t.num_rows(), 2);
    }

    #[test]
    fn sentinel_rows_removed() {
        let mut t = grid(
            &["Date", "Amt"],
            &[&["17-07-2024", "5"], &["Total", "99"], &["18-07-2024", "6"]],
        );
        drop_rows_where_equals(&mut t, "Date", "Total");
        assert_eq!(t.num_rows(), 2);
        assert!((0..t.num_rows()).all(|r| t.cell(r, 0).to_display() != "Total"));
    }

    #[test]
    fn contains_matching_is_case_insensitive_when_asked() {
        let mut t = grid(&["Item"], &[&["Shirt"], &["grand total"], &["GRAND TOTAL x"]]);
        drop_rows_where_contains(&mut t, "Item", "Grand Total", true);
        assert_eq!(t.num_rows(), 1);
    }

    // The §-style end-to-end shape: blank header dropped, group keys
    // propagated, "Total" sentinel removed, names canonicalized.
    #[test]
    fn primitives_compose_over_a_report_shaped_grid() {
        let mut t = grid(
            &["Date", "Item Code", "", "Total"],
            &[
                &["01-04-2024", "KRT-01", "zz", "10"],
                &["", "", "", "4"],
                &["", "", "", "6"],
                &["02-04-2024", "KRT-02", "zz", "12"],
                &["", "", "", "12"],
                &["Total", "", "", "44"],
            ],
        );
        t.drop_blank_header_columns();
        drop_rows_where_equals(&mut t, "Date", "Total");
        let keys = group_key_column(&t, 0, t.column_index("Item Code").unwrap());
        t.set_column("Item Code", keys);
        drop_rows_where_blank(&mut t, "Item Code");
        standardize_column_names(&mut t);
        lowercase_column_names(&mut t);
        let n = t.finalize();

        assert_eq!(n.columns(), &["date", "item_code", "total"]);
        assert_eq!(n.num_rows(), 5);
        let code = n.column_index("item_code").unwrap();
        assert!(n.column_cells(code).all(|c| !c.is_empty()));
        assert_eq!(n.cell(2, code), &Cell::Str("KRT-01".into()));
    }
}
