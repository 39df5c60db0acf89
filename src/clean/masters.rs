// src/clean/masters.rs
//
// Cleaners for the master-data exports (broker, customer) and the goods
// return (credit-note) report.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::normalize::{standardize_column_names, standardize_date_column};
use super::{require_columns, CleanError, Cleaned, ParseWarning};
use crate::table::{Cell, RawTable};

/// Contact names the ERP fills in when the operator had nothing: treat
/// them as blank.
static CONTACT_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(NA NA|\. \.|UNKNOWN JI|ACC JI)$").unwrap());

/// Leading/trailing runs of dots and whitespace around a contact name.
static CONTACT_TRIM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\s.]+|[\s.]+$").unwrap());

/// Outstanding balances arrive as `1,234.50 Dr` style strings.
static CREDIT_DEBIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(Cr|Dr)$").unwrap());
static NON_AMOUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\d.]").unwrap());

/// Credit-note references look like `CN/24-25/0123`; the invoice number
/// is everything after the `CN/` prefix.
static CN_REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"CN/([\d-]+/\d+)").unwrap());

const CUSTOMER_SOURCE_COLUMNS: [&str; 10] = [
    "Company Name",
    "Cust/Ved Type",
    "Area",
    "City",
    "State",
    "Outstanding",
    "Broker",
    "Contact Name",
    "Number",
    "Created Date",
];

const CUSTOMER_OUTPUT_COLUMNS: [&str; 11] = [
    "Company_Name",
    "Cust_Ved_Type",
    "Area",
    "City",
    "State",
    "Outstanding",
    "Type",
    "Broker",
    "Contact_Name",
    "Number",
    "Created_Date",
];

/// Broker master. The export occasionally renames its design column, so
/// the legacy `Material_Name` and its successor `Design_Name` coalesce
/// into one `Material_Design` column, first non-empty value winning.
pub fn clean_broker(mut t: RawTable) -> Result<Cleaned, CleanError> {
    debug!(rows = t.num_rows(), "cleaning broker master");
    standardize_column_names(&mut t);

    let material = t.column_index("Material_Name");
    let design = t.column_index("Design_Name");
    if material.is_some() || design.is_some() {
        let merged: Vec<Cell> = (0..t.num_rows())
            .map(|r| {
                let from_material = material.map(|c| t.cell(r, c).clone());
                match from_material.filter(|c| !c.is_empty()) {
                    Some(cell) => cell,
                    None => design
                        .map(|c| t.cell(r, c).clone())
                        .filter(|c| !c.is_empty())
                        .unwrap_or(Cell::Empty),
                }
            })
            .collect();
        t.drop_column("Material_Name");
        t.drop_column("Design_Name");
        t.set_column("Material_Design", merged);
    }

    t.drop_blank_columns();
    t.drop_blank_rows();
    t.stringify();
    Ok(Cleaned::new(t.finalize()))
}

/// Customer master: fixed projection with the outstanding balance split
/// into a numeric amount plus a credit/debit type column.
pub fn clean_customer(mut t: RawTable) -> Result<Cleaned, CleanError> {
    debug!(rows = t.num_rows(), "cleaning customer master");
    require_columns(&t, &CUSTOMER_SOURCE_COLUMNS)?;
    t.select_columns(&CUSTOMER_SOURCE_COLUMNS);
    standardize_column_names(&mut t);

    t.map_column("Contact_Name", |_, cell| {
        let name = cell.to_display();
        let name = CONTACT_PLACEHOLDER.replace(&name, "").to_string();
        let name = CONTACT_TRIM.replace_all(&name, "").to_string();
        Cell::from_raw(&name)
    });

    // The trailing Cr/Dr marker becomes its own column before the amount
    // is stripped down to a number.
    let outstanding_idx = t.column_index("Outstanding").unwrap();
    let types: Vec<Cell> = (0..t.num_rows())
        .map(|r| {
            let text = t.cell(r, outstanding_idx).to_display();
            match CREDIT_DEBIT.captures(text.trim()).map(|c| c[1].to_string()) {
                Some(m) if m == "Cr" => Cell::Str("Credit".into()),
                Some(_) => Cell::Str("Debit".into()),
                None => Cell::Empty,
            }
        })
        .collect();
    t.set_column("Type", types);

    let mut warnings = Vec::new();
    t.map_column("Outstanding", |row, cell| {
        if cell.is_empty() {
            return Cell::Empty;
        }
        let text = cell.to_display();
        let amount = NON_AMOUNT.replace_all(&text, "").to_string();
        match amount.parse::<f64>() {
            Ok(v) => Cell::Float(v),
            Err(_) => {
                warnings.push(ParseWarning::UnparseableNumber {
                    column: "Outstanding".to_string(),
                    row,
                    value: text,
                });
                Cell::Empty
            }
        }
    });

    // Phone numbers are identifiers: keep them as text, minus the `.0`
    // a numeric cell picks up on export.
    t.map_column("Number", |_, cell| {
        if cell.is_empty() {
            return Cell::Empty;
        }
        let text = cell.to_display();
        Cell::Str(text.strip_suffix(".0").unwrap_or(&text).to_string())
    });

    t.select_columns(&CUSTOMER_OUTPUT_COLUMNS);
    Ok(Cleaned {
        table: t.finalize(),
        warnings,
    })
}

/// Goods return (credit note) report.
pub fn clean_goods_return(mut t: RawTable) -> Result<Cleaned, CleanError> {
    debug!(rows = t.num_rows(), "cleaning goods return");
    t.map_cells(|c| match c {
        Cell::Str(s) => Cell::from_raw(&s.to_uppercase()),
        other => other.clone(),
    });
    t.drop_blank_rows();
    require_columns(&t, &["CN Number", "Customer Name", "Qty", "Amount", "Reason", "CN Date"])?;

    let cn_idx = t.column_index("CN Number").unwrap();
    let customer_idx = t.column_index("Customer Name").unwrap();
    t.retain_rows(|t, r| {
        !t.cell(r, cn_idx).to_display().contains("TOTAL")
            && !t.cell(r, customer_idx).to_display().contains("TOTAL")
    });

    let mut warnings = Vec::new();
    for column in ["Qty", "Amount"] {
        t.map_column(column, |row, cell| {
            if cell.is_empty() {
                return Cell::Empty;
            }
            match cell.as_f64() {
                Some(v) => Cell::Float(v),
                None => {
                    warnings.push(ParseWarning::UnparseableNumber {
                        column: column.to_string(),
                        row,
                        value: cell.to_display(),
                    });
                    Cell::Empty
                }
            }
        });
    }

    t.map_column("Customer Name", |_, cell| {
        let text = cell.to_display();
        Cell::from_raw(text.split(',').next().unwrap_or(""))
    });

    let invoices: Vec<Cell> = (0..t.num_rows())
        .map(|r| {
            let reference = t.cell(r, cn_idx).to_display();
            match CN_REFERENCE.captures(&reference) {
                Some(caps) => Cell::Str(caps[1].to_string()),
                None => t.cell(r, cn_idx).clone(),
            }
        })
        .collect();
    t.set_column("Invoice No", invoices);

    for h in &mut t.headers {
        let mut name = h.clone();
        if name.ends_with('.') {
            name.pop();
        }
        *h = name.replace([' ', '.'], "_").to_lowercase();
    }
    standardize_column_names(&mut t);

    t.map_column("reason", |_, cell| {
        if cell.is_empty() {
            Cell::Str("NOT MENTIONED".into())
        } else {
            cell.clone()
        }
    });
    standardize_date_column(&mut t, "cn_date", &mut warnings);

    Ok(Cleaned {
        table: t.finalize(),
        warnings,
    })
}
