// src/runner/mod.rs
//
// The report registry and the per-report pipeline: fetch → clean →
// infer schema → load → delete the local artifact, with every report's
// outcome captured independently.

use std::collections::HashMap;
use std::fs;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::clean::{self, CleanError, Cleaned};
use crate::config::Config;
use crate::export::{read_export, ExportError, ExportProvider};
use crate::load::{LoadError, Warehouse};
use crate::schema::{self, ColumnType};
use crate::table::RawTable;

/// Every report the pipeline knows how to clean and load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    SalesReport,
    SalesPendingOrder,
    SalesInvoice,
    SalesOrderDetails,
    PurchasePendingOrder,
    PurchaseInvoice,
    Stock,
    StockValuation,
    AccountPayable,
    AccountReceivable,
    Broker,
    Customer,
    GoodsReturn,
}

impl ReportKind {
    pub const ALL: [ReportKind; 13] = [
        ReportKind::SalesReport,
        ReportKind::SalesPendingOrder,
        ReportKind::SalesInvoice,
        ReportKind::SalesOrderDetails,
        ReportKind::PurchasePendingOrder,
        ReportKind::PurchaseInvoice,
        ReportKind::Stock,
        ReportKind::StockValuation,
        ReportKind::AccountPayable,
        ReportKind::AccountReceivable,
        ReportKind::Broker,
        ReportKind::Customer,
        ReportKind::GoodsReturn,
    ];

    /// Destination table name, prefixed with the location at load time.
    pub fn table_name(&self) -> &'static str {
        match self {
            ReportKind::SalesReport => "item_wise_customer",
            ReportKind::SalesPendingOrder => "sales_pending",
            ReportKind::SalesInvoice => "sales_invoice",
            ReportKind::SalesOrderDetails => "sales_order_details",
            ReportKind::PurchasePendingOrder => "purchase_pending",
            ReportKind::PurchaseInvoice => "purchase_invoice",
            ReportKind::Stock => "stock",
            ReportKind::StockValuation => "stock_valuation",
            ReportKind::AccountPayable => "account_payable",
            ReportKind::AccountReceivable => "account_receivable",
            ReportKind::Broker => "broker",
            ReportKind::Customer => "customer",
            ReportKind::GoodsReturn => "goods_return",
        }
    }

    /// Folder the export automation downloads this report into.
    pub fn export_folder(&self) -> &'static str {
        match self {
            ReportKind::SalesReport => "Item_Wise_Sales_Report",
            ReportKind::SalesPendingOrder => "Sales_Pending_Order_Report",
            ReportKind::SalesInvoice => "Sales_Invoice_Report",
            ReportKind::SalesOrderDetails => "Sales_Order_Details_Report",
            ReportKind::PurchasePendingOrder => "Purchase_Pending_Order_Report",
            ReportKind::PurchaseInvoice => "Purchase_Invoice_Report",
            ReportKind::Stock => "Stock_Report",
            ReportKind::StockValuation => "Stock_Valuation_Report",
            ReportKind::AccountPayable => "Account_Payable_Report",
            ReportKind::AccountReceivable => "Account_Receivable_Report",
            ReportKind::Broker => "Broker_Report",
            ReportKind::Customer => "Customer_Report",
            ReportKind::GoodsReturn => "Goods_Return_Report",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ReportKind::SalesReport => "Item Wise Sales",
            ReportKind::SalesPendingOrder => "Sales Pending Order",
            ReportKind::SalesInvoice => "Sales Invoice",
            ReportKind::SalesOrderDetails => "Sales Order Details",
            ReportKind::PurchasePendingOrder => "Purchase Pending Order",
            ReportKind::PurchaseInvoice => "Purchase Invoice",
            ReportKind::Stock => "Stock",
            ReportKind::StockValuation => "Stock Valuation",
            ReportKind::AccountPayable => "Account Payable",
            ReportKind::AccountReceivable => "Account Receivable",
            ReportKind::Broker => "Broker",
            ReportKind::Customer => "Customer",
            ReportKind::GoodsReturn => "Goods Return",
        }
    }

    /// Per-report column type overrides: the date columns whose inferred
    /// type would otherwise depend on whatever the export happened to
    /// contain.
    pub fn builtin_overrides(&self) -> HashMap<String, ColumnType> {
        let date_columns: &[&str] = match self {
            ReportKind::SalesPendingOrder => &["SO_Date"],
            ReportKind::SalesOrderDetails => &["SO_Date", "Expected_Date"],
            ReportKind::AccountReceivable => &["Last_Collection_Date"],
            _ => &[],
        };
        date_columns
            .iter()
            .map(|c| (c.to_string(), ColumnType::Date))
            .collect()
    }

    /// Dispatch to this report's cleaner.
    pub fn clean(&self, raw: RawTable) -> Result<Cleaned, CleanError> {
        match self {
            ReportKind::SalesReport => clean::sales::clean_sales_report(raw),
            ReportKind::SalesPendingOrder => clean::sales::clean_pending_sales_order(raw),
            ReportKind::SalesInvoice => clean::sales::clean_sales_invoice(raw),
            ReportKind::SalesOrderDetails => clean::sales::clean_sales_order_details(raw),
            ReportKind::PurchasePendingOrder => {
                clean::purchase::clean_pending_purchase_order(raw)
            }
            ReportKind::PurchaseInvoice => clean::purchase::clean_purchase_invoice(raw),
            ReportKind::Stock => clean::inventory::clean_stock(raw),
            ReportKind::StockValuation => clean::inventory::clean_stock_valuation(raw),
            ReportKind::AccountPayable => clean::accounts::clean_account_payable(raw),
            ReportKind::AccountReceivable => clean::accounts::clean_account_receivable(raw),
            ReportKind::Broker => clean::masters::clean_broker(raw),
            ReportKind::Customer => clean::masters::clean_customer(raw),
            ReportKind::GoodsReturn => clean::masters::clean_goods_return(raw),
        }
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("export: {0}")]
    Export(#[from] ExportError),
    #[error("clean: {0}")]
    Clean(#[from] CleanError),
    #[error("load: {0}")]
    Load(#[from] LoadError),
}

impl From<arrow::error::ArrowError> for RunError {
    fn from(e: arrow::error::ArrowError) -> Self {
        RunError::Load(LoadError::Arrow(e))
    }
}

/// One report's captured result within a batch run.
#[derive(Debug)]
pub struct RunOutcome {
    pub kind: ReportKind,
    pub location: String,
    pub result: Result<usize, RunError>,
}

/// Run the full pipeline for one report at one location. The local
/// export artifact is deleted only after a successful load; on a load
/// failure it stays on disk for inspection and retry.
pub fn run_report<P, W>(
    provider: &P,
    warehouse: &W,
    cfg: &Config,
    kind: ReportKind,
    location: &str,
) -> Result<usize, RunError>
where
    P: ExportProvider,
    W: Warehouse,
{
    info!(report = kind.display_name(), location, "running report");

    let artifact = provider.fetch(kind.export_folder(), location)?;
    let raw = read_export(&artifact)?;
    let Cleaned { mut table, warnings } = kind.clean(raw)?;
    for warning in &warnings {
        warn!(report = kind.display_name(), location, %warning, "parse degraded");
    }

    let overrides = cfg.overrides_for(kind);
    schema::materialize_date_overrides(&mut table, &overrides);
    let column_schema = schema::infer_schema(&table, &overrides);
    let batch = schema::to_record_batch(&table, &column_schema)?;

    warehouse.ensure_dataset(&cfg.dataset)?;
    let destination = format!("{}_{}", location.to_lowercase(), kind.table_name());
    warehouse.replace_table(&cfg.dataset, &destination, &batch, &column_schema)?;

    if let Err(e) = fs::remove_file(&artifact) {
        warn!(path = %artifact.display(), "failed to delete export artifact: {}", e);
    } else {
        info!(path = %artifact.display(), "deleted export artifact");
    }

    Ok(table.num_rows())
}

/// Run every report for every configured location. Locations run on the
/// rayon pool: the cleaning layer is pure over its input, and each
/// location owns its own download tree, so nothing is shared between
/// them. Reports within one location stay sequential, mirroring the
/// single shared export session the automation has per location.
pub fn run_all<P, W>(provider: &P, warehouse: &W, cfg: &Config) -> Vec<RunOutcome>
where
    P: ExportProvider + Sync,
    W: Warehouse + Sync,
{
    let outcomes: Vec<RunOutcome> = cfg
        .locations
        .par_iter()
        .flat_map_iter(|location| {
            ReportKind::ALL.iter().map(move |&kind| RunOutcome {
                kind,
                location: location.clone(),
                result: run_report(provider, warehouse, cfg, kind, location),
            })
        })
        .collect();

    info!("========== report run results ==========");
    for outcome in &outcomes {
        match &outcome.result {
            Ok(rows) => info!(
                location = %outcome.location,
                report = outcome.kind.display_name(),
                rows,
                "ok"
            ),
            Err(e) => error!(
                location = %outcome.location,
                report = outcome.kind.display_name(),
                "failed: {}",
                e
            ),
        }
    }
    outcomes
}
