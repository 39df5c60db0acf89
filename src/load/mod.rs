// src/load/mod.rs
//
// The "load this cleaned table" collaborator seam. Each run is a full
// snapshot: the destination table's contents are replaced wholesale,
// never appended to.

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{BrotliLevel, Compression};
use parquet::file::properties::WriterProperties;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::schema::ColumnSchema;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("building record batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("writing table: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("writing schema sidecar: {0}")]
    Sidecar(#[from] serde_json::Error),
}

/// Warehouse boundary contract: idempotent dataset creation plus
/// destructive, all-or-nothing table replacement.
pub trait Warehouse {
    fn ensure_dataset(&self, dataset: &str) -> Result<(), LoadError>;
    fn replace_table(
        &self,
        dataset: &str,
        table_name: &str,
        batch: &RecordBatch,
        schema: &ColumnSchema,
    ) -> Result<(), LoadError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct DatasetMarker {
    dataset: String,
    region: String,
}

/// File-backed warehouse: one directory per dataset, one Parquet file
/// per table, with a `<table>_columns.json` sidecar describing the
/// loaded schema.
pub struct ParquetWarehouse {
    root: PathBuf,
    region: String,
}

impl ParquetWarehouse {
    pub const DEFAULT_REGION: &'static str = "asia-south1";

    pub fn new(root: impl Into<PathBuf>, region: impl Into<String>) -> Self {
        ParquetWarehouse {
            root: root.into(),
            region: region.into(),
        }
    }

    fn dataset_dir(&self, dataset: &str) -> PathBuf {
        self.root.join(dataset)
    }
}

impl Warehouse for ParquetWarehouse {
    /// Existence check first, create only on absence. A racing creator
    /// winning the create is success, not an error.
    fn ensure_dataset(&self, dataset: &str) -> Result<(), LoadError> {
        let dir = self.dataset_dir(dataset);
        if dir.is_dir() {
            debug!(dataset, "dataset exists");
        } else {
            info!(dataset, region = %self.region, "creating dataset");
            fs::create_dir_all(&dir)?;
        }

        let marker_path = dir.join(".dataset.json");
        if !marker_path.exists() {
            let marker = DatasetMarker {
                dataset: dataset.to_string(),
                region: self.region.clone(),
            };
            let tmp = dir.join(".dataset.json.tmp");
            let mut f = File::create(&tmp)?;
            serde_json::to_writer_pretty(&mut f, &marker)?;
            f.write_all(b"\n")?;
            fs::rename(&tmp, &marker_path)?;
        }
        Ok(())
    }

    /// Truncate-and-load: write the whole batch to a temporary file and
    /// rename it over the destination, so readers only ever see either
    /// the previous snapshot or the complete new one.
    fn replace_table(
        &self,
        dataset: &str,
        table_name: &str,
        batch: &RecordBatch,
        schema: &ColumnSchema,
    ) -> Result<(), LoadError> {
        let dir = self.dataset_dir(dataset);
        let out_path = dir.join(format!("{}.parquet", table_name));
        let tmp_path = out_path.with_extension("parquet.tmp");

        let props = WriterProperties::builder()
            .set_compression(Compression::BROTLI(BrotliLevel::try_new(5).unwrap()))
            .set_dictionary_enabled(true)
            .build();

        let file = File::create(&tmp_path)?;
        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
        writer.write(batch)?;
        writer.close()?;
        fs::rename(&tmp_path, &out_path)?;

        let sidecar_tmp = dir.join(format!(".{}_columns.json.tmp", table_name));
        let sidecar_path = dir.join(format!("{}_columns.json", table_name));
        let mut f = File::create(&sidecar_tmp)?;
        serde_json::to_writer_pretty(&mut f, &schema.columns)?;
        f.write_all(b"\n")?;
        fs::rename(&sidecar_tmp, &sidecar_path)?;

        info!(
            dataset,
            table = table_name,
            rows = batch.num_rows(),
            "replaced table"
        );
        Ok(())
    }
}
