// src/config.rs
//
// One explicit configuration record, loaded by the binary and threaded
// through every call. Nothing in the pipeline reads the environment or
// module-level state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::runner::ReportKind;
use crate::schema::ColumnType;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Branch locations to run, e.g. `kolkata`, `surat`.
    pub locations: Vec<String>,
    /// Destination dataset for every report table.
    pub dataset: String,
    /// Root of the per-location export download tree.
    pub export_root: PathBuf,
    /// Root of the warehouse directory.
    pub warehouse_root: PathBuf,
    /// Seconds to wait for an export download to finish.
    pub download_timeout_secs: u64,
    /// Extra per-report column type overrides, merged over the built-in
    /// ones (and winning on collisions).
    pub overrides: HashMap<ReportKind, HashMap<String, ColumnType>>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            locations: vec!["kolkata".to_string(), "surat".to_string()],
            dataset: "erp_reports".to_string(),
            export_root: PathBuf::from("exports"),
            warehouse_root: PathBuf::from("warehouse"),
            download_timeout_secs: 30,
            overrides: HashMap::new(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_yaml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// The effective override map for one report: built-ins first, then
    /// anything the config adds on top.
    pub fn overrides_for(&self, kind: ReportKind) -> HashMap<String, ColumnType> {
        let mut merged = kind.builtin_overrides();
        if let Some(extra) = self.overrides.get(&kind) {
            for (name, ty) in extra {
                merged.insert(name.clone(), *ty);
            }
        }
        merged
    }
}
