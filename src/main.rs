use anyhow::Result;
use erpscraper::{
    config::Config,
    export::DirectoryProvider,
    load::ParquetWarehouse,
    runner,
};
use std::{fs, path::PathBuf, time::Duration};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) load configuration ───────────────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.yaml"));
    let cfg = if config_path.is_file() {
        Config::load(&config_path)?
    } else {
        info!(path = %config_path.display(), "no config file, using defaults");
        Config::default()
    };
    info!(
        locations = ?cfg.locations,
        dataset = %cfg.dataset,
        "configured"
    );

    for dir in [&cfg.export_root, &cfg.warehouse_root] {
        fs::create_dir_all(dir)?;
    }

    // ─── 3) wire the collaborators ───────────────────────────────────
    let provider = DirectoryProvider::new(
        cfg.export_root.clone(),
        Duration::from_secs(cfg.download_timeout_secs),
    );
    let warehouse = ParquetWarehouse::new(
        cfg.warehouse_root.clone(),
        ParquetWarehouse::DEFAULT_REGION,
    );

    // ─── 4) run every report, capture per-report outcomes ────────────
    let outcomes = runner::run_all(&provider, &warehouse, &cfg);
    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    info!(
        total = outcomes.len(),
        ok = outcomes.len() - failed,
        failed,
        "all done"
    );

    Ok(())
}
