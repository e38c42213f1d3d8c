//! Harvest runtime
//!
//! Collects bucketed comments until the per-bucket quota is met, then
//! exports them.
//!
//! Usage:
//!   cargo run --release --bin harvest [-- --backend csv|jsonl|sqlite] [--ids ids.txt]
//!
//! Environment variables: see `HarvestConfig::from_env` (a `.env` file is
//! loaded first). With `HARVEST_IDS_FILE` / `--ids` the listed accounts
//! are scanned one by one; otherwise random account ids are sampled.

use comment_harvest::export::{export_result, output_path};
use comment_harvest::harvest::stats::log_bucket_stats;
use comment_harvest::harvest::{
    AccountScanner, AccountSource, Accumulator, HttpPageFetcher, ListSource, Orchestrator,
    SampledSource,
};
use comment_harvest::HarvestConfig;
use dotenv::dotenv;
use log::{error, info, warn};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    info!("🚀 Comment harvester");

    let mut config = HarvestConfig::from_env()?;
    let args: Vec<String> = std::env::args().collect();
    config.apply_args(&args)?;

    // Resolve the id source first: a bad list must fail before any request
    let mut source: Box<dyn AccountSource> = match &config.ids_file {
        Some(path) => {
            let list = ListSource::from_file(path)?;
            info!("📄 Loaded {} account ids from {}", list.len(), path.display());
            Box::new(list)
        }
        None => Box::new(SampledSource::new(config.id_space, config.batch_size)),
    };

    info!("📊 Configuration:");
    info!("   ├─ API: {}", config.api_base);
    info!("   ├─ Page limit: {}", config.page_limit);
    info!("   ├─ Page delay: {}ms", config.page_delay_ms);
    info!("   ├─ Recency: {} days", config.recency_days);
    info!("   ├─ Quota: {} per bucket", config.target);
    info!("   └─ Export: {:?} to {}", config.backend, config.output_dir.display());

    let fetcher = Arc::new(HttpPageFetcher::new(&config.http_settings())?);
    if let Err(e) = fetcher.warm_up().await {
        warn!("⚠️  Could not acquire session cookies: {}", e);
    }

    let scanner = Arc::new(AccountScanner::new(fetcher, config.scan_settings()));
    let accumulator = Arc::new(Accumulator::new());
    let orchestrator = Orchestrator::new(scanner, accumulator.clone(), config.target, config.workers);

    let summary = orchestrator.run(source.as_mut()).await;
    info!(
        "   └─ {} of {} accounts contributed comments ({} raw comments seen)",
        summary.accounts_with_records, summary.accounts_scanned, summary.records_seen
    );

    let result = accumulator.snapshot();
    log_bucket_stats(&result);

    let path = output_path(&config.output_dir, config.backend, chrono::Local::now());
    match export_result(config.backend, &path, &result).await {
        Ok(rows) => info!("✅ Saved {} comments to {}", rows, path.display()),
        Err(e) => {
            error!("❌ Export failed: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
