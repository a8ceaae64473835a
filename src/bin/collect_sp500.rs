//! Collect per-ticker financial snapshots for the S&P 500 and export the
//! dated CSV/workbook pair.

use std::path::Path;

use chrono::NaiveDate;
use tracing::{error, info, Level};

use sector_rotation::collector::{run_collection, write_artifacts};
use sector_rotation::errors::{RotationError, RotationResult};
use sector_rotation::logging::init_logger;
use sector_rotation::provider::{fetch_sp500_symbols, YahooClient};
use sector_rotation::settings::SETTINGS;

async fn run() -> RotationResult<()> {
    let settings = &SETTINGS.collector;
    let expiry: NaiveDate = settings
        .option_expiry
        .parse()
        .map_err(|e| RotationError::parse("option_expiry", format!("{}", e)))?;

    let client = YahooClient::new()?;
    let symbols = fetch_sp500_symbols(client.http()).await;
    if symbols.is_empty() {
        info!("no constituents to collect, exiting");
        return Ok(());
    }
    info!("collecting {} constituents", symbols.len());

    let snapshots = run_collection(&client, &symbols, settings, expiry).await;
    if snapshots.is_empty() {
        info!("no snapshots collected, nothing to write");
        return Ok(());
    }

    let (csv_path, xlsx_path) = write_artifacts(&snapshots, Path::new(&settings.output_dir))?;
    info!(
        "done: {} rows -> {}, {}",
        snapshots.len(),
        csv_path.display(),
        xlsx_path.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    init_logger(Level::INFO);
    info!("sector_rotation collector v{}", sector_rotation::VERSION);

    if let Err(e) = run().await {
        error!("collection failed: {}", e);
        std::process::exit(1);
    }
}
