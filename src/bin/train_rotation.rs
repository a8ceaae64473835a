//! Train the sector-ETF direction classifier and report holdout metrics.

use chrono::NaiveDate;
use tracing::{error, info, Level};

use sector_rotation::dataset::RotationDataset;
use sector_rotation::errors::{RotationError, RotationResult};
use sector_rotation::features::build_labeled_frame;
use sector_rotation::logging::init_logger;
use sector_rotation::model::{accuracy, classification_report, confusion_matrix, roc_auc};
use sector_rotation::model::{GbmModel, GbmParams};
use sector_rotation::provider::{HistoryRange, MarketDataProvider, YahooClient};
use sector_rotation::settings::SETTINGS;

fn parse_date(field: &str, value: &str) -> RotationResult<NaiveDate> {
    value
        .parse()
        .map_err(|e| RotationError::parse(field, format!("{}", e)))
}

async fn run() -> RotationResult<()> {
    let settings = &SETTINGS.pipeline;
    let range = HistoryRange::Dates {
        start: parse_date("start_date", &settings.start_date)?,
        end: parse_date("end_date", &settings.end_date)?,
    };

    let client = YahooClient::new()?;
    info!(
        "fetching {} and benchmark {} history",
        settings.etf_symbol, settings.benchmark_symbol
    );
    let etf = client.fetch_history(&settings.etf_symbol, range).await?;
    let benchmark = client
        .fetch_history(&settings.benchmark_symbol, range)
        .await?;

    let frame = build_labeled_frame(&etf, &benchmark)?;
    info!("labeled frame: {} rows, {} columns", frame.height(), frame.width());

    let dataset = RotationDataset::from_frame(&frame)?;
    let split = dataset.train_test_split(settings.test_size, settings.seed);
    info!(
        "training on {} rows, holding out {}",
        split.y_train.len(),
        split.y_test.len()
    );

    let model = GbmModel::fit(
        GbmParams::default(),
        &split.x_train,
        &split.y_train,
        &dataset.feature_names,
    )?;

    let probabilities = model.predict_proba(&split.x_test);
    let predictions = model.predict(&split.x_test);

    info!("accuracy: {:.4}", accuracy(&predictions, &split.y_test));
    match roc_auc(&probabilities, &split.y_test) {
        Some(auc) => info!("roc auc: {:.4}", auc),
        None => info!("roc auc: undefined (single-class holdout)"),
    }
    let matrix = confusion_matrix(&predictions, &split.y_test);
    info!("confusion matrix: {:?}", matrix);
    info!(
        "classification report:\n{}",
        classification_report(&predictions, &split.y_test)
    );

    info!("top features by split gain:");
    for (name, gain) in model.feature_importance().into_iter().take(10) {
        info!("  {:<28} {:.4}", name, gain);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    init_logger(Level::INFO);
    info!("sector_rotation trainer v{}", sector_rotation::VERSION);

    if let Err(e) = run().await {
        error!("training failed: {}", e);
        std::process::exit(1);
    }
}
