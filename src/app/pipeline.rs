//! Shared training-pipeline logic.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch -> clean -> join -> window/train/evaluate -> forward outlook
//!
//! The CLI front-end then focuses on presentation and persistence. The
//! fetch-free variant exists so the pipeline is testable on fixture series.

use crate::data::{EiaClient, IpeaClient};
use crate::domain::{Observation, Prediction, PriceRecord, ProductionRecord, TrainConfig};
use crate::error::AppError;
use crate::features::join_series;
use crate::forecast::{forecast, forward_months};
use crate::report::IngestSummary;
use crate::train::{train_and_evaluate, TrainOutput};

/// All computed outputs of a single training run.
#[derive(Debug, Clone)]
pub struct TrainingRun {
    pub ingest: IngestSummary,
    /// The full joined table (pre-window), kept for CSV export.
    pub observations: Vec<Observation>,
    pub output: TrainOutput,
    /// Forward outlook at mean window production.
    pub outlook: Vec<Prediction>,
}

/// Execute the full training pipeline, fetching from the remote providers.
pub fn run_training(config: &TrainConfig) -> Result<TrainingRun, AppError> {
    let eia = EiaClient::from_env()?;
    let ipea = IpeaClient::new()?;

    let production = eia.fetch_production()?;
    let prices = ipea.fetch_prices()?;

    run_training_with_series(config, &production, &prices)
}

/// Execute the training pipeline on pre-fetched series.
pub fn run_training_with_series(
    config: &TrainConfig,
    production: &[ProductionRecord],
    prices: &[PriceRecord],
) -> Result<TrainingRun, AppError> {
    let observations = join_series(production, prices);
    if observations.is_empty() {
        return Err(AppError::DataQuality(
            "No common months between production and price series.".to_string(),
        ));
    }

    let ingest = IngestSummary {
        production_rows: production.len(),
        price_rows: prices.len(),
        joined_rows: observations.len(),
    };

    let output = train_and_evaluate(&observations, config)?;

    let outlook = forecast(
        &output.forest,
        &forward_months(output.window.end, config.horizon),
        output.mean_production,
    );

    Ok(TrainingRun {
        ingest,
        observations,
        output,
        outlook,
    })
}
