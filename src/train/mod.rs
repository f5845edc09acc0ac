//! Training and evaluation.
//!
//! Restricts the merged series to the trailing window, splits it
//! chronologically, fits the forest on the head, and scores the held-out
//! tail with R², MAE, and RMSE. Whatever was trained is persisted by the
//! caller unless the optional `--min-r2` gate rejects it first.

use crate::domain::{FeatureVector, Metrics, Observation, TrainConfig, TrainWindow};
use crate::error::AppError;
use crate::features::{chronological_split, mean_production, trailing_window};
use crate::forest::Forest;

/// Minimum usable rows in the trailing window.
const MIN_OBSERVATIONS: usize = 5;

#[derive(Debug, Clone)]
pub struct TrainOutput {
    pub forest: Forest,
    pub metrics: Metrics,
    pub window: TrainWindow,
    /// Mean production over the trailing window; the held-constant input for
    /// forward forecasts.
    pub mean_production: f64,
}

pub fn train_and_evaluate(
    observations: &[Observation],
    config: &TrainConfig,
) -> Result<TrainOutput, AppError> {
    if observations.is_empty() {
        return Err(AppError::DataQuality(
            "Merged series is empty; production and price months do not overlap.".to_string(),
        ));
    }

    let window = trailing_window(observations, config.window_years);
    if window.len() < MIN_OBSERVATIONS {
        return Err(AppError::DataQuality(format!(
            "Only {} observation(s) in the trailing {}-year window; need at least {MIN_OBSERVATIONS}.",
            window.len(),
            config.window_years
        )));
    }

    let (train, test) = chronological_split(&window, config.test_fraction)?;

    let rows: Vec<[f64; 4]> = train
        .iter()
        .map(|o| FeatureVector::new(o.production, o.season).row())
        .collect();
    let targets: Vec<f64> = train.iter().map(|o| o.price).collect();

    let forest = Forest::fit(&rows, &targets, config.params)?;

    let predicted: Vec<f64> = test
        .iter()
        .map(|o| forest.predict(&FeatureVector::new(o.production, o.season)))
        .collect();
    let actual: Vec<f64> = test.iter().map(|o| o.price).collect();
    let metrics = score(&actual, &predicted, train.len());

    if let Some(min_r2) = config.min_r2 {
        if metrics.r2 < min_r2 {
            return Err(AppError::DataQuality(format!(
                "Held-out R² {:.4} below acceptance gate {min_r2:.4}; refusing to persist.",
                metrics.r2
            )));
        }
    }

    // Safe to index: window has at least MIN_OBSERVATIONS rows, ascending.
    let window_range = TrainWindow {
        start: window[0].month,
        end: window[window.len() - 1].month,
    };
    let mean_production = mean_production(&window).unwrap_or(f64::NAN);

    Ok(TrainOutput {
        forest,
        metrics,
        window: window_range,
        mean_production,
    })
}

fn score(actual: &[f64], predicted: &[f64], n_train: usize) -> Metrics {
    let n = actual.len() as f64;
    let mean = actual.iter().sum::<f64>() / n;

    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    // A constant held-out tail carries no variance to explain.
    let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

    let mae = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / n;
    let rmse = (ss_res / n).sqrt();

    Metrics {
        r2,
        mae,
        rmse,
        n_train,
        n_test: actual.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForestParams, Month, Season};
    use std::path::PathBuf;

    fn synthetic_series(n_months: usize) -> Vec<Observation> {
        let mut month: Month = "2021-01".parse().unwrap();
        let mut out = Vec::with_capacity(n_months);
        for i in 0..n_months {
            let production = 100_000.0 + (i as f64) * 500.0 + if i % 3 == 0 { 2_000.0 } else { 0.0 };
            let season = Season::for_month(month);
            let seasonal = match season {
                Season::Summer => 6.0,
                Season::Winter => 3.0,
                _ => 0.0,
            };
            out.push(Observation {
                month,
                production,
                price: 55.0 + production / 20_000.0 + seasonal,
                season,
            });
            month = month.succ();
        }
        out
    }

    fn config() -> TrainConfig {
        TrainConfig {
            window_years: 3,
            test_fraction: 0.2,
            horizon: 12,
            min_r2: None,
            params: ForestParams { trees: 30, ..ForestParams::default() },
            artifact: PathBuf::from("unused.json"),
            export: None,
        }
    }

    #[test]
    fn trains_and_scores_on_synthetic_data() {
        let obs = synthetic_series(48);
        let out = train_and_evaluate(&obs, &config()).unwrap();

        assert!(out.metrics.rmse.is_finite());
        assert!(out.metrics.mae.is_finite());
        assert!(out.metrics.r2.is_finite());
        assert!(out.metrics.n_train > out.metrics.n_test);
        assert!(out.mean_production > 100_000.0);
        assert!(out.window.start < out.window.end);
    }

    #[test]
    fn window_excludes_old_history() {
        let obs = synthetic_series(72);
        let out = train_and_evaluate(&obs, &config()).unwrap();
        let last = obs.last().unwrap().month;
        assert!(out.window.start >= last.minus_years(3));
        assert_eq!(out.window.end, last);
    }

    #[test]
    fn training_twice_is_bit_identical() {
        let obs = synthetic_series(48);
        let a = train_and_evaluate(&obs, &config()).unwrap();
        let b = train_and_evaluate(&obs, &config()).unwrap();
        assert_eq!(a.metrics, b.metrics);
    }

    #[test]
    fn rejects_empty_and_tiny_series() {
        assert_eq!(train_and_evaluate(&[], &config()).unwrap_err().exit_code(), 3);
        let tiny = synthetic_series(3);
        assert_eq!(train_and_evaluate(&tiny, &config()).unwrap_err().exit_code(), 3);
    }

    #[test]
    fn quality_gate_blocks_persisting() {
        let obs = synthetic_series(48);
        let mut cfg = config();
        cfg.min_r2 = Some(1.1); // unattainable
        let err = train_and_evaluate(&obs, &cfg).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn score_handles_constant_tail() {
        let m = score(&[5.0, 5.0], &[5.0, 4.0], 8);
        assert_eq!(m.r2, 0.0);
        assert!((m.mae - 0.5).abs() < 1e-12);
    }
}
