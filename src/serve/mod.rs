//! Serving pipeline: validated predictions against a loaded artifact.
//!
//! `PredictService` is constructed once at process start from the artifact
//! file and never mutated afterwards; the TUI and the `predict` subcommand
//! both borrow it read-only. Per-request errors (out-of-range input) are
//! surfaced as rejected requests, never as a crash.

use std::path::Path;

use crate::domain::{
    Month, Prediction, Season, FeatureVector, SERVE_HORIZON, SERVE_MONTH_MAX, SERVE_MONTH_MIN,
    SERVE_PRODUCTION_MAX, SERVE_PRODUCTION_MIN,
};
use crate::error::AppError;
use crate::forecast::{forecast, forward_months};
use crate::io::{read_artifact, ModelArtifact};

/// A point estimate plus the 5-month forward table at the same production.
#[derive(Debug, Clone)]
pub struct PredictionView {
    pub point: Prediction,
    pub forward: Vec<Prediction>,
}

pub struct PredictService {
    artifact: ModelArtifact,
}

impl PredictService {
    /// Load and validate the artifact; failure here must prevent the service
    /// from accepting requests.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        Ok(Self {
            artifact: read_artifact(path)?,
        })
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        Self { artifact }
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Validate inputs and predict the selected month plus the forward table.
    pub fn forecast_from(&self, month: Month, production: f64) -> Result<PredictionView, AppError> {
        validate_month(month)?;
        validate_production(production)?;

        let season = Season::for_month(month);
        let price = self
            .artifact
            .forest
            .predict(&FeatureVector::new(production, season));
        let point = Prediction {
            month,
            season,
            production,
            price,
        };

        // Forward months are derived from a validated start and may run past
        // the picker bound, as in the reference UI.
        let forward = forecast(
            &self.artifact.forest,
            &forward_months(month, SERVE_HORIZON),
            production,
        );

        Ok(PredictionView { point, forward })
    }
}

fn validate_month(month: Month) -> Result<(), AppError> {
    if !(SERVE_MONTH_MIN..=SERVE_MONTH_MAX).contains(&month) {
        return Err(AppError::InvalidInput(format!(
            "Month {month} outside the serving window {SERVE_MONTH_MIN}..{SERVE_MONTH_MAX}."
        )));
    }
    Ok(())
}

fn validate_production(production: f64) -> Result<(), AppError> {
    if !production.is_finite() {
        return Err(AppError::InvalidInput(
            "Production must be a finite number.".to_string(),
        ));
    }
    if !(SERVE_PRODUCTION_MIN..=SERVE_PRODUCTION_MAX).contains(&production) {
        return Err(AppError::InvalidInput(format!(
            "Production {production} outside {SERVE_PRODUCTION_MIN}..{SERVE_PRODUCTION_MAX} tb/d."
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ForestParams, Metrics, Observation, TrainWindow, FEATURE_COLUMNS, SEASON_RULE,
    };
    use crate::forest::Forest;

    fn service() -> PredictService {
        let mut rows = Vec::new();
        let mut targets = Vec::new();
        let mut month: Month = "2022-01".parse().unwrap();
        for i in 0..36 {
            let production = 100_000.0 + i as f64 * 700.0;
            let season = Season::for_month(month);
            let obs = Observation {
                month,
                production,
                price: 58.0 + production / 12_000.0,
                season,
            };
            rows.push(FeatureVector::new(obs.production, obs.season).row());
            targets.push(obs.price);
            month = month.succ();
        }
        let forest =
            Forest::fit(&rows, &targets, ForestParams { trees: 10, ..ForestParams::default() })
                .unwrap();

        PredictService::from_artifact(ModelArtifact {
            tool: "brentcast".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            feature_columns: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            season_rule: SEASON_RULE.to_string(),
            window: TrainWindow {
                start: "2022-01".parse().unwrap(),
                end: "2024-12".parse().unwrap(),
            },
            mean_production: 112_000.0,
            params: ForestParams::default(),
            metrics: Metrics { r2: 0.9, mae: 1.0, rmse: 1.5, n_train: 29, n_test: 7 },
            forest,
        })
    }

    #[test]
    fn forecast_view_has_point_and_five_forward_rows() {
        let svc = service();
        let view = svc
            .forecast_from("2025-06".parse().unwrap(), 100_000.0)
            .unwrap();

        assert_eq!(view.point.month.to_string(), "2025-06");
        assert!(view.point.price.is_finite());

        let keys: Vec<String> = view.forward.iter().map(|p| p.month.to_string()).collect();
        assert_eq!(keys, ["2025-07", "2025-08", "2025-09", "2025-10", "2025-11"]);
        for row in &view.forward {
            assert_eq!(row.season, Season::for_month(row.month));
            assert_eq!(row.production, 100_000.0);
            assert!(row.price.is_finite());
        }
    }

    #[test]
    fn rejects_month_outside_serving_window() {
        let svc = service();
        for bad in ["2024-12", "2028-01"] {
            let err = svc
                .forecast_from(bad.parse().unwrap(), 120_000.0)
                .unwrap_err();
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn rejects_bad_production() {
        let svc = service();
        let month: Month = "2025-06".parse().unwrap();
        for bad in [f64::NAN, f64::INFINITY, -5_000.0, 99_999.0, 200_001.0] {
            let err = svc.forecast_from(month, bad).unwrap_err();
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        let svc = service();
        assert!(svc.forecast_from(SERVE_MONTH_MIN, SERVE_PRODUCTION_MIN).is_ok());
        assert!(svc.forecast_from(SERVE_MONTH_MAX, SERVE_PRODUCTION_MAX).is_ok());
    }
}
