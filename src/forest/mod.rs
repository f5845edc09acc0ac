//! Random-forest regressor: bagged CART trees, mean-aggregated.
//!
//! Trees are fit in parallel (embarrassingly parallel; outputs are simply
//! averaged, so no ordering guarantee is needed). Each tree's RNG is seeded
//! as `seed + tree_index`, which makes the fit independent of scheduling and
//! bit-reproducible for a fixed seed and input.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{FeatureVector, ForestParams};
use crate::error::AppError;

mod tree;

pub use tree::{RegressionTree, N_FEATURES};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forest {
    params: ForestParams,
    trees: Vec<RegressionTree>,
}

impl Forest {
    /// Fit `params.trees` trees on bootstrap resamples of the rows.
    pub fn fit(
        rows: &[[f64; N_FEATURES]],
        targets: &[f64],
        params: ForestParams,
    ) -> Result<Self, AppError> {
        let n = rows.len();
        if n == 0 {
            return Err(AppError::DataQuality("No rows to fit.".to_string()));
        }
        if targets.len() != n {
            return Err(AppError::DataQuality(format!(
                "Row/target length mismatch: {n} vs {}.",
                targets.len()
            )));
        }
        if params.trees == 0 {
            return Err(AppError::InvalidInput("Tree count must be > 0.".to_string()));
        }
        let finite = rows.iter().flatten().all(|v| v.is_finite())
            && targets.iter().all(|v| v.is_finite());
        if !finite {
            return Err(AppError::DataQuality(
                "Non-finite value in training rows.".to_string(),
            ));
        }

        let trees: Vec<RegressionTree> = (0..params.trees)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(i as u64));
                let indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(rows, targets, &indices, &params)
            })
            .collect();

        Ok(Self { params, trees })
    }

    /// Predict one row: mean of per-tree predictions.
    pub fn predict(&self, features: &FeatureVector) -> f64 {
        let row = features.row();
        let sum: f64 = self.trees.iter().map(|t| t.predict(&row)).sum();
        sum / self.trees.len() as f64
    }

    pub fn params(&self) -> ForestParams {
        self.params
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Season;

    fn training_set() -> (Vec<[f64; 4]>, Vec<f64>) {
        // Price responds to production level and to the summer indicator.
        let mut rows = Vec::new();
        let mut targets = Vec::new();
        for i in 0..24 {
            let production = 100_000.0 + (i as f64) * 1_000.0;
            let season = if i % 4 == 0 { Season::Summer } else { Season::Winter };
            let fv = FeatureVector::new(production, season);
            let price = 60.0 + production / 10_000.0 + if i % 4 == 0 { 8.0 } else { 0.0 };
            rows.push(fv.row());
            targets.push(price);
        }
        (rows, targets)
    }

    #[test]
    fn fit_is_deterministic_for_fixed_seed() {
        let (rows, targets) = training_set();
        let params = ForestParams { trees: 20, ..ForestParams::default() };

        let a = Forest::fit(&rows, &targets, params).unwrap();
        let b = Forest::fit(&rows, &targets, params).unwrap();

        let probe = FeatureVector::new(112_500.0, Season::Summer);
        assert_eq!(a.predict(&probe), b.predict(&probe));
    }

    #[test]
    fn prediction_tracks_the_signal() {
        let (rows, targets) = training_set();
        let forest = Forest::fit(&rows, &targets, ForestParams::default()).unwrap();

        let low = forest.predict(&FeatureVector::new(101_000.0, Season::Winter));
        let high = forest.predict(&FeatureVector::new(122_000.0, Season::Winter));
        assert!(high > low, "expected {high} > {low}");

        let winter = forest.predict(&FeatureVector::new(112_000.0, Season::Winter));
        let summer = forest.predict(&FeatureVector::new(112_000.0, Season::Summer));
        assert!(summer > winter, "expected summer premium, got {summer} vs {winter}");
    }

    #[test]
    fn predictions_stay_within_target_range() {
        // Averaged leaf means can never leave the observed target envelope.
        let (rows, targets) = training_set();
        let forest = Forest::fit(&rows, &targets, ForestParams::default()).unwrap();
        let lo = targets.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = targets.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        let p = forest.predict(&FeatureVector::new(500_000.0, Season::Spring));
        assert!(p >= lo && p <= hi);
    }

    #[test]
    fn fit_rejects_bad_input() {
        let params = ForestParams::default();
        assert!(Forest::fit(&[], &[], params).is_err());
        assert!(Forest::fit(&[[0.0; 4]], &[1.0, 2.0], params).is_err());
        assert!(Forest::fit(&[[f64::NAN; 4]], &[1.0], params).is_err());
        let zero_trees = ForestParams { trees: 0, ..params };
        assert!(Forest::fit(&[[0.0; 4]], &[1.0], zero_trees).is_err());
    }

    #[test]
    fn serde_round_trip_preserves_predictions() {
        let (rows, targets) = training_set();
        let params = ForestParams { trees: 10, ..ForestParams::default() };
        let forest = Forest::fit(&rows, &targets, params).unwrap();

        let json = serde_json::to_string(&forest).unwrap();
        let back: Forest = serde_json::from_str(&json).unwrap();

        let probe = FeatureVector::new(117_000.0, Season::Autumn);
        assert_eq!(forest.predict(&probe), back.predict(&probe));
        assert_eq!(back.n_trees(), 10);
    }
}
