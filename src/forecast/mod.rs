//! Forward forecasting at held-constant production.
//!
//! The model's only time-varying lever is the season; future production is
//! never forecast, it is an exogenous estimate supplied by the caller (the
//! window mean at training time, the user's figure at serving time).

use crate::domain::{FeatureVector, Month, Prediction, Season};
use crate::forest::Forest;

/// The `n` months after `start`, in chronological order.
pub fn forward_months(start: Month, n: usize) -> Vec<Month> {
    let mut months = Vec::with_capacity(n);
    let mut m = start;
    for _ in 0..n {
        m = m.succ();
        months.push(m);
    }
    months
}

/// One prediction per month, each at the same production figure.
pub fn forecast(forest: &Forest, months: &[Month], production: f64) -> Vec<Prediction> {
    months
        .iter()
        .map(|&month| {
            let season = Season::for_month(month);
            let price = forest.predict(&FeatureVector::new(production, season));
            Prediction {
                month,
                season,
                production,
                price,
            }
        })
        .collect()
}
