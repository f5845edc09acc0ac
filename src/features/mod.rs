//! Merge and feature engineering.
//!
//! This module turns the two cleaned source series into the canonical
//! training table and the derived quantities the trainer needs:
//!
//! - inner join on month key (no interpolation, no forward-fill)
//! - season derivation via the single canonical rule
//! - trailing-window restriction
//! - chronological train/test split (ordering preserved; shuffling would leak
//!   future information into training)
//!
//! No fitting logic here.

use std::collections::HashMap;

use crate::domain::{Month, Observation, PriceRecord, ProductionRecord, Season};
use crate::error::AppError;

/// Inner-join the two series on month key.
///
/// Months present in only one series are silently excluded. Output is sorted
/// ascending by month so downstream windowing and splitting can rely on
/// chronological order.
pub fn join_series(production: &[ProductionRecord], prices: &[PriceRecord]) -> Vec<Observation> {
    let price_by_month: HashMap<Month, f64> =
        prices.iter().map(|p| (p.month, p.price)).collect();

    let mut out: Vec<Observation> = production
        .iter()
        .filter_map(|p| {
            price_by_month.get(&p.month).map(|&price| Observation {
                month: p.month,
                production: p.value,
                price,
                season: Season::for_month(p.month),
            })
        })
        .collect();

    out.sort_by_key(|o| o.month);
    out
}

/// Restrict to the most recent `years` of observations (inclusive boundary),
/// measured from the latest month present.
pub fn trailing_window(observations: &[Observation], years: i32) -> Vec<Observation> {
    let Some(max) = observations.iter().map(|o| o.month).max() else {
        return Vec::new();
    };
    let cutoff = max.minus_years(years);
    observations
        .iter()
        .copied()
        .filter(|o| o.month >= cutoff)
        .collect()
}

/// Split chronologically into train/test slices. The test tail is
/// `ceil(n * test_fraction)` rows; every test month is strictly later than
/// every train month because the input is sorted.
pub fn chronological_split(
    observations: &[Observation],
    test_fraction: f64,
) -> Result<(&[Observation], &[Observation]), AppError> {
    let n = observations.len();
    if n < 2 {
        return Err(AppError::DataQuality(format!(
            "Need at least 2 observations to split, got {n}."
        )));
    }
    if !(0.0..1.0).contains(&test_fraction) {
        return Err(AppError::InvalidInput(format!(
            "Test fraction must be in [0, 1), got {test_fraction}."
        )));
    }

    let n_test = ((n as f64) * test_fraction).ceil() as usize;
    let n_test = n_test.clamp(1, n - 1);
    Ok(observations.split_at(n - n_test))
}

/// Mean production over the given observations (the held-constant forecast
/// input at training time).
pub fn mean_production(observations: &[Observation]) -> Option<f64> {
    if observations.is_empty() {
        return None;
    }
    let sum: f64 = observations.iter().map(|o| o.production).sum();
    Some(sum / observations.len() as f64)
}
