//! CART regression tree over the fixed 4-column feature row.
//!
//! Splits minimize the summed squared error of the two children (variance
//! reduction). Growth is to purity, subject to `min_samples_split` /
//! `min_samples_leaf`. Tie-breaking is deterministic: features are scanned in
//! column order and only a strictly better split replaces the current best.

use serde::{Deserialize, Serialize};

use crate::domain::ForestParams;

pub const N_FEATURES: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    root: Node,
}

impl RegressionTree {
    /// Fit a tree on the rows selected by `indices` (a bootstrap sample;
    /// indices may repeat).
    pub fn fit(
        rows: &[[f64; N_FEATURES]],
        targets: &[f64],
        indices: &[usize],
        params: &ForestParams,
    ) -> Self {
        let mut work: Vec<usize> = indices.to_vec();
        let root = grow(rows, targets, &mut work, params);
        Self { root }
    }

    pub fn predict(&self, row: &[f64; N_FEATURES]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }
}

fn grow(
    rows: &[[f64; N_FEATURES]],
    targets: &[f64],
    indices: &mut [usize],
    params: &ForestParams,
) -> Node {
    let n = indices.len();
    let mean = mean_target(targets, indices);

    if n < params.min_samples_split.max(2) || is_pure(targets, indices) {
        return Node::Leaf { value: mean };
    }

    let Some(split) = best_split(rows, targets, indices, params.min_samples_leaf.max(1)) else {
        return Node::Leaf { value: mean };
    };

    // Partition in place around the chosen split.
    let mid = partition(rows, indices, split.feature, split.threshold);
    let (left_idx, right_idx) = indices.split_at_mut(mid);

    Node::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(grow(rows, targets, left_idx, params)),
        right: Box::new(grow(rows, targets, right_idx, params)),
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    sse: f64,
}

/// Exhaustive split search: every feature, every midpoint between distinct
/// consecutive values. Returns `None` when no split satisfies the leaf
/// minimum or reduces error.
fn best_split(
    rows: &[[f64; N_FEATURES]],
    targets: &[f64],
    indices: &[usize],
    min_leaf: usize,
) -> Option<BestSplit> {
    let n = indices.len();
    let parent_sse = sse(targets, indices);
    let mut best: Option<BestSplit> = None;

    for feature in 0..N_FEATURES {
        // Sort the sample by this feature and scan split positions with
        // running sums, so each candidate is O(1) to evaluate.
        let mut order: Vec<usize> = indices.to_vec();
        order.sort_by(|&a, &b| {
            rows[a][feature]
                .partial_cmp(&rows[b][feature])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let total_sum: f64 = order.iter().map(|&i| targets[i]).sum();
        let total_sq: f64 = order.iter().map(|&i| targets[i] * targets[i]).sum();

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;

        for pos in 1..n {
            let prev = order[pos - 1];
            left_sum += targets[prev];
            left_sq += targets[prev] * targets[prev];

            let v_prev = rows[prev][feature];
            let v_next = rows[order[pos]][feature];
            if v_prev == v_next {
                continue;
            }
            if pos < min_leaf || n - pos < min_leaf {
                continue;
            }

            let left_n = pos as f64;
            let right_n = (n - pos) as f64;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;

            let split_sse = (left_sq - left_sum * left_sum / left_n)
                + (right_sq - right_sum * right_sum / right_n);

            let better = match &best {
                None => split_sse < parent_sse - 1e-12,
                Some(b) => split_sse < b.sse,
            };
            if better {
                best = Some(BestSplit {
                    feature,
                    threshold: (v_prev + v_next) / 2.0,
                    sse: split_sse,
                });
            }
        }
    }

    best
}

/// Move indices with `row[feature] <= threshold` to the front; returns the
/// boundary position.
fn partition(
    rows: &[[f64; N_FEATURES]],
    indices: &mut [usize],
    feature: usize,
    threshold: f64,
) -> usize {
    let mut mid = 0;
    for i in 0..indices.len() {
        if rows[indices[i]][feature] <= threshold {
            indices.swap(mid, i);
            mid += 1;
        }
    }
    mid
}

fn mean_target(targets: &[f64], indices: &[usize]) -> f64 {
    let sum: f64 = indices.iter().map(|&i| targets[i]).sum();
    sum / indices.len() as f64
}

fn sse(targets: &[f64], indices: &[usize]) -> f64 {
    let mean = mean_target(targets, indices);
    indices.iter().map(|&i| (targets[i] - mean).powi(2)).sum()
}

fn is_pure(targets: &[f64], indices: &[usize]) -> bool {
    let first = targets[indices[0]];
    indices.iter().all(|&i| targets[i] == first)
}
