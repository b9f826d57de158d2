//! Gradient-boosted shallow trees for binary churn classification.
//!
//! Log-loss objective: the initial raw score is the log-odds of the
//! training base rate; each round fits a regression tree to the residuals
//! (label − predicted probability) with leaf values given by a single
//! Newton step. Splits are exact greedy over midpoints of sorted distinct
//! feature values, minimizing squared residual error.
//!
//! Fitting is deterministic given identical inputs. Inference walks the
//! persisted trees and is pure.

use crate::profile::FEATURE_DIM;
use serde::{Deserialize, Serialize};

const MIN_SAMPLES_SPLIT: usize = 2;
const MIN_GAIN: f64 = 1e-12;
const PROB_FLOOR: f64 = 1e-6;

/// Hyper-parameters for the boosted ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbdtParams {
    pub n_trees:       usize,
    pub max_depth:     usize,
    pub learning_rate: f64,
}

impl Default for GbdtParams {
    fn default() -> Self {
        Self {
            n_trees:       100,
            max_depth:     3,
            learning_rate: 0.1,
        }
    }
}

/// One node of a regression tree, stored flat by index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Split {
        feature:   usize,
        threshold: f64,
        left:      usize,
        right:     usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    pub fn predict(&self, x: &[f64; FEATURE_DIM]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split { feature, threshold, left, right } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbdtModel {
    pub params:     GbdtParams,
    pub base_score: f64,
    pub trees:      Vec<RegressionTree>,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl GbdtModel {
    /// Fit on standardized feature rows and binary labels.
    /// Caller guarantees `rows` is non-empty and the same length as `labels`.
    pub fn fit(rows: &[[f64; FEATURE_DIM]], labels: &[u8], params: GbdtParams) -> Self {
        let n = rows.len();
        let positives = labels.iter().filter(|&&y| y == 1).count() as f64;
        let base_rate = (positives / n as f64).clamp(PROB_FLOOR, 1.0 - PROB_FLOOR);
        let base_score = (base_rate / (1.0 - base_rate)).ln();

        let mut raw = vec![base_score; n];
        let mut trees = Vec::with_capacity(params.n_trees);

        for _ in 0..params.n_trees {
            let prob: Vec<f64> = raw.iter().map(|&z| sigmoid(z)).collect();
            let residual: Vec<f64> = labels
                .iter()
                .zip(&prob)
                .map(|(&y, &p)| f64::from(y) - p)
                .collect();
            let hessian: Vec<f64> = prob.iter().map(|&p| (p * (1.0 - p)).max(1e-12)).collect();

            let mut nodes = Vec::new();
            let indices: Vec<usize> = (0..n).collect();
            build_node(rows, &residual, &hessian, indices, params.max_depth, &mut nodes);
            let tree = RegressionTree { nodes };

            for (z, row) in raw.iter_mut().zip(rows) {
                *z += params.learning_rate * tree.predict(row);
            }
            trees.push(tree);
        }

        Self { params, base_score, trees }
    }

    /// Raw additive score before the logistic link.
    pub fn decision(&self, x: &[f64; FEATURE_DIM]) -> f64 {
        let mut z = self.base_score;
        for tree in &self.trees {
            z += self.params.learning_rate * tree.predict(x);
        }
        z
    }

    /// P(class = churned).
    pub fn predict_proba(&self, x: &[f64; FEATURE_DIM]) -> f64 {
        sigmoid(self.decision(x))
    }
}

/// Grow a subtree over `indices`, appending nodes depth-first.
/// Returns the index of the node created.
fn build_node(
    rows: &[[f64; FEATURE_DIM]],
    residual: &[f64],
    hessian: &[f64],
    indices: Vec<usize>,
    depth: usize,
    nodes: &mut Vec<TreeNode>,
) -> usize {
    if depth == 0 || indices.len() < MIN_SAMPLES_SPLIT {
        return push_leaf(residual, hessian, &indices, nodes);
    }

    let Some((feature, threshold)) = best_split(rows, residual, &indices) else {
        return push_leaf(residual, hessian, &indices, nodes);
    };

    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
        .into_iter()
        .partition(|&i| rows[i][feature] <= threshold);

    if left_indices.is_empty() || right_indices.is_empty() {
        let merged: Vec<usize> = left_indices.into_iter().chain(right_indices).collect();
        return push_leaf(residual, hessian, &merged, nodes);
    }

    // Placeholder so children get stable indices; patched below.
    let node_at = nodes.len();
    nodes.push(TreeNode::Leaf { value: 0.0 });

    let left = build_node(rows, residual, hessian, left_indices, depth - 1, nodes);
    let right = build_node(rows, residual, hessian, right_indices, depth - 1, nodes);
    nodes[node_at] = TreeNode::Split { feature, threshold, left, right };

    node_at
}

/// Newton-step leaf value: Σresidual / Σ p(1−p).
fn push_leaf(
    residual: &[f64],
    hessian: &[f64],
    indices: &[usize],
    nodes: &mut Vec<TreeNode>,
) -> usize {
    let num: f64 = indices.iter().map(|&i| residual[i]).sum();
    let den: f64 = indices.iter().map(|&i| hessian[i]).sum();
    nodes.push(TreeNode::Leaf { value: num / den.max(1e-12) });
    nodes.len() - 1
}

/// Best (feature, threshold) by squared-error reduction of the residuals,
/// or None when no split improves on the parent.
fn best_split(
    rows: &[[f64; FEATURE_DIM]],
    residual: &[f64],
    indices: &[usize],
) -> Option<(usize, f64)> {
    let n = indices.len() as f64;
    let total: f64 = indices.iter().map(|&i| residual[i]).sum();
    let parent_score = total * total / n;

    let mut best: Option<(usize, f64, f64)> = None;

    for feature in 0..FEATURE_DIM {
        let mut ordered: Vec<(f64, f64)> = indices
            .iter()
            .map(|&i| (rows[i][feature], residual[i]))
            .collect();
        ordered.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut left_sum = 0.0;
        for k in 0..ordered.len() - 1 {
            left_sum += ordered[k].1;
            if ordered[k].0 == ordered[k + 1].0 {
                continue;
            }
            let n_left = (k + 1) as f64;
            let n_right = n - n_left;
            let right_sum = total - left_sum;
            let gain =
                left_sum * left_sum / n_left + right_sum * right_sum / n_right - parent_score;
            if gain > best.map_or(MIN_GAIN, |(_, _, g)| g) {
                let threshold = 0.5 * (ordered[k].0 + ordered[k + 1].0);
                best = Some((feature, threshold, gain));
            }
        }
    }

    best.map(|(feature, threshold, _)| (feature, threshold))
}
