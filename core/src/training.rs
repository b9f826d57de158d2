//! Offline training for the churn classifier.
//!
//! This module:
//!   1. Labels historical rows (churn_risk > 0.5 ⇒ churned)
//!   2. Splits 80/20, stratified by label, with a seeded shuffle
//!   3. Fits per-feature z-score normalization on the training split only
//!   4. Fits the boosted ensemble
//!   5. Evaluates on the held-out split
//!
//! RULE: nothing here may call a platform RNG. The split shuffle draws from
//! a Pcg64Mcg seeded with the configured seed, so the same rows and seed
//! always yield the same artifact.
//!
//! Training failure never crashes serving; callers log the error and keep
//! the rule-based estimator.

use crate::{
    artifact::ModelArtifact,
    error::{EngineError, EngineResult},
    gbdt::{GbdtModel, GbdtParams},
    profile::{CustomerProfile, FEATURE_DIM},
};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

/// Minimum usable dataset: anything smaller cannot produce both splits.
const MIN_TRAINING_ROWS: usize = 2;

/// One historical observation: attributes plus the recorded churn risk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledCustomer {
    pub profile:    CustomerProfile,
    pub churn_risk: f64,
}

impl LabeledCustomer {
    /// Binary training label.
    pub fn label(&self) -> u8 {
        u8::from(self.churn_risk > 0.5)
    }
}

#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub seed:          u64,
    pub test_fraction: f64,
    pub gbdt:          GbdtParams,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed:          42,
            test_fraction: 0.2,
            gbdt:          GbdtParams::default(),
        }
    }
}

/// Per-feature z-score parameters, fit on the training split only.
/// Constant features get scale 1.0 so they pass through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    pub means:  [f64; FEATURE_DIM],
    pub scales: [f64; FEATURE_DIM],
}

impl FeatureScaler {
    pub fn fit(rows: &[[f64; FEATURE_DIM]]) -> Self {
        let n = rows.len() as f64;
        let mut means = [0.0; FEATURE_DIM];
        let mut scales = [1.0; FEATURE_DIM];

        for f in 0..FEATURE_DIM {
            let mean = rows.iter().map(|r| r[f]).sum::<f64>() / n;
            let var = rows.iter().map(|r| (r[f] - mean).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();
            means[f] = mean;
            scales[f] = if std > 0.0 { std } else { 1.0 };
        }

        Self { means, scales }
    }

    pub fn transform(&self, x: &[f64; FEATURE_DIM]) -> [f64; FEATURE_DIM] {
        let mut out = [0.0; FEATURE_DIM];
        for f in 0..FEATURE_DIM {
            out[f] = (x[f] - self.means[f]) / self.scales[f];
        }
        out
    }
}

/// Held-out metrics for one class.
#[derive(Debug, Clone, Serialize)]
pub struct ClassMetrics {
    pub label:     u8,
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
    pub support:   usize,
}

/// Held-out evaluation summary.
#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    pub accuracy:  f64,
    pub classes:   Vec<ClassMetrics>,
    pub test_size: usize,
}

/// Train on historical labeled customers; returns the artifact and its
/// held-out evaluation.
pub fn train(
    data: &[LabeledCustomer],
    config: &TrainingConfig,
) -> EngineResult<(ModelArtifact, EvalReport)> {
    if data.len() < MIN_TRAINING_ROWS {
        return Err(EngineError::Training(format!(
            "need at least {MIN_TRAINING_ROWS} rows, got {}",
            data.len()
        )));
    }

    let (train_idx, test_idx) = stratified_split(data, config.test_fraction, config.seed);
    if train_idx.is_empty() || test_idx.is_empty() {
        return Err(EngineError::Training(format!(
            "degenerate split: {} train / {} test rows",
            train_idx.len(),
            test_idx.len()
        )));
    }

    let features = |idx: &[usize]| -> Vec<[f64; FEATURE_DIM]> {
        idx.iter()
            .map(|&i| data[i].profile.sanitized().feature_vector())
            .collect()
    };
    let labels = |idx: &[usize]| -> Vec<u8> { idx.iter().map(|&i| data[i].label()).collect() };

    let train_rows = features(&train_idx);
    let train_labels = labels(&train_idx);

    let scaler = FeatureScaler::fit(&train_rows);
    let train_scaled: Vec<[f64; FEATURE_DIM]> =
        train_rows.iter().map(|r| scaler.transform(r)).collect();

    log::info!(
        "training churn model: {} train / {} test rows, seed={}",
        train_idx.len(),
        test_idx.len(),
        config.seed,
    );

    let model = GbdtModel::fit(&train_scaled, &train_labels, config.gbdt.clone());

    let test_scaled: Vec<[f64; FEATURE_DIM]> =
        features(&test_idx).iter().map(|r| scaler.transform(r)).collect();
    let report = evaluate(&model, &test_scaled, &labels(&test_idx));

    log::info!(
        "held-out accuracy {:.3} over {} rows",
        report.accuracy,
        report.test_size,
    );
    for class in &report.classes {
        log::info!(
            "class={} precision={:.3} recall={:.3} f1={:.3} support={}",
            class.label,
            class.precision,
            class.recall,
            class.f1,
            class.support,
        );
    }

    let artifact = ModelArtifact::new(model, scaler, data.len());
    Ok((artifact, report))
}

/// Stratified train/test index split: each class is shuffled independently
/// and contributes `test_fraction` of its rows (rounded, at least one when
/// the class has two or more) to the test set.
fn stratified_split(
    data: &[LabeledCustomer],
    test_fraction: f64,
    seed: u64,
) -> (Vec<usize>, Vec<usize>) {
    let mut rng = Pcg64Mcg::seed_from_u64(seed);
    let mut train_idx = Vec::new();
    let mut test_idx = Vec::new();

    for class in [0u8, 1u8] {
        let mut members: Vec<usize> = (0..data.len())
            .filter(|&i| data[i].label() == class)
            .collect();
        if members.is_empty() {
            continue;
        }

        shuffle(&mut members, &mut rng);

        let mut n_test = (members.len() as f64 * test_fraction).round() as usize;
        if n_test == 0 && members.len() >= 2 {
            n_test = 1;
        }
        n_test = n_test.min(members.len().saturating_sub(1));

        test_idx.extend(&members[..n_test]);
        train_idx.extend(&members[n_test..]);
    }

    (train_idx, test_idx)
}

/// Fisher–Yates over the PCG stream.
fn shuffle(indices: &mut [usize], rng: &mut Pcg64Mcg) {
    for i in (1..indices.len()).rev() {
        let j = (rng.next_u64() % (i as u64 + 1)) as usize;
        indices.swap(i, j);
    }
}

fn evaluate(model: &GbdtModel, rows: &[[f64; FEATURE_DIM]], labels: &[u8]) -> EvalReport {
    let predicted: Vec<u8> = rows
        .iter()
        .map(|r| u8::from(model.predict_proba(r) >= 0.5))
        .collect();

    let correct = predicted
        .iter()
        .zip(labels)
        .filter(|(p, y)| p == y)
        .count();

    let classes = [0u8, 1u8]
        .iter()
        .map(|&class| {
            let tp = predicted
                .iter()
                .zip(labels)
                .filter(|&(&p, &y)| p == class && y == class)
                .count() as f64;
            let fp = predicted
                .iter()
                .zip(labels)
                .filter(|&(&p, &y)| p == class && y != class)
                .count() as f64;
            let fn_ = predicted
                .iter()
                .zip(labels)
                .filter(|&(&p, &y)| p != class && y == class)
                .count() as f64;

            let precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
            let recall = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };

            ClassMetrics {
                label: class,
                precision,
                recall,
                f1,
                support: labels.iter().filter(|&&y| y == class).count(),
            }
        })
        .collect();

    EvalReport {
        accuracy: correct as f64 / labels.len() as f64,
        classes,
        test_size: labels.len(),
    }
}
