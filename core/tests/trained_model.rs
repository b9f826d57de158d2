use retention_core::artifact::{ArtifactPaths, ModelArtifact};
use retention_core::profile::CustomerProfile;
use retention_core::risk_model::RiskModel;
use retention_core::training::{train, FeatureScaler, LabeledCustomer, TrainingConfig};
use std::fs;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn profile(
    tenure: f64,
    revenue: f64,
    interactions: f64,
    tickets: f64,
    last_login: f64,
    usage: f64,
) -> CustomerProfile {
    CustomerProfile {
        tenure_months:       tenure,
        monthly_revenue:     revenue,
        total_interactions:  interactions,
        support_tickets:     tickets,
        last_login_days:     last_login,
        feature_usage_score: usage,
    }
}

/// Deterministic synthetic history: even rows are churn-shaped (short
/// tenure, low revenue, stale logins, heavy tickets), odd rows are healthy.
/// Index-derived jitter keeps features non-constant without an RNG.
fn synthetic_customers(n: usize) -> Vec<LabeledCustomer> {
    (0..n)
        .map(|i| {
            let jitter = (i % 10) as f64;
            if i % 2 == 0 {
                LabeledCustomer {
                    profile: profile(
                        1.0 + jitter * 0.3,
                        30.0 + jitter * 2.0,
                        2.0 + jitter * 0.5,
                        5.0 + jitter * 0.2,
                        20.0 + jitter,
                        1.0 + jitter * 0.1,
                    ),
                    churn_risk: 0.8,
                }
            } else {
                LabeledCustomer {
                    profile: profile(
                        20.0 + jitter,
                        300.0 + jitter * 10.0,
                        60.0 + jitter * 3.0,
                        1.0,
                        1.0 + jitter * 0.2,
                        4.0 + jitter * 0.05,
                    ),
                    churn_risk: 0.1,
                }
            }
        })
        .collect()
}

/// Per-test artifact directory under the system temp dir, removed on drop
/// so repeated runs leave nothing behind.
struct TempArtifactDir {
    dir:   std::path::PathBuf,
    paths: ArtifactPaths,
}

impl Drop for TempArtifactDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

fn temp_paths(tag: &str) -> TempArtifactDir {
    let dir = std::env::temp_dir().join(format!("retention-test-{}-{tag}", std::process::id()));
    let paths = ArtifactPaths {
        model:  dir.join("churn_model.json"),
        scaler: dir.join("churn_scaler.json"),
    };
    TempArtifactDir { dir, paths }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// The trained model separates the churn-shaped profile from the healthy
/// one; the reference high-risk profile scores above 0.5.
#[test]
fn trained_model_separates_classes() {
    let data = synthetic_customers(200);
    let (artifact, report) = train(&data, &TrainingConfig::default()).unwrap();
    let model = RiskModel::with_artifact(artifact);

    assert!(model.is_trained());
    assert!(report.accuracy > 0.9, "accuracy={}", report.accuracy);

    let risky = model.estimate(&profile(3.0, 45.0, 8.0, 6.0, 21.0, 1.2));
    assert!(risky > 0.5, "risky profile scored {risky}");

    let healthy = model.estimate(&profile(24.0, 350.0, 85.0, 1.0, 1.0, 4.8));
    assert!(healthy < 0.3, "healthy profile scored {healthy}");
}

/// Trained probabilities stay in [0, 1] across a coarse grid, including
/// profiles far outside the training distribution.
#[test]
fn trained_probability_in_unit_interval() {
    let data = synthetic_customers(100);
    let (artifact, _) = train(&data, &TrainingConfig::default()).unwrap();
    let model = RiskModel::with_artifact(artifact);

    for tenure in [0.0, 5.0, 120.0] {
        for revenue in [0.0, 75.0, 10_000.0] {
            for last_login in [0.0, 15.0, 400.0] {
                let p = profile(tenure, revenue, 10.0, 2.0, last_login, 3.0);
                let risk = model.estimate(&p);
                assert!(
                    (0.0..=1.0).contains(&risk),
                    "risk={risk} out of range for {p:?}"
                );
            }
        }
    }
}

/// Same rows and seed yield an identical classifier and scaler.
#[test]
fn training_is_deterministic() {
    let data = synthetic_customers(120);
    let config = TrainingConfig::default();

    let (a, _) = train(&data, &config).unwrap();
    let (b, _) = train(&data, &config).unwrap();

    assert_eq!(a.scaler, b.scaler, "scaler diverged");
    assert_eq!(
        serde_json::to_string(&a.model).unwrap(),
        serde_json::to_string(&b.model).unwrap(),
        "classifier diverged"
    );
}

/// The held-out split is a stratified 20%: 100 rows per class give
/// 20 + 20 test rows.
#[test]
fn split_is_stratified_eighty_twenty() {
    let data = synthetic_customers(200);
    let (_, report) = train(&data, &TrainingConfig::default()).unwrap();

    assert_eq!(report.test_size, 40);
    for class in &report.classes {
        assert_eq!(class.support, 20, "class {} support", class.label);
    }
}

/// Too little data is a training failure, not a panic.
#[test]
fn empty_or_tiny_data_fails_training() {
    assert!(train(&[], &TrainingConfig::default()).is_err());
    assert!(train(&synthetic_customers(1), &TrainingConfig::default()).is_err());
}

/// Save then load preserves version metadata and predictions.
#[test]
fn artifact_round_trip() {
    let data = synthetic_customers(80);
    let (artifact, _) = train(&data, &TrainingConfig::default()).unwrap();
    let tmp = temp_paths("round-trip");

    artifact.save(&tmp.paths).unwrap();
    let loaded = ModelArtifact::load(&tmp.paths).unwrap();

    assert_eq!(loaded.model_version, artifact.model_version);
    assert_eq!(loaded.training_rows, 80);

    let p = profile(3.0, 45.0, 8.0, 6.0, 21.0, 1.2).feature_vector();
    let before = artifact.model.predict_proba(&artifact.scaler.transform(&p));
    let after = loaded.model.predict_proba(&loaded.scaler.transform(&p));
    assert_eq!(before.to_bits(), after.to_bits());
}

/// A scoring engine wired from the on-disk pair serves trained estimates.
#[test]
fn scoring_engine_loads_artifact_pair() {
    use retention_core::engine::ScoringEngine;
    use retention_core::risk_model::RiskLevel;

    let data = synthetic_customers(200);
    let (artifact, _) = train(&data, &TrainingConfig::default()).unwrap();
    let tmp = temp_paths("engine-load");
    artifact.save(&tmp.paths).unwrap();

    let engine = ScoringEngine::with_artifact(&tmp.paths);
    assert!(engine.is_trained());

    let risk = engine.predict_churn(&profile(3.0, 45.0, 8.0, 6.0, 21.0, 1.2));
    assert!(risk.churn_probability > 0.5, "got {}", risk.churn_probability);
    assert_eq!(risk.risk_level, RiskLevel::High);
}

/// A scaler blob whose model_version disagrees with the classifier's must
/// refuse to load, and the risk model must fall back to rules.
#[test]
fn version_mismatch_triggers_fallback() {
    let data = synthetic_customers(80);
    let (artifact, _) = train(&data, &TrainingConfig::default()).unwrap();
    let tmp = temp_paths("version-mismatch");
    artifact.save(&tmp.paths).unwrap();

    let mut blob: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&tmp.paths.scaler).unwrap()).unwrap();
    blob["model_version"] = serde_json::Value::String("00000000000000".into());
    fs::write(&tmp.paths.scaler, serde_json::to_string(&blob).unwrap()).unwrap();

    assert!(ModelArtifact::load(&tmp.paths).is_err());
    assert!(!RiskModel::from_paths(&tmp.paths).is_trained());
}

/// Missing blobs and corrupt JSON both degrade to rule-based mode.
#[test]
fn missing_or_corrupt_blob_triggers_fallback() {
    let tmp = temp_paths("missing-blob");
    let model = RiskModel::from_paths(&tmp.paths);
    assert!(!model.is_trained());

    // Fallback still answers with the rule-based value.
    let p = profile(3.0, 45.0, 8.0, 6.0, 21.0, 1.2);
    assert_eq!(model.estimate(&p), 0.1 + 0.2 + 0.1);

    let data = synthetic_customers(80);
    let (artifact, _) = train(&data, &TrainingConfig::default()).unwrap();
    artifact.save(&tmp.paths).unwrap();
    fs::write(&tmp.paths.model, "not json").unwrap();
    assert!(!RiskModel::from_paths(&tmp.paths).is_trained());
}

/// Constant features get scale 1.0; varying features are centered.
#[test]
fn scaler_handles_constant_features() {
    let rows = vec![
        [1.0, 10.0, 0.0, 0.0, 0.0, 0.0],
        [3.0, 10.0, 0.0, 0.0, 0.0, 0.0],
        [5.0, 10.0, 0.0, 0.0, 0.0, 0.0],
    ];
    let scaler = FeatureScaler::fit(&rows);

    assert_eq!(scaler.means[0], 3.0);
    assert_eq!(scaler.means[1], 10.0);
    assert_eq!(scaler.scales[1], 1.0);

    let out = scaler.transform(&[3.0, 10.0, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(out[0], 0.0);
    assert_eq!(out[1], 0.0);
}
