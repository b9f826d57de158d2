//! Churn risk estimation — trained classifier with a rule-based fallback.
//!
//! The mode is chosen once at construction and dispatched explicitly:
//!   - Trained:   z-score the feature vector with the persisted scaler,
//!                run the boosted ensemble, clamp to [0, 1].
//!   - RuleBased: deterministic additive increments, capped at 1.0.
//!
//! `estimate` never fails. A missing or corrupt artifact selects rule-based
//! mode at construction; a non-finite trained output falls back to the
//! rule-based score for that call. Both are logged, never surfaced.

use crate::{
    artifact::{ArtifactPaths, ModelArtifact},
    profile::CustomerProfile,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// Three-tier classification: High > 0.7, Medium > 0.4, else Low.
    pub fn from_probability(p: f64) -> Self {
        if p > 0.7 {
            RiskLevel::High
        } else if p > 0.4 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Estimation mode, fixed for the life of the model instance.
pub enum ModelMode {
    Trained(ModelArtifact),
    RuleBased,
}

pub struct RiskModel {
    mode: ModelMode,
}

impl RiskModel {
    pub fn rule_based() -> Self {
        Self { mode: ModelMode::RuleBased }
    }

    pub fn with_artifact(artifact: ModelArtifact) -> Self {
        Self { mode: ModelMode::Trained(artifact) }
    }

    /// Load the artifact pair from disk. Either blob missing, corrupt or
    /// version-mismatched means rule-based mode, never a startup failure.
    pub fn from_paths(paths: &ArtifactPaths) -> Self {
        match ModelArtifact::load(paths) {
            Ok(artifact) => {
                log::info!(
                    "loaded churn model version={} trained_at={} rows={}",
                    artifact.model_version,
                    artifact.trained_at,
                    artifact.training_rows,
                );
                Self::with_artifact(artifact)
            }
            Err(e) => {
                log::warn!("churn model unavailable ({e}); using rule-based estimator");
                Self::rule_based()
            }
        }
    }

    pub fn is_trained(&self) -> bool {
        matches!(self.mode, ModelMode::Trained(_))
    }

    /// Churn probability in [0, 1]. Never fails.
    pub fn estimate(&self, profile: &CustomerProfile) -> f64 {
        match &self.mode {
            ModelMode::Trained(artifact) => {
                let scaled = artifact.scaler.transform(&profile.feature_vector());
                let p = artifact.model.predict_proba(&scaled);
                if p.is_finite() {
                    p.clamp(0.0, 1.0)
                } else {
                    log::warn!("trained estimate non-finite; falling back to rules");
                    rule_based_estimate(profile)
                }
            }
            ModelMode::RuleBased => rule_based_estimate(profile),
        }
    }
}

/// Deterministic additive fallback estimator. Pure: identical input gives
/// an identical result, bit for bit. Increments accumulate in table order
/// and the sum is capped at 1.0.
pub fn rule_based_estimate(profile: &CustomerProfile) -> f64 {
    let mut risk: f64 = 0.0;

    // Low tenure increases risk
    if profile.tenure_months < 3.0 {
        risk += 0.3;
    } else if profile.tenure_months < 12.0 {
        risk += 0.1;
    }

    // Low revenue increases risk
    if profile.monthly_revenue < 50.0 {
        risk += 0.2;
    } else if profile.monthly_revenue < 100.0 {
        risk += 0.1;
    }

    // Few interactions increase risk
    if profile.total_interactions < 5.0 {
        risk += 0.2;
    }

    // Login recency
    if profile.last_login_days > 30.0 {
        risk += 0.3;
    } else if profile.last_login_days > 7.0 {
        risk += 0.1;
    }

    risk.min(1.0)
}
