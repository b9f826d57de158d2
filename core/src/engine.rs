//! Scoring facade — one constructed-once service bundling the risk model,
//! the health calculator and the recommender.
//!
//! RULES:
//!   - Built explicitly and passed to call sites; no process-wide singletons.
//!   - Every method takes `&self` and performs no I/O, so a single instance
//!     may be shared read-only across any number of concurrent callers.
//!   - Output types carry the wire contract: probability rounded to three
//!     decimals, health score to two; levels serialize as their labels.

use crate::{
    artifact::ArtifactPaths,
    health_score::{HealthScoreCalculator, HealthStatus},
    profile::CustomerProfile,
    recommendation::{RecommendationAction, RecommendationEngine},
    risk_model::{RiskLevel, RiskModel},
};
use serde::Serialize;

/// Churn probability above which a customer is flagged for intervention.
pub const INTERVENTION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    pub churn_probability: f64,
    pub risk_level:        RiskLevel,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub health_score:  f64,
    pub health_status: HealthStatus,
}

/// Combined per-customer view.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerAssessment {
    pub churn_probability:  f64,
    pub risk_level:         RiskLevel,
    pub health_score:       f64,
    pub health_status:      HealthStatus,
    pub needs_intervention: bool,
    /// Populated only when `needs_intervention` is set.
    pub recommendations:    Vec<RecommendationAction>,
}

pub struct ScoringEngine {
    risk_model:  RiskModel,
    health:      HealthScoreCalculator,
    recommender: RecommendationEngine,
}

impl ScoringEngine {
    pub fn with_risk_model(risk_model: RiskModel) -> Self {
        Self {
            risk_model,
            health: HealthScoreCalculator::new(),
            recommender: RecommendationEngine::new(),
        }
    }

    /// Engine without a trained artifact; churn comes from the rules.
    pub fn rule_based() -> Self {
        Self::with_risk_model(RiskModel::rule_based())
    }

    /// Engine backed by the artifact pair at `paths`; degrades to
    /// rule-based mode (with a log line) when the pair does not load.
    pub fn with_artifact(paths: &ArtifactPaths) -> Self {
        Self::with_risk_model(RiskModel::from_paths(paths))
    }

    pub fn is_trained(&self) -> bool {
        self.risk_model.is_trained()
    }

    pub fn predict_churn(&self, profile: &CustomerProfile) -> RiskAssessment {
        let profile = profile.sanitized();
        let p = self.risk_model.estimate(&profile);
        RiskAssessment {
            churn_probability: round3(p),
            risk_level:        RiskLevel::from_probability(p),
        }
    }

    pub fn health_report(&self, profile: &CustomerProfile) -> HealthReport {
        let profile = profile.sanitized();
        let score = self.health.score(&profile);
        HealthReport {
            health_score:  round2(score),
            health_status: HealthStatus::from_score(score),
        }
    }

    pub fn recommendations(
        &self,
        profile: &CustomerProfile,
        churn_probability: f64,
    ) -> Vec<RecommendationAction> {
        self.recommender.recommend(&profile.sanitized(), churn_probability)
    }

    /// Full per-customer view: risk, health and interventions in one pass.
    /// Recommendations are attached only when the customer is flagged for
    /// intervention; callers wanting them unconditionally use
    /// [`Self::recommendations`].
    pub fn assess(&self, profile: &CustomerProfile) -> CustomerAssessment {
        let profile = profile.sanitized();
        let churn = self.risk_model.estimate(&profile);
        let score = self.health.score(&profile);

        let needs_intervention = churn > INTERVENTION_THRESHOLD;
        let recommendations = if needs_intervention {
            self.recommender.recommend(&profile, churn)
        } else {
            Vec::new()
        };

        CustomerAssessment {
            churn_probability: round3(churn),
            risk_level: RiskLevel::from_probability(churn),
            health_score: round2(score),
            health_status: HealthStatus::from_score(score),
            needs_intervention,
            recommendations,
        }
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
