//! retention-core — customer retention risk and account health engine.
//!
//! Three components, consumed in sequence per customer:
//!   1. RiskModel              — churn probability (trained classifier or rules)
//!   2. HealthScoreCalculator  — weighted 0–100 wellness score
//!   3. RecommendationEngine   — prioritized, deduplicated intervention actions
//!
//! RULES:
//!   - Scoring never fails: any artifact or inference problem degrades to
//!     the rule-based estimator and is logged, never surfaced.
//!   - Scoring performs no I/O. The trained artifact is loaded once at
//!     construction and immutable afterwards; every method takes `&self`.
//!   - Training is an offline step (see `training` and the model-trainer
//!     binary), never in the scoring hot path.

pub mod artifact;
pub mod engine;
pub mod error;
pub mod gbdt;
pub mod health_score;
pub mod profile;
pub mod recommendation;
pub mod risk_model;
pub mod training;
