//! Typed customer attribute record consumed by every scoring component.
//!
//! The excluded API layer hands the engine a flat key-value mapping; this
//! record is its validated form. Absent fields deserialize to 0.0 and
//! negative values are clamped to 0 at the boundary, so the scoring
//! formulas never re-check ranges. Non-numeric input fails serde
//! deserialization before it reaches the engine — a caller error, not an
//! engine error.

use serde::{Deserialize, Serialize};

/// Number of model features. The fixed ordering is part of the artifact
/// contract; see [`CustomerProfile::feature_vector`].
pub const FEATURE_DIM: usize = 6;

/// Feature names in model order.
pub const FEATURE_NAMES: [&str; FEATURE_DIM] = [
    "tenure_months",
    "monthly_revenue",
    "total_interactions",
    "support_tickets",
    "last_login_days",
    "feature_usage_score",
];

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomerProfile {
    #[serde(default)]
    pub tenure_months:       f64,
    #[serde(default)]
    pub monthly_revenue:     f64,
    #[serde(default)]
    pub total_interactions:  f64,
    #[serde(default)]
    pub support_tickets:     f64,
    #[serde(default)]
    pub last_login_days:     f64,
    #[serde(default)]
    pub feature_usage_score: f64,
}

impl CustomerProfile {
    /// Clamp negative signals to zero. Every scoring formula assumes
    /// non-negative inputs.
    pub fn sanitized(&self) -> Self {
        Self {
            tenure_months:       self.tenure_months.max(0.0),
            monthly_revenue:     self.monthly_revenue.max(0.0),
            total_interactions:  self.total_interactions.max(0.0),
            support_tickets:     self.support_tickets.max(0.0),
            last_login_days:     self.last_login_days.max(0.0),
            feature_usage_score: self.feature_usage_score.max(0.0),
        }
    }

    /// Fixed-order feature vector for the trained classifier.
    pub fn feature_vector(&self) -> [f64; FEATURE_DIM] {
        [
            self.tenure_months,
            self.monthly_revenue,
            self.total_interactions,
            self.support_tickets,
            self.last_login_days,
            self.feature_usage_score,
        ]
    }
}
