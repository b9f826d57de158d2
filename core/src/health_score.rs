//! Composite customer health score — five weighted sub-scores on [0, 100].
//!
//! composite = engagement × 0.30 + usage × 0.25 + satisfaction × 0.20
//!           + financial × 0.15 + support × 0.10
//!
//! All sub-scores are deterministic piecewise formulas; the composite is
//! clamped to [0, 100].

use crate::profile::CustomerProfile;
use serde::{Deserialize, Serialize};

pub const WEIGHT_ENGAGEMENT: f64 = 0.30;
pub const WEIGHT_USAGE: f64 = 0.25;
pub const WEIGHT_SATISFACTION: f64 = 0.20;
pub const WEIGHT_FINANCIAL: f64 = 0.15;
pub const WEIGHT_SUPPORT: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl HealthStatus {
    /// Four-tier classification: ≥90 Excellent, ≥70 Good, ≥50 Fair, else Poor.
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            HealthStatus::Excellent
        } else if score >= 70.0 {
            HealthStatus::Good
        } else if score >= 50.0 {
            HealthStatus::Fair
        } else {
            HealthStatus::Poor
        }
    }
}

#[derive(Default)]
pub struct HealthScoreCalculator;

impl HealthScoreCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Weighted composite in [0, 100].
    pub fn score(&self, profile: &CustomerProfile) -> f64 {
        let composite = self.engagement_score(profile) * WEIGHT_ENGAGEMENT
            + self.usage_score(profile) * WEIGHT_USAGE
            + self.satisfaction_score(profile) * WEIGHT_SATISFACTION
            + self.financial_score(profile) * WEIGHT_FINANCIAL
            + self.support_score(profile) * WEIGHT_SUPPORT;

        composite.clamp(0.0, 100.0)
    }

    /// Interactions (2 points each, capped at 50) plus a login-recency
    /// bucket (≤1d → 50, ≤7d → 40, ≤30d → 20, else 0). Maxes at 100 via
    /// the bucket ceilings, no separate cap.
    pub fn engagement_score(&self, profile: &CustomerProfile) -> f64 {
        let interaction_score = (profile.total_interactions * 2.0).min(50.0);

        let login_score = if profile.last_login_days <= 1.0 {
            50.0
        } else if profile.last_login_days <= 7.0 {
            40.0
        } else if profile.last_login_days <= 30.0 {
            20.0
        } else {
            0.0
        };

        interaction_score + login_score
    }

    /// Feature adoption: 20 points per usage unit, capped at 100.
    pub fn usage_score(&self, profile: &CustomerProfile) -> f64 {
        (profile.feature_usage_score * 20.0).min(100.0)
    }

    /// Support tickets as an inverse satisfaction indicator:
    /// 0 → 100, 1–2 → 80, 3–5 → 60, >5 → 40.
    pub fn satisfaction_score(&self, profile: &CustomerProfile) -> f64 {
        if profile.support_tickets == 0.0 {
            100.0
        } else if profile.support_tickets <= 2.0 {
            80.0
        } else if profile.support_tickets <= 5.0 {
            60.0
        } else {
            40.0
        }
    }

    /// Revenue (max 70 points) plus a tenure bonus (max 30 points).
    pub fn financial_score(&self, profile: &CustomerProfile) -> f64 {
        let revenue_score = (profile.monthly_revenue / 10.0).min(70.0);
        let tenure_bonus = (profile.tenure_months * 2.0).min(30.0);

        revenue_score + tenure_bonus
    }

    /// Support-load bucket: 0 → 100, 1 → 90, 2–3 → 70, 4–5 → 50, >5 → 30.
    pub fn support_score(&self, profile: &CustomerProfile) -> f64 {
        if profile.support_tickets == 0.0 {
            100.0
        } else if profile.support_tickets <= 1.0 {
            90.0
        } else if profile.support_tickets <= 3.0 {
            70.0
        } else if profile.support_tickets <= 5.0 {
            50.0
        } else {
            30.0
        }
    }
}
