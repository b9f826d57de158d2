//! Intervention recommendation selection.
//!
//! Candidate actions come from five fixed, ordered pools keyed by scenario.
//! Selection:
//!   1. Append pool slices in a fixed order driven by the churn tier and
//!      the raw signals.
//!   2. Deduplicate by first occurrence (ordered sequence + seen check).
//!   3. Truncate to five.
//!   4. Assign priority by position and category by keyword table.

use crate::profile::CustomerProfile;
use serde::{Deserialize, Serialize};

pub const MAX_RECOMMENDATIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Positional priority: slots 0–1 High, 2–3 Medium, 4 Low.
    pub fn from_position(position: usize) -> Self {
        if position < 2 {
            Priority::High
        } else if position < 4 {
            Priority::Medium
        } else {
            Priority::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Personal Outreach")]
    PersonalOutreach,
    #[serde(rename = "Product Education")]
    ProductEducation,
    #[serde(rename = "Support Enhancement")]
    SupportEnhancement,
    Commercial,
    Engagement,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationAction {
    pub action:   String,
    pub priority: Priority,
    pub category: Category,
}

// ── Candidate pools (order within each pool is significant) ─────────────────

const HIGH_CHURN_LOW_ENGAGEMENT: [&str; 4] = [
    "Schedule personal check-in call",
    "Offer product training session",
    "Provide dedicated customer success manager",
    "Send personalized onboarding materials",
];

const HIGH_CHURN_LOW_USAGE: [&str; 4] = [
    "Offer feature demo session",
    "Provide use case examples",
    "Schedule product walkthrough",
    "Send tutorial videos",
];

const HIGH_CHURN_SUPPORT_ISSUES: [&str; 4] = [
    "Priority support queue assignment",
    "Technical expert consultation",
    "Product feedback session",
    "Escalate to development team",
];

const LOW_REVENUE: [&str; 4] = [
    "Discuss upgrade opportunities",
    "Show ROI calculations",
    "Offer limited-time discount",
    "Highlight premium features",
];

const ENGAGEMENT_DROP: [&str; 4] = [
    "Send re-engagement email campaign",
    "Offer new feature preview",
    "Schedule product update call",
    "Provide industry insights",
];

/// Ordered keyword table; the first matching row wins, otherwise
/// [`Category::Engagement`]. Matching is case-insensitive substring.
const CATEGORY_RULES: [(&[&str], Category); 4] = [
    (&["call", "personal"], Category::PersonalOutreach),
    (&["training", "demo"], Category::ProductEducation),
    (&["support", "technical"], Category::SupportEnhancement),
    (&["discount", "upgrade"], Category::Commercial),
];

/// Categorize an action string via the keyword table.
pub fn categorize(action: &str) -> Category {
    let lower = action.to_lowercase();
    for (keywords, category) in CATEGORY_RULES {
        if keywords.iter().any(|k| lower.contains(k)) {
            return category;
        }
    }
    Category::Engagement
}

/// Engagement level used only by the high-churn branch:
/// interactions × 10 plus a recency bonus (≤7d +20, ≤30d +10).
pub fn engagement_level(profile: &CustomerProfile) -> f64 {
    let mut level = profile.total_interactions * 10.0;
    if profile.last_login_days <= 7.0 {
        level += 20.0;
    } else if profile.last_login_days <= 30.0 {
        level += 10.0;
    }
    level
}

#[derive(Default)]
pub struct RecommendationEngine;

impl RecommendationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Ordered list of at most [`MAX_RECOMMENDATIONS`] actions, no
    /// duplicate action text.
    pub fn recommend(
        &self,
        profile: &CustomerProfile,
        churn_probability: f64,
    ) -> Vec<RecommendationAction> {
        let mut candidates: Vec<&'static str> = Vec::new();

        if churn_probability > 0.7 {
            if engagement_level(profile) < 50.0 {
                candidates.extend(&HIGH_CHURN_LOW_ENGAGEMENT[..2]);
            }
            if profile.feature_usage_score < 3.0 {
                candidates.extend(&HIGH_CHURN_LOW_USAGE[..2]);
            }
            if profile.support_tickets > 3.0 {
                candidates.extend(&HIGH_CHURN_SUPPORT_ISSUES[..1]);
            }
        } else if churn_probability > 0.4 && profile.last_login_days > 14.0 {
            candidates.extend(&ENGAGEMENT_DROP[..2]);
        }

        // Low-revenue candidates apply regardless of tier.
        if profile.monthly_revenue < 100.0 {
            candidates.extend(&LOW_REVENUE[..1]);
        }

        // Dedup preserving first occurrence, then cap the list.
        let mut selected: Vec<&'static str> = Vec::new();
        for action in candidates {
            if selected.contains(&action) {
                continue;
            }
            selected.push(action);
            if selected.len() == MAX_RECOMMENDATIONS {
                break;
            }
        }

        selected
            .into_iter()
            .enumerate()
            .map(|(position, action)| RecommendationAction {
                action:   action.to_string(),
                priority: Priority::from_position(position),
                category: categorize(action),
            })
            .collect()
    }
}
