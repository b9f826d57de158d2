use retention_core::profile::CustomerProfile;
use retention_core::risk_model::{rule_based_estimate, RiskLevel, RiskModel};

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

/// Baseline that triggers no increment: long tenure, high revenue, many
/// interactions, same-day login.
fn quiet_profile() -> CustomerProfile {
    profile(24.0, 200.0, 10.0, 0.0, 0.0, 5.0)
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Each documented increment fires alone when only its signal is degraded.
#[test]
fn increments_match_documented_table() {
    let base = quiet_profile();

    let cases: Vec<(CustomerProfile, f64)> = vec![
        (CustomerProfile { tenure_months: 1.0, ..base }, 0.3),
        (CustomerProfile { tenure_months: 3.0, ..base }, 0.1),
        (CustomerProfile { tenure_months: 11.0, ..base }, 0.1),
        (CustomerProfile { monthly_revenue: 49.0, ..base }, 0.2),
        (CustomerProfile { monthly_revenue: 50.0, ..base }, 0.1),
        (CustomerProfile { monthly_revenue: 99.0, ..base }, 0.1),
        (CustomerProfile { total_interactions: 4.0, ..base }, 0.2),
        (CustomerProfile { last_login_days: 31.0, ..base }, 0.3),
        (CustomerProfile { last_login_days: 8.0, ..base }, 0.1),
        (CustomerProfile { last_login_days: 30.0, ..base }, 0.1),
    ];

    for (p, expected) in cases {
        let got = rule_based_estimate(&p);
        assert!(
            (got - expected).abs() < 1e-12,
            "expected {expected} for {p:?}, got {got}"
        );
    }
}

/// Boundary values that must NOT trigger an increment.
#[test]
fn boundaries_do_not_trigger() {
    let base = quiet_profile();

    for p in [
        CustomerProfile { tenure_months: 12.0, ..base },
        CustomerProfile { monthly_revenue: 100.0, ..base },
        CustomerProfile { total_interactions: 5.0, ..base },
        CustomerProfile { last_login_days: 7.0, ..base },
    ] {
        assert_eq!(
            rule_based_estimate(&p),
            0.0,
            "no increment expected for {p:?}"
        );
    }
}

/// Reference degraded profile: tenure 3 (+0.1), revenue 45 (+0.2),
/// 8 interactions (no trigger), login 21 days (+0.1). The rule-based value
/// is exactly the sum of the triggered increments.
#[test]
fn degraded_profile_sums_documented_increments() {
    let p = profile(3.0, 45.0, 8.0, 6.0, 21.0, 1.2);
    let expected = 0.1 + 0.2 + 0.1;

    assert_eq!(rule_based_estimate(&p), expected);
}

/// Healthy customer triggers nothing; probability well below 0.3.
#[test]
fn healthy_customer_scores_low() {
    let p = profile(24.0, 350.0, 85.0, 1.0, 1.0, 4.8);
    let risk = rule_based_estimate(&p);

    assert!(risk < 0.3, "healthy customer risk={risk} must be < 0.3");
    assert_eq!(RiskLevel::from_probability(risk), RiskLevel::Low);
}

/// The worst profile sums to exactly 1.0; the cap keeps the result there.
#[test]
fn result_capped_at_one() {
    let worst = profile(0.0, 0.0, 0.0, 10.0, 60.0, 0.0);
    let risk = rule_based_estimate(&worst);

    assert!((risk - 1.0).abs() < 1e-12, "worst-case risk={risk}");
}

/// Pure function: repeated and interleaved calls give bit-identical results.
#[test]
fn estimator_is_pure() {
    let a = profile(3.0, 45.0, 8.0, 6.0, 21.0, 1.2);
    let b = profile(7.0, 120.0, 2.0, 0.0, 40.0, 3.0);

    let first_a = rule_based_estimate(&a);
    let first_b = rule_based_estimate(&b);

    for _ in 0..100 {
        assert_eq!(rule_based_estimate(&b).to_bits(), first_b.to_bits());
        assert_eq!(rule_based_estimate(&a).to_bits(), first_a.to_bits());
    }
}

/// Probability stays in [0, 1] across a coarse grid of profiles.
#[test]
fn probability_in_unit_interval() {
    let model = RiskModel::rule_based();

    for tenure in [0.0, 2.0, 6.0, 18.0] {
        for revenue in [0.0, 40.0, 75.0, 500.0] {
            for interactions in [0.0, 4.0, 50.0] {
                for last_login in [0.0, 10.0, 45.0] {
                    let p = profile(tenure, revenue, interactions, 1.0, last_login, 2.0);
                    let risk = model.estimate(&p);
                    assert!(
                        (0.0..=1.0).contains(&risk),
                        "risk={risk} out of range for {p:?}"
                    );
                }
            }
        }
    }
}

/// Tier thresholds are strict: High > 0.7, Medium > 0.4.
#[test]
fn risk_level_thresholds() {
    assert_eq!(RiskLevel::from_probability(0.71), RiskLevel::High);
    assert_eq!(RiskLevel::from_probability(0.7), RiskLevel::Medium);
    assert_eq!(RiskLevel::from_probability(0.41), RiskLevel::Medium);
    assert_eq!(RiskLevel::from_probability(0.4), RiskLevel::Low);
    assert_eq!(RiskLevel::from_probability(0.0), RiskLevel::Low);
    assert_eq!(RiskLevel::from_probability(1.0), RiskLevel::High);
}
