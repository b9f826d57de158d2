//! model-trainer: offline churn-model training runner.
//!
//! Reads historical labeled customers from a SQLite database, trains the
//! boosted churn classifier, logs a held-out evaluation report and writes
//! the two artifact blobs. The serving process picks the artifact up on
//! its next start; an untrainable dataset leaves no artifact behind and
//! the service keeps its rule-based estimator.
//!
//! Usage:
//!   model-trainer --db data/customers.db \
//!                 --model models/churn_model.json \
//!                 --scaler models/churn_scaler.json \
//!                 --seed 42 --test-fraction 0.2

use anyhow::{Context, Result};
use retention_core::{
    artifact::ArtifactPaths,
    profile::CustomerProfile,
    training::{train, LabeledCustomer, TrainingConfig},
};
use rusqlite::Connection;
use std::env;
use std::path::PathBuf;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let test_fraction = parse_arg(&args, "--test-fraction", 0.2f64);
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or("data/customers.db");
    let model_path = args
        .windows(2)
        .find(|w| w[0] == "--model")
        .map(|w| w[1].as_str())
        .unwrap_or("models/churn_model.json");
    let scaler_path = args
        .windows(2)
        .find(|w| w[0] == "--scaler")
        .map(|w| w[1].as_str())
        .unwrap_or("models/churn_scaler.json");

    let rows = load_customers(db).with_context(|| format!("loading customers from {db}"))?;
    log::info!("loaded {} historical customers from {db}", rows.len());

    let config = TrainingConfig {
        seed,
        test_fraction,
        ..TrainingConfig::default()
    };

    let (artifact, report) = match train(&rows, &config) {
        Ok(result) => result,
        Err(e) => {
            log::error!("training failed: {e}; no artifact written");
            return Ok(());
        }
    };

    log::info!(
        "evaluation: accuracy={:.3} over {} held-out rows",
        report.accuracy,
        report.test_size,
    );

    let paths = ArtifactPaths {
        model:  PathBuf::from(model_path),
        scaler: PathBuf::from(scaler_path),
    };
    artifact.save(&paths)?;
    log::info!(
        "artifact version {} written to {model_path} + {scaler_path}",
        artifact.model_version,
    );

    Ok(())
}

fn load_customers(path: &str) -> Result<Vec<LabeledCustomer>> {
    let conn = Connection::open(path)?;
    let mut stmt = conn.prepare(
        "SELECT tenure_months, monthly_revenue, total_interactions,
                support_tickets, last_login_days, feature_usage_score, churn_risk
         FROM customers",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(LabeledCustomer {
            profile: CustomerProfile {
                tenure_months:       row.get(0)?,
                monthly_revenue:     row.get(1)?,
                total_interactions:  row.get(2)?,
                support_tickets:     row.get(3)?,
                last_login_days:     row.get(4)?,
                feature_usage_score: row.get(5)?,
            },
            churn_risk: row.get(6)?,
        })
    })?;

    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
