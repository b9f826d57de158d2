//! Persisted model artifact: classifier parameters plus feature
//! normalization, stored as two co-versioned JSON blobs.
//!
//! The pair is loaded together at process start and immutable afterwards.
//! A missing, corrupt or version-mismatched blob means "no trained
//! artifact" — callers degrade to rule-based mode rather than failing
//! startup. Replacement happens out-of-band by re-running the trainer.

use crate::{
    error::{EngineError, EngineResult},
    gbdt::GbdtModel,
    training::FeatureScaler,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Bump when the blob layout changes incompatibly.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// On-disk classifier blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierBlob {
    pub format_version: u32,
    pub model_version:  String,
    pub trained_at:     DateTime<Utc>,
    pub training_rows:  usize,
    pub model:          GbdtModel,
}

/// On-disk normalization blob. `model_version` must match the classifier's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerBlob {
    pub format_version: u32,
    pub model_version:  String,
    pub scaler:         FeatureScaler,
}

/// Locations of the two blobs.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub model:  PathBuf,
    pub scaler: PathBuf,
}

/// In-memory trained artifact. Never mutated after load.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    pub model_version: String,
    pub trained_at:    DateTime<Utc>,
    pub training_rows: usize,
    pub model:         GbdtModel,
    pub scaler:        FeatureScaler,
}

impl ModelArtifact {
    pub fn new(model: GbdtModel, scaler: FeatureScaler, training_rows: usize) -> Self {
        let trained_at = Utc::now();
        Self {
            model_version: trained_at.format("%Y%m%d%H%M%S").to_string(),
            trained_at,
            training_rows,
            model,
            scaler,
        }
    }

    /// Load and cross-check both blobs.
    pub fn load(paths: &ArtifactPaths) -> EngineResult<Self> {
        let classifier: ClassifierBlob = read_blob(&paths.model, "classifier")?;
        let scaler: ScalerBlob = read_blob(&paths.scaler, "scaler")?;

        if classifier.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(EngineError::Artifact {
                reason: format!(
                    "classifier format v{} (expected v{ARTIFACT_FORMAT_VERSION})",
                    classifier.format_version
                ),
            });
        }
        if scaler.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(EngineError::Artifact {
                reason: format!(
                    "scaler format v{} (expected v{ARTIFACT_FORMAT_VERSION})",
                    scaler.format_version
                ),
            });
        }
        if classifier.model_version != scaler.model_version {
            return Err(EngineError::Artifact {
                reason: format!(
                    "version mismatch: classifier={} scaler={}",
                    classifier.model_version, scaler.model_version
                ),
            });
        }

        Ok(Self {
            model_version: classifier.model_version,
            trained_at:    classifier.trained_at,
            training_rows: classifier.training_rows,
            model:         classifier.model,
            scaler:        scaler.scaler,
        })
    }

    /// Write both blobs, creating parent directories as needed.
    pub fn save(&self, paths: &ArtifactPaths) -> EngineResult<()> {
        let classifier = ClassifierBlob {
            format_version: ARTIFACT_FORMAT_VERSION,
            model_version:  self.model_version.clone(),
            trained_at:     self.trained_at,
            training_rows:  self.training_rows,
            model:          self.model.clone(),
        };
        let scaler = ScalerBlob {
            format_version: ARTIFACT_FORMAT_VERSION,
            model_version:  self.model_version.clone(),
            scaler:         self.scaler.clone(),
        };

        write_blob(&paths.model, &serde_json::to_string_pretty(&classifier)?)?;
        write_blob(&paths.scaler, &serde_json::to_string_pretty(&scaler)?)?;

        log::debug!(
            "artifact version {} written ({} + {})",
            self.model_version,
            paths.model.display(),
            paths.scaler.display(),
        );
        Ok(())
    }
}

fn read_blob<T: serde::de::DeserializeOwned>(
    path: &std::path::Path,
    kind: &str,
) -> EngineResult<T> {
    let text = fs::read_to_string(path).map_err(|e| EngineError::Artifact {
        reason: format!("{kind} blob {}: {e}", path.display()),
    })?;
    serde_json::from_str(&text).map_err(|e| EngineError::Artifact {
        reason: format!("{kind} blob {} corrupt: {e}", path.display()),
    })
}

fn write_blob(path: &std::path::Path, text: &str) -> EngineResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, text)?;
    Ok(())
}
