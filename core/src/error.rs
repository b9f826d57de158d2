use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Artifact unavailable: {reason}")]
    Artifact { reason: String },

    #[error("Training failed: {0}")]
    Training(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
