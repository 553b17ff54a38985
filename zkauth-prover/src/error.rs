use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during proof generation.
#[derive(Debug, Error)]
pub enum ProverError {
    #[error("proof engine unavailable: {0}")]
    Unavailable(String),

    #[error("circuit artifact not found at {0:?}")]
    MissingArtifact(PathBuf),

    #[error("proof engine rejected the statement: {0}")]
    Rejected(String),

    #[error("proof engine produced unreadable output: {0}")]
    InvalidOutput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
