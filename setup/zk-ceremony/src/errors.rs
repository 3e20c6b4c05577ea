use std::path::PathBuf;
use thiserror::Error;

/// Error types for the ceremony orchestrator
#[derive(Error, Debug)]
pub enum CeremonyError {
    #[error("Required artifact {} not found. {remedy}", artifact.display())]
    PreconditionMissing { artifact: PathBuf, remedy: String },

    #[error("Step '{step}' failed: {message}")]
    DelegatedProcessFailure { step: String, message: String },

    #[error("Filesystem error at {}: {source}", path.display())]
    FilesystemFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Refusing to run '{step}': {} has not passed verification", artifact.display())]
    UnverifiedPredecessor { step: String, artifact: PathBuf },

    #[error("Step '{step}' reported success but did not produce {}", artifact.display())]
    MissingOutput { step: String, artifact: PathBuf },

    #[error("Invalid circuit name '{0}': must be a non-empty file name without path separators")]
    InvalidCircuitName(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read entropy: {0}")]
    Entropy(#[source] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed calldata: {0}")]
    Calldata(String),
}

/// Coarse classification used when reporting a failure to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Precondition,
    DelegatedProcess,
    Filesystem,
    Usage,
}

impl CeremonyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CeremonyError::PreconditionMissing { .. }
            | CeremonyError::UnverifiedPredecessor { .. } => ErrorKind::Precondition,
            CeremonyError::DelegatedProcessFailure { .. }
            | CeremonyError::MissingOutput { .. }
            | CeremonyError::Calldata(_) => ErrorKind::DelegatedProcess,
            CeremonyError::FilesystemFailure { .. }
            | CeremonyError::Entropy(_)
            | CeremonyError::Json(_) => ErrorKind::Filesystem,
            CeremonyError::InvalidCircuitName(_) | CeremonyError::InvalidConfig(_) => {
                ErrorKind::Usage
            }
        }
    }

    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CeremonyError::FilesystemFailure {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CeremonyError>;
