//! Error taxonomy for the deploy pipeline.
//!
//! Config errors surface while the pipeline is being assembled. Io / Hash errors come out of the
//! worker pools and are fatal for the whole run. Silent exclusions (wrong type, unsupported
//! extension, hidden path) are never errors.

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A required option is missing or invalid. Raised at construction, before any item runs.
    #[error("config error: {0}")]
    Config(String),

    /// Stat or read failure for a specific path.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Digest computation failed for a specific path.
    #[error("hash error at {}: {reason}", path.display())]
    Hash { path: PathBuf, reason: String },

    #[error("invalid filename {0}: deployed filenames cannot contain # or ? characters")]
    InvalidPath(String),

    /// A descriptor reached the collector without `hash` or `normalized_path`.
    #[error("descriptor for {} reached the manifest collector without a hash or normalized path", .0.display())]
    Incomplete(PathBuf),

    #[error("{stage} worker panicked")]
    WorkerPanicked { stage: &'static str },

    #[error("pipeline cancelled")]
    Cancelled,
}

impl PipelineError {
    pub fn config(msg: impl Into<String>) -> Self {
        PipelineError::Config(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }

    /// The path that triggered the error, when there is one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            PipelineError::Io { path, .. } | PipelineError::Hash { path, .. } => Some(path),
            PipelineError::Incomplete(path) => Some(path),
            PipelineError::InvalidPath(name) => Some(Path::new(name)),
            _ => None,
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, PipelineError::Config(_))
    }
}
