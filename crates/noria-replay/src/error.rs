use std::path::PathBuf;

use noria_client::{ConfigError, ProtocolError, ReconcileError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReplayError>;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: ProtocolError,
    },

    #[error("line {line}: {source}")]
    Reconcile {
        line: usize,
        #[source]
        source: ReconcileError,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReplayError {
    /// 2 for a hard failure while applying a frame, 1 for everything else.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Reconcile { .. } => 2,
            _ => 1,
        }
    }

    /// Classify a failure from `process_frame` on transcript line `line`.
    #[must_use]
    pub fn from_frame(line: usize, error: ReconcileError) -> Self {
        match error {
            ReconcileError::Decode(source) => Self::Decode { line, source },
            source => Self::Reconcile { line, source },
        }
    }
}
