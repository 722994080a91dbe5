//! Failures of the layers around the spec parser.
//!
//! Parsing itself cannot fail; everything that touches the filesystem or
//! user-supplied patterns reports one of these.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("spec file not found: {}", .0.display())]
    SpecNotFound(PathBuf),

    #[error("failed to read {}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid section pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to serialize manifest")]
    Manifest(#[from] serde_json::Error),
}

impl GenerateError {
    pub(crate) fn write_failed(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::WriteFailed {
            path: path.into(),
            source,
        }
    }
}
