//! Error types for reading search conditions.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors that can occur when loading a condition from JSON.
#[derive(Debug, Error)]
pub enum ConditionError {
    /// Failed to read a condition file.
    #[error("failed to read condition file {path}: {source}")]
    ReadFile {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The JSON document does not describe a valid condition.
    #[error("invalid condition: {0}")]
    Json(#[from] serde_json::Error),
}
