//! Error types for esq configuration.

use std::{io, path::PathBuf};

use esq_compile::CompileError;
use thiserror::Error;
use toml::de;

/// Errors that can occur when loading configuration or building a registry from it.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("failed to parse config file {path}: {source}")]
    ParseToml {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: de::Error,
    },

    /// A field definition is malformed.
    #[error("invalid field '{field}' in {path}: {message}")]
    InvalidField {
        /// Name of the field.
        field: String,
        /// Config file defining the field.
        path: PathBuf,
        /// What is wrong with it.
        message: String,
    },

    /// A precondition references a field no config defines.
    #[error("field '{field}' has a precondition on undefined field '{target}'")]
    UndefinedField {
        /// Field declaring the precondition.
        field: String,
        /// The undefined field.
        target: String,
    },

    /// Preconditions reference each other in a cycle.
    #[error("precondition cycle: {}", cycle.join(" -> "))]
    PreconditionCycle {
        /// Field names along the cycle, first and last equal.
        cycle: Vec<String>,
    },

    /// A `--param` override is not of the form `key=value`.
    #[error("invalid parameter '{param}': expected key=value")]
    InvalidParameter {
        /// The rejected argument.
        param: String,
    },

    /// The compiler rejected a field while registering it.
    #[error(transparent)]
    Register(#[from] CompileError),

    /// Failed to determine home directory.
    #[error("could not determine home directory")]
    NoHomeDirectory,
}
