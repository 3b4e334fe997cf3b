//! Error types for condition compilation.

use thiserror::Error;

/// Errors that abort compilation.
///
/// Compilation is a pure function of the condition and the registered
/// mappings, so every error points at a caller or configuration defect.
/// There is no partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A condition or precondition names a field with no registered mapping.
    #[error("unknown field: {field}")]
    UnknownField {
        /// The unregistered field name.
        field: String,
    },

    /// A constraint has no translation for the backend.
    #[error("unsupported operation on field '{field}': {operation}")]
    UnsupportedOperation {
        /// Field the constraint belongs to.
        field: String,
        /// Description of the constraint.
        operation: String,
    },
}

impl CompileError {
    /// Creates an `UnknownField` error.
    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
        }
    }

    /// Creates an `UnsupportedOperation` error.
    pub fn unsupported(field: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            field: field.into(),
            operation: operation.into(),
        }
    }

    /// Returns a suggestion for resolving the error.
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::UnknownField { .. } => {
                "Register a mapping for the field, e.g. add a [field.<name>] section to .esq.toml"
            }
            Self::UnsupportedOperation { .. } => {
                "Use a query converter for this field to translate the constraint yourself"
            }
        }
    }
}
