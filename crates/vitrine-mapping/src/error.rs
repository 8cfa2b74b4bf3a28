//! Error types for the vitrine-mapping crate.

use thiserror::Error;

/// Errors raised while declaring or resolving index fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// A nested path is not a strict dot-prefix of the field name.
    #[error("invalid nested path '{path}' for field '{field}': field name must start with '{path}.'")]
    InvalidNestedPath {
        /// Field being declared.
        field: String,
        /// The offending nested path.
        path: String,
    },

    /// Two fields share the same name.
    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),

    /// A logical field name has no declaration in the mapping.
    #[error("field '{0}' does not exist in mapping")]
    UnknownField(String),

    /// The identifier field is not part of the declared fields.
    #[error("id field '{0}' is not declared in mapping")]
    MissingIdField(String),
}
