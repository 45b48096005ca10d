//! Error types
//!
//! One error enum covers model validation, structural links, id lookups
//! and path syntax. Lexical alignment-expression functions never fail.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed id or name, conflicting reference attributes, or a
    /// malformed alignment expression at resolution time.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Duplicate id \"{id}\" in {scope}")]
    DuplicateId { id: String, scope: String },

    /// A required containment or reference link does not exist.
    #[error("Structure error: {0}")]
    Structure(String),

    /// An id or attribute is referenced but not found.
    #[error("Lookup error: {0}")]
    Lookup(String),

    #[error("Invalid path {path:?}: {message}")]
    PathSyntax { path: String, message: String },
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub(crate) fn structure(message: impl Into<String>) -> Self {
        Error::Structure(message.into())
    }

    pub(crate) fn lookup(message: impl Into<String>) -> Self {
        Error::Lookup(message.into())
    }

    pub(crate) fn path_syntax(path: &str, message: impl Into<String>) -> Self {
        Error::PathSyntax {
            path: path.to_string(),
            message: message.into(),
        }
    }
}
