//! Error types for the style engine.
//!
//! Only structural problems surface as errors. Authoring mistakes inside a
//! stylesheet body are logged and recorded as diagnostics by the reader
//! instead (see [`crate::css::parser`]).

use std::path::PathBuf;

/// Result type alias for style operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the style engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A selector string could not be decomposed by the grammar.
    #[error("invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    /// An element handle did not refer to a live element.
    #[error("unknown element: {0}")]
    UnknownElement(String),

    /// A stylesheet file could not be read.
    #[error("failed to read stylesheet '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a selector error.
    pub fn invalid_selector(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
