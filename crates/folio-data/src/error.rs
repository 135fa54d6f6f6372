//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while reading or fetching source documents.
#[derive(Debug, Error)]
pub enum DataError {
    /// A source document is structurally invalid and cannot be used at all.
    ///
    /// Everything depending on the document (roles, labels, facts) is lost,
    /// so callers must surface this separately from row-level degradation.
    #[error("Failed to parse {document}: {reason}")]
    DocumentParse {
        /// Document name or path
        document: String,
        /// What made the document unusable
        reason: String,
    },

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Archive file name is not a plain file name
    #[error("Invalid archive file name: {0:?}")]
    InvalidFileName(String),

    /// CIK is not a number of at most ten digits
    #[error("Invalid CIK: {0}")]
    InvalidCik(String),
}

impl DataError {
    /// Build a [`DataError::DocumentParse`] for `document`.
    pub fn document(document: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::DocumentParse {
            document: document.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error means a source document itself was unusable.
    pub const fn is_document_failure(&self) -> bool {
        matches!(self, Self::DocumentParse { .. })
    }
}
