//! Error types for statement extraction.

use folio_data::DataError;
use thiserror::Error;

/// Result type for statement extraction.
pub type Result<T> = std::result::Result<T, StatementError>;

/// Errors raised while building or materializing statements.
///
/// Concept-level problems (unresolvable references, missing labels, facts
/// that do not match) never show up here: they degrade to sentinel or absent
/// values inside the rows.
#[derive(Debug, Error)]
pub enum StatementError {
    /// The role has no usable root after arc parsing.
    #[error("Role {role} has no presentation relationships")]
    EmptyRole {
        /// Role URI
        role: String,
    },

    /// No presentation link carries the requested role.
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// A source document could not be read.
    #[error(transparent)]
    Data(#[from] DataError),
}
