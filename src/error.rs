//! Error types for notedex.
//!
//! Uses thiserror for ergonomic error handling with proper
//! error chain propagation.
//!
//! Not everything that goes wrong is an error here: inactive criteria and
//! empty queries yield empty result sets by contract, and a single
//! malformed document falls back to derived fields rather than failing
//! the corpus.

use thiserror::Error;

/// Top-level engine error.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Indexing errors.
///
/// Index construction is all in-memory and rarely fails, but a partially
/// built index set would silently drop results, so failures surface as
/// errors instead of being swallowed.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Failed to index document {id}: {reason}")]
    Document { id: String, reason: String },

    #[error("Index set exhausted document id space")]
    IdSpaceExhausted,
}

/// Query-time errors.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Invalid word-boundary pattern for {query:?}: {reason}")]
    InvalidPattern { query: String, reason: String },
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Result type alias for index operations.
pub type IndexResult<T> = std::result::Result<T, IndexError>;

// Error code implementations for machine-readable error responses
impl EngineError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Index(e) => e.code(),
            Self::Query(e) => e.code(),
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }
}

impl IndexError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Document { .. } => "DOCUMENT_INDEX_ERROR",
            Self::IdSpaceExhausted => "ID_SPACE_EXHAUSTED",
        }
    }
}

impl QueryError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPattern { .. } => "INVALID_PATTERN",
        }
    }
}
