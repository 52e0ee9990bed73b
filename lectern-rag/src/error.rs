//! Error types for the `lectern-rag` crate.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur in retrieval operations.
///
/// Variants are kept distinct end to end so callers can branch on kind:
/// a failed course resolution ([`CourseNotFound`](RagError::CourseNotFound))
/// is not the same outcome as a search that succeeded with zero hits, and
/// neither is an infrastructure failure.
#[derive(Debug, Error)]
pub enum RagError {
    /// A fuzzy course reference could not be resolved to any stored course.
    ///
    /// The display text is user-facing and is returned verbatim by the
    /// search tool layer.
    #[error("No course found matching '{hint}'")]
    CourseNotFound {
        /// The course reference that failed to resolve.
        hint: String,
    },

    /// An error occurred during embedding generation.
    ///
    /// Also raised when a provider returns a vector whose dimensionality
    /// does not match [`dimensions()`](crate::embedding::EmbeddingProvider::dimensions).
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An outbound operation exceeded the configured deadline.
    ///
    /// Raised whole: a timed-out search never yields partial results.
    #[error("Timeout error ({operation}): exceeded {limit:?}")]
    Timeout {
        /// The operation that was cut off.
        operation: String,
        /// The deadline that elapsed.
        limit: Duration,
    },

    /// A write was rejected because it would break referential integrity.
    #[error("Ingest error: {0}")]
    IngestError(String),

    /// An error occurred during text chunking.
    #[error("Chunking error: {0}")]
    ChunkingError(String),

    /// A tool call carried missing or malformed arguments.
    #[error("Tool error: {0}")]
    ToolError(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;

impl RagError {
    /// Returns `true` if this is a user-correctable resolution failure
    /// rather than an infrastructure fault.
    pub fn is_course_not_found(&self) -> bool {
        matches!(self, RagError::CourseNotFound { .. })
    }
}
