//! Error types for the `ragpipe` crate.

use thiserror::Error;

/// Errors that can occur in RAG operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// A caller-supplied value failed a precondition (empty query, empty content).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStore {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure, including the underlying cause.
        message: String,
    },

    /// An error occurred calling the generation backend.
    #[error("Generation error ({backend}): {message}")]
    Generation {
        /// The generation backend that produced the error.
        backend: String,
        /// A description of the failure, including the underlying cause.
        message: String,
    },

    /// The active vector store variant does not support the requested operation.
    #[error("Unsupported operation ({backend}): {operation} is not supported by this backend")]
    UnsupportedOperation {
        /// The vector store backend that rejected the operation.
        backend: String,
        /// The operation that is not supported.
        operation: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error in the RAG pipeline orchestration.
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
