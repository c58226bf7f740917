//! Error types for the `egitbot-rag` crate.

use thiserror::Error;

/// Errors that can occur in the retrieval and answering pipeline.
#[derive(Debug, Error)]
pub enum RagError {
    /// A raw corpus source was entirely unreadable.
    ///
    /// Per-record problems (missing or empty fields) are skipped silently
    /// during normalization and do not produce this error.
    #[error("Corpus error ({source_name}): {message}")]
    Corpus {
        /// The corpus source that could not be read.
        source_name: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred while computing embeddings.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// Embedding computation failed while constructing the vector index.
    /// Fatal to startup: the system cannot serve without a retrieval index.
    #[error("Index build error: {0}")]
    IndexBuild(String),

    /// The persisted index could not be written to durable storage.
    #[error("Index persistence error: {0}")]
    IndexPersist(String),

    /// The persisted index is unreadable or does not match the currently
    /// configured embedding provider (model or dimension mismatch).
    #[error("Index corrupt: {0}")]
    IndexCorrupt(String),

    /// A similarity query was issued against an index holding zero chunks.
    #[error("vector index contains no chunks")]
    EmptyIndex,

    /// The generative model call failed or timed out. Recoverable
    /// per-request: index and session state are unaffected.
    #[error("Generation error: {0}")]
    Generation(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A convenience result type for pipeline operations.
pub type Result<T> = std::result::Result<T, RagError>;
