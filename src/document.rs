//! Data types for normalized documents, chunks, and retrieval results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A normalized corpus document: one labeled prompt/response pair
/// flattened into a single text blob. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// The normalized text, e.g. `"Soru: …\nCevap: …"`.
    pub text: String,
    /// Name of the corpus source this document came from.
    pub source: String,
}

/// A bounded-length segment of a [`Document`], prepared for embedding.
///
/// The embedding vector itself lives in the index entry, not the chunk;
/// chunks are immutable once cut.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier for the chunk (`{document_id}_{chunk_index}`).
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// The ID of the parent [`Document`].
    pub document_id: String,
    /// Key-value metadata inherited from the parent document plus
    /// chunk-specific fields such as `chunk_index`.
    pub metadata: HashMap<String, String>,
}

/// A retrieved [`Chunk`] paired with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity to the query embedding (higher is more similar).
    pub score: f32,
}

/// The ordered top-k chunks returned for one question, most similar first.
/// Ephemeral: retrieval results are never persisted.
pub type RetrievalResult = Vec<ScoredChunk>;
