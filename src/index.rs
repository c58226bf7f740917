//! The vector index: chunk embeddings plus nearest-neighbor queries.
//!
//! The index is built (or loaded from disk) exactly once at process start
//! and is read-only afterwards; queries take `&self` and need no locking,
//! so any number of concurrent readers can share one index.
//!
//! On-disk format: a JSON envelope holding a format version, the
//! embedding model identity and dimensionality, and the insertion-ordered
//! `(chunk, embedding)` entries. The file is written to a temporary
//! sibling and renamed into place, so a half-written index is never
//! readable as valid.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::document::{Chunk, RetrievalResult, ScoredChunk};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// On-disk format version; bumped on any incompatible layout change.
const FORMAT_VERSION: u32 = 1;

/// One indexed chunk with its embedding. Entries keep insertion order,
/// which is also the tie-break order for equal similarity scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    chunk: Chunk,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct PersistedIndexRef<'a> {
    format_version: u32,
    model: &'a str,
    dimensions: usize,
    entries: &'a [IndexEntry],
}

#[derive(Deserialize)]
struct PersistedIndex {
    format_version: u32,
    model: String,
    dimensions: usize,
    entries: Vec<IndexEntry>,
}

/// An immutable in-memory vector index over chunk embeddings.
///
/// Built once from the full chunk set (or loaded from a persisted copy),
/// then queried with cosine similarity for the remainder of the process
/// lifetime.
#[derive(Debug)]
pub struct VectorIndex {
    model: String,
    dimensions: usize,
    entries: Vec<IndexEntry>,
}

/// Cosine similarity between two vectors; 0.0 if either has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

impl VectorIndex {
    /// Build an index by embedding every chunk with the given provider.
    ///
    /// This is the expensive one-time startup cost: a large corpus times
    /// embedding latency. Entries keep the order of `chunks`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexBuild`] if the provider fails or returns
    /// vectors whose dimensionality does not match
    /// [`EmbeddingProvider::dimensions`].
    pub async fn build(chunks: Vec<Chunk>, provider: &dyn EmbeddingProvider) -> Result<Self> {
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = provider
            .embed_batch(&texts)
            .await
            .map_err(|e| RagError::IndexBuild(format!("embedding failed: {e}")))?;

        if embeddings.len() != chunks.len() {
            return Err(RagError::IndexBuild(format!(
                "provider returned {} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let dimensions = provider.dimensions();
        for (chunk, embedding) in chunks.iter().zip(&embeddings) {
            if embedding.len() != dimensions {
                return Err(RagError::IndexBuild(format!(
                    "chunk '{}' embedded with {} dimensions, expected {dimensions}",
                    chunk.id,
                    embedding.len()
                )));
            }
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect::<Vec<_>>();

        info!(
            chunk_count = entries.len(),
            model = provider.model_id(),
            dimensions,
            "vector index built"
        );

        Ok(Self { model: provider.model_id().to_string(), dimensions, entries })
    }

    /// Serialize the index to `path`, atomically.
    ///
    /// Writes the envelope to `<path>.tmp` and renames it into place on
    /// success, so readers never observe a partially written index.
    pub async fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let envelope = PersistedIndexRef {
            format_version: FORMAT_VERSION,
            model: &self.model,
            dimensions: self.dimensions,
            entries: &self.entries,
        };
        let data = serde_json::to_vec(&envelope)
            .map_err(|e| RagError::IndexPersist(format!("serialization failed: {e}")))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    RagError::IndexPersist(format!("failed to create '{}': {e}", parent.display()))
                })?;
            }
        }

        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, &data).await.map_err(|e| {
            RagError::IndexPersist(format!("failed to write '{}': {e}", tmp.display()))
        })?;
        tokio::fs::rename(&tmp, path).await.map_err(|e| {
            RagError::IndexPersist(format!("failed to commit '{}': {e}", path.display()))
        })?;

        info!(path = %path.display(), chunk_count = self.entries.len(), "vector index persisted");
        Ok(())
    }

    /// Load a previously persisted index from `path`, validating it
    /// against the currently configured provider.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexCorrupt`] if the file is unreadable, the
    /// format version is unknown, or the stored model identity or
    /// dimensionality differs from `provider`'s. A mismatched index is
    /// never silently served.
    pub async fn load(path: impl AsRef<Path>, provider: &dyn EmbeddingProvider) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await.map_err(|e| {
            RagError::IndexCorrupt(format!("failed to read '{}': {e}", path.display()))
        })?;

        let persisted: PersistedIndex = serde_json::from_slice(&data).map_err(|e| {
            RagError::IndexCorrupt(format!("failed to parse '{}': {e}", path.display()))
        })?;

        if persisted.format_version != FORMAT_VERSION {
            return Err(RagError::IndexCorrupt(format!(
                "unknown format version {} (expected {FORMAT_VERSION})",
                persisted.format_version
            )));
        }
        if persisted.model != provider.model_id() {
            return Err(RagError::IndexCorrupt(format!(
                "index was built with model '{}' but provider is '{}'",
                persisted.model,
                provider.model_id()
            )));
        }
        if persisted.dimensions != provider.dimensions() {
            return Err(RagError::IndexCorrupt(format!(
                "index has {} dimensions but provider has {}",
                persisted.dimensions,
                provider.dimensions()
            )));
        }
        for entry in &persisted.entries {
            if entry.embedding.len() != persisted.dimensions {
                return Err(RagError::IndexCorrupt(format!(
                    "entry '{}' has {} dimensions, expected {}",
                    entry.chunk.id,
                    entry.embedding.len(),
                    persisted.dimensions
                )));
            }
        }

        info!(
            path = %path.display(),
            chunk_count = persisted.entries.len(),
            model = %persisted.model,
            "vector index loaded"
        );

        Ok(Self {
            model: persisted.model,
            dimensions: persisted.dimensions,
            entries: persisted.entries,
        })
    }

    /// The build-or-load startup policy, applied exactly once per process.
    ///
    /// If a persisted index exists at `path` it is loaded and the (slow)
    /// build is skipped. An unreadable, mismatched, or empty persisted
    /// index is rebuilt from scratch and re-persisted rather than served.
    /// If no persisted index exists, the index is built and immediately
    /// persisted.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyIndex`] if the build path produces zero
    /// entries; nothing is persisted in that case, so a later startup
    /// with a usable corpus builds cleanly.
    pub async fn open_or_build(
        path: impl AsRef<Path>,
        chunks: Vec<Chunk>,
        provider: &dyn EmbeddingProvider,
    ) -> Result<Self> {
        let path = path.as_ref();
        let exists = match tokio::fs::try_exists(path).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not check for persisted index, rebuilding");
                false
            }
        };
        if exists {
            match Self::load(path, provider).await {
                Ok(index) if index.is_empty() => {
                    warn!(path = %path.display(), "persisted index holds zero chunks, rebuilding");
                }
                Ok(index) => return Ok(index),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "persisted index unusable, rebuilding");
                }
            }
        }

        let index = Self::build(chunks, provider).await?;
        if index.is_empty() {
            return Err(RagError::EmptyIndex);
        }
        index.persist(path).await?;
        Ok(index)
    }

    /// Return the `k` chunks most similar to `vector`, most similar first.
    ///
    /// Ties are broken by insertion order (the sort is stable). `k` is
    /// clamped to the index size.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyIndex`] if the index holds zero chunks.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<RetrievalResult> {
        if self.entries.is_empty() {
            return Err(RagError::EmptyIndex);
        }

        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(&entry.embedding, vector),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    /// Number of chunks held by the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds zero chunks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The embedding model identity the index was built with.
    pub fn model_id(&self) -> &str {
        &self.model
    }

    /// The dimensionality of the stored embeddings.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}
