//! Embedding provider trait for mapping text to fixed-dimension vectors.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that maps text to fixed-dimension embedding vectors.
///
/// The same provider (and therefore the same model identity) must be used
/// at index-build time and query time; retrieval is meaningless if the
/// query embedding space differs from the index's. The index records
/// [`model_id`](EmbeddingProvider::model_id) and
/// [`dimensions`](EmbeddingProvider::dimensions) when persisted and
/// rejects a mismatched provider on load.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// The default implementation calls [`embed`](EmbeddingProvider::embed)
    /// sequentially. Backends with native batch endpoints should override
    /// it; batching is a throughput optimization with no effect on the
    /// resulting index content.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// The dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// A stable identifier for the underlying model, persisted with the
    /// index to detect provider mismatches on load.
    fn model_id(&self) -> &str;
}
