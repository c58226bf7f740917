//! Top-k retrieval over the vector index.

use std::sync::Arc;

use tracing::{debug, error};

use crate::document::RetrievalResult;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::index::VectorIndex;

/// The fixed retrieval policy: three supporting passages per question.
pub const DEFAULT_TOP_K: usize = 3;

/// Turns a user question into a small ordered set of supporting passages.
///
/// Embeds the question with the same provider the index was built with,
/// then delegates to [`VectorIndex::query`]. Stateless per call: two
/// retrievals against an unchanged index return identical results.
pub struct Retriever {
    index: Arc<VectorIndex>,
    provider: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl Retriever {
    /// Create a retriever over `index` with the given query policy.
    pub fn new(index: Arc<VectorIndex>, provider: Arc<dyn EmbeddingProvider>, top_k: usize) -> Self {
        Self { index, provider, top_k }
    }

    /// Retrieve the passages most relevant to `question`.
    pub async fn retrieve(&self, question: &str) -> Result<RetrievalResult> {
        debug!(question_len = question.len(), top_k = self.top_k, "retrieving passages");

        let embedding = self.provider.embed(question).await.map_err(|e| {
            error!(error = %e, "query embedding failed");
            e
        })?;

        self.index.query(&embedding, self.top_k)
    }

    /// The index this retriever queries.
    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }
}
