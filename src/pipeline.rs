//! The assistant orchestrator: init-once corpus preparation and the
//! per-question `ask` entry point.
//!
//! An [`Assistant`] is the application-context object the UI layer holds:
//! it is constructed (normalize → chunk → build-or-load index) exactly
//! once at process start, then serves any number of concurrent `ask`
//! calls against the read-only index. There is no corpus hot-reload.
//!
//! # Example
//!
//! ```rust,ignore
//! use egitbot_rag::{Assistant, RagConfig, builtin_sources};
//!
//! let assistant = Assistant::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(embedder))
//!     .generator(Arc::new(generator))
//!     .init(&sources)
//!     .await?;
//!
//! let answer = assistant.ask("Türkiye'nin başkenti neresidir?").await?;
//! ```

use std::sync::Arc;

use tracing::{error, info};

use crate::chunking::{CharChunker, Chunker, chunk_all};
use crate::composer::AnswerComposer;
use crate::config::RagConfig;
use crate::corpus::{RawRecord, SourceSpec, normalize};
use crate::document::RetrievalResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::TextGenerator;
use crate::index::VectorIndex;
use crate::retriever::Retriever;

/// The fully initialized question-answering pipeline.
pub struct Assistant {
    config: RagConfig,
    index: Arc<VectorIndex>,
    retriever: Retriever,
    composer: AnswerComposer,
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("config", &self.config)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl Assistant {
    /// Create a new [`AssistantBuilder`].
    pub fn builder() -> AssistantBuilder {
        AssistantBuilder::default()
    }

    /// Answer one question: retrieve supporting passages, compose the
    /// constrained prompt, invoke the generative model.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Generation`] if the model call fails or times
    /// out. Per-request failures never affect the index or any session
    /// state held by the caller.
    pub async fn ask(&self, question: &str) -> Result<String> {
        let passages = self.retriever.retrieve(question).await.map_err(|e| {
            error!(error = %e, "retrieval failed");
            e
        })?;

        let answer = self.composer.answer(question, &passages).await?;

        info!(
            passage_count = passages.len(),
            answer_len = answer.len(),
            "question answered"
        );
        Ok(answer)
    }

    /// Retrieve the supporting passages for `question` without invoking
    /// the generative model, for UIs that display sources.
    pub async fn retrieve(&self, question: &str) -> Result<RetrievalResult> {
        self.retriever.retrieve(question).await
    }

    /// The pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// The read-only vector index backing this assistant.
    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }
}

/// Builder for constructing an [`Assistant`].
///
/// `embedding_provider` and `generator` are required; `config` defaults
/// to [`RagConfig::default`] and `chunker` to a [`CharChunker`] over the
/// configured size and overlap.
#[derive(Default)]
pub struct AssistantBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    generator: Option<Arc<dyn TextGenerator>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl AssistantBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider used at both build time and query time.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the generative model provider.
    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Override the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Initialize the pipeline: normalize the sources, chunk the
    /// documents, and build or load the vector index. Blocking startup
    /// cost; call once per process.
    ///
    /// # Errors
    ///
    /// - [`RagError::Config`] if a required component is missing.
    /// - [`RagError::IndexBuild`] if embedding fails during construction.
    /// - [`RagError::EmptyIndex`] if the corpus yields zero chunks.
    pub async fn init(self, sources: &[(SourceSpec, Vec<RawRecord>)]) -> Result<Assistant> {
        let config = self.config.unwrap_or_default();
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let generator = self
            .generator
            .ok_or_else(|| RagError::Config("generator is required".to_string()))?;
        let chunker = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(CharChunker::new(config.chunk_size, config.chunk_overlap)?),
        };

        let documents = normalize(sources);
        let chunks = chunk_all(chunker.as_ref(), &documents);
        info!(
            document_count = documents.len(),
            chunk_count = chunks.len(),
            "corpus prepared"
        );

        let index = Arc::new(
            VectorIndex::open_or_build(&config.index_path, chunks, embedding_provider.as_ref())
                .await?,
        );

        let retriever = Retriever::new(Arc::clone(&index), embedding_provider, config.top_k);
        let composer = AnswerComposer::new(generator);

        Ok(Assistant { config, index, retriever, composer })
    }
}
