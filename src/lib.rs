//! Retrieval-augmented question answering core for the EğitBot
//! educational assistant.
//!
//! Given a corpus of heterogeneous educational text (math word problems,
//! worked solutions, Q&A pairs, article/summary pairs), this crate
//! normalizes it into documents, cuts them into overlapping chunks,
//! embeds the chunks, and builds a persisted vector index — once per
//! process. At query time it retrieves the top-k most similar passages
//! and constrains a generative model to answer strictly from them.
//!
//! The UI layer (chat history, example questions, exports) lives outside
//! this crate and talks to it through [`Assistant::ask`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use egitbot_rag::{Assistant, GeminiGenerator, OpenAiEmbeddings, builtin_sources, read_jsonl};
//!
//! let specs = builtin_sources();
//! let mut sources = Vec::new();
//! for spec in specs {
//!     let records = read_jsonl(&spec, format!("data/{}.jsonl", spec.name)).await?;
//!     sources.push((spec, records));
//! }
//!
//! let assistant = Assistant::builder()
//!     .embedding_provider(Arc::new(OpenAiEmbeddings::from_env()?))
//!     .generator(Arc::new(GeminiGenerator::from_env()?))
//!     .init(&sources)
//!     .await?;
//!
//! let answer = assistant.ask("Fotosentez nedir?").await?;
//! ```

pub mod chunking;
pub mod composer;
pub mod config;
pub mod corpus;
pub mod document;
pub mod embedding;
pub mod error;
pub mod gemini;
pub mod generation;
pub mod index;
pub mod openai;
pub mod pipeline;
pub mod retriever;

pub use chunking::{CharChunker, Chunker};
pub use composer::AnswerComposer;
pub use config::RagConfig;
pub use corpus::{RawRecord, SourceSpec, builtin_sources, normalize, read_jsonl};
pub use document::{Chunk, Document, RetrievalResult, ScoredChunk};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use gemini::GeminiGenerator;
pub use generation::TextGenerator;
pub use index::VectorIndex;
pub use openai::OpenAiEmbeddings;
pub use pipeline::{Assistant, AssistantBuilder};
pub use retriever::{DEFAULT_TOP_K, Retriever};
