//! Configuration for the retrieval pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};
use crate::retriever::DEFAULT_TOP_K;

/// Configuration parameters for the retrieval pipeline.
///
/// Defaults mirror the original deployment: 2000-character chunks with a
/// 100-character overlap, three passages per question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters (Unicode scalar values).
    pub chunk_size: usize,
    /// Overlap between consecutive chunks, in characters.
    pub chunk_overlap: usize,
    /// Number of passages retrieved per question.
    pub top_k: usize,
    /// Path of the persisted vector index.
    pub index_path: PathBuf,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 2000,
            chunk_overlap: 100,
            top_k: DEFAULT_TOP_K,
            index_path: PathBuf::from("egitbot_index.json"),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of passages retrieved per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the path of the persisted vector index.
    pub fn index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.index_path = path.into();
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be greater than zero".to_string()));
        }
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}
