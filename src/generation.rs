//! Text generator trait for the answer-composition step.

use async_trait::async_trait;

use crate::error::Result;

/// A generative model that completes a prompt into plain text.
///
/// Treated as a black box: no streaming, no tool calls. Implementations
/// must bound the call with a timeout and surface failures as
/// [`RagError::Generation`](crate::error::RagError::Generation) rather
/// than blocking indefinitely.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`, returned verbatim.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// The model identity, for diagnostics.
    fn model_id(&self) -> &str;
}
