//! Answer composition: retrieved passages plus the question, under a
//! fixed prompt contract that constrains the model to the supplied
//! context.

use std::sync::Arc;

use tracing::{debug, error};

use crate::document::ScoredChunk;
use crate::error::Result;
use crate::generation::TextGenerator;

/// The fixed prompt contract (Turkish): answer briefly and only from the
/// supplied context, without drifting into new topics or questions.
pub const PROMPT_TEMPLATE: &str = "\
Sadece sorulan soruya net ve kısa cevap ver. Gereksiz ek açıklama yapma.
Sadece yukarıdaki soruya cevap ver. Başka konulara girmeyin veya yeni sorular sormayın.

Bilgiler:
{context}

Soru:
{question}

Cevap:
";

/// Assembles the constrained prompt and invokes the generative model.
///
/// Stateless per call; the generator's raw text output is returned
/// unmodified.
pub struct AnswerComposer {
    generator: Arc<dyn TextGenerator>,
}

impl AnswerComposer {
    /// Create a composer over the given generator.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Substitute the context block and question into the prompt template.
    ///
    /// Passage texts are joined with blank lines, preserving retrieval
    /// order.
    pub fn build_prompt(question: &str, passages: &[ScoredChunk]) -> String {
        let context =
            passages.iter().map(|p| p.chunk.text.as_str()).collect::<Vec<_>>().join("\n\n");
        PROMPT_TEMPLATE.replace("{context}", &context).replace("{question}", question)
    }

    /// Answer `question` strictly from `passages`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Generation`](crate::error::RagError::Generation)
    /// if the model call fails or times out; the failure is surfaced,
    /// never swallowed into an empty answer.
    pub async fn answer(&self, question: &str, passages: &[ScoredChunk]) -> Result<String> {
        let prompt = Self::build_prompt(question, passages);
        debug!(
            model = self.generator.model_id(),
            passage_count = passages.len(),
            prompt_len = prompt.len(),
            "composing answer"
        );

        self.generator.generate(&prompt).await.map_err(|e| {
            error!(error = %e, "answer generation failed");
            e
        })
    }
}
