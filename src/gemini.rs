//! [`TextGenerator`] backed by the Gemini `generateContent` API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{RagError, Result};
use crate::generation::TextGenerator;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The default generation model.
pub const DEFAULT_MODEL: &str = "models/gemini-2.5-pro";

/// The default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A [`TextGenerator`] that calls the Gemini `generateContent` endpoint.
///
/// # Example
///
/// ```rust,ignore
/// use egitbot_rag::gemini::GeminiGenerator;
///
/// let generator = GeminiGenerator::from_env()?;
/// let answer = generator.generate("Soru: 2+3 nedir?").await?;
/// ```
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl GeminiGenerator {
    /// Create a new generator with the given API key and the default model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Generation("API key must not be empty".into()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_MODEL.into(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Create a new generator using the `GOOGLE_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY").map_err(|_| {
            RagError::Generation("GOOGLE_API_KEY environment variable not set".into())
        })?;
        Self::new(api_key)
    }

    /// Set the model name, e.g. `models/gemini-2.5-flash`.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn request(&self, prompt: &str) -> Result<String> {
        let url = format!("{GEMINI_BASE_URL}/{}:generateContent", self.model);
        let body = GenerateContentRequest {
            contents: vec![Content { parts: vec![Part { text: prompt }] }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(model = %self.model, error = %e, "generation request failed");
                RagError::Generation(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            error!(model = %self.model, %status, "generation API error");
            return Err(RagError::Generation(format!("API returned {status}: {detail}")));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            error!(model = %self.model, error = %e, "failed to parse generation response");
            RagError::Generation(format!("failed to parse response: {e}"))
        })?;

        extract_text(parsed)
            .ok_or_else(|| RagError::Generation("response contained no candidates".into()))
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Join the text parts of the first candidate, if any.
fn extract_text(response: GenerateContentResponse) -> Option<String> {
    let candidate = response.candidates.into_iter().next()?;
    let text: String =
        candidate.content.parts.into_iter().map(|p| p.text).collect::<Vec<_>>().join("");
    if text.is_empty() { None } else { Some(text) }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.model, prompt_len = prompt.len(), "generating answer");

        tokio::time::timeout(self.timeout, self.request(prompt)).await.map_err(|_| {
            error!(model = %self.model, timeout = ?self.timeout, "generation timed out");
            RagError::Generation(format!("timed out after {:?}", self.timeout))
        })?
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
