//! Corpus normalization: heterogeneous raw records in, uniform documents out.
//!
//! Each corpus source names its own prompt/response fields and the Turkish
//! labels used in the normalized text, so one routine handles every source
//! instead of one loop per dataset. The built-in catalog in
//! [`builtin_sources`] mirrors the four datasets the assistant was
//! originally trained against.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::document::Document;
use crate::error::{RagError, Result};

/// One raw record from a corpus source: a mapping of named fields to values.
///
/// Records typically come from JSON Lines files, one object per line.
/// Non-string field values are ignored during normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RawRecord(pub serde_json::Map<String, Value>);

impl RawRecord {
    /// Look up a field by name, returning it only if it is a string.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for RawRecord {
    fn from(fields: [(&str, &str); N]) -> Self {
        Self(
            fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect(),
        )
    }
}

/// Configuration-driven mapping from one corpus source to documents.
///
/// A record contributes a document only if both configured fields are
/// present and non-empty after trimming. Label prefixes are preserved
/// verbatim in the normalized text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceSpec {
    /// Name of the corpus source, used in document IDs and diagnostics.
    pub name: String,
    /// Field holding the prompt side of the record (question, text, …).
    pub prompt_field: String,
    /// Field holding the response side of the record (answer, solution, …).
    pub response_field: String,
    /// Label prefix for the prompt side, e.g. `"Soru"`.
    pub prompt_label: String,
    /// Label prefix for the response side, e.g. `"Cevap"`.
    pub response_label: String,
}

impl SourceSpec {
    /// Create a new source mapping.
    pub fn new(
        name: impl Into<String>,
        prompt_field: impl Into<String>,
        response_field: impl Into<String>,
        prompt_label: impl Into<String>,
        response_label: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            prompt_field: prompt_field.into(),
            response_field: response_field.into(),
            prompt_label: prompt_label.into(),
            response_label: response_label.into(),
        }
    }
}

/// The source catalog for the original educational corpus: math word
/// problems, harder competition math, general education Q&A, and
/// Wikipedia article/summary pairs.
pub fn builtin_sources() -> Vec<SourceSpec> {
    vec![
        SourceSpec::new("orca-math-word-problems-tr", "question", "answer", "Soru", "Cevap"),
        SourceSpec::new("turkce-lighteval-math-hard", "question", "solution", "Soru", "Cevap"),
        SourceSpec::new("turkish-education-dataset", "soru", "cevap", "Soru", "Cevap"),
        SourceSpec::new("wikipedia-tr-summarization", "text", "summary", "Metin", "Özet"),
    ]
}

/// Normalize raw records from one or more sources into a flat, ordered
/// document sequence.
///
/// Records missing either configured field (or with only whitespace in
/// them) are skipped individually; a bad record never aborts the batch.
pub fn normalize(sources: &[(SourceSpec, Vec<RawRecord>)]) -> Vec<Document> {
    let mut documents = Vec::new();

    for (spec, records) in sources {
        let before = documents.len();

        for record in records {
            let prompt = record.field(&spec.prompt_field).map(str::trim).unwrap_or_default();
            let response = record.field(&spec.response_field).map(str::trim).unwrap_or_default();
            if prompt.is_empty() || response.is_empty() {
                continue;
            }

            let id = format!("{}_{}", spec.name, documents.len() - before);
            documents.push(Document {
                id,
                text: format!(
                    "{}: {}\n{}: {}",
                    spec.prompt_label, prompt, spec.response_label, response
                ),
                source: spec.name.clone(),
            });
        }

        let kept = documents.len() - before;
        info!(
            source = %spec.name,
            record_count = records.len(),
            document_count = kept,
            "normalized corpus source"
        );
    }

    documents
}

/// Read raw records from a JSON Lines file.
///
/// Individual lines that fail to parse are skipped; only a wholly
/// unreadable file produces [`RagError::Corpus`].
pub async fn read_jsonl(spec: &SourceSpec, path: impl AsRef<Path>) -> Result<Vec<RawRecord>> {
    let path = path.as_ref();
    let data = tokio::fs::read_to_string(path).await.map_err(|e| RagError::Corpus {
        source_name: spec.name.clone(),
        message: format!("failed to read '{}': {e}", path.display()),
    })?;

    let mut records = Vec::new();
    for (line_no, line) in data.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<RawRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                debug!(source = %spec.name, line = line_no + 1, error = %e, "skipping bad record");
            }
        }
    }

    Ok(records)
}
