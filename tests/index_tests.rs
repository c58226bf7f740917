//! Round-trip, guard, and property tests for the vector index.

use std::collections::HashMap;

use async_trait::async_trait;
use egitbot_rag::Result;
use egitbot_rag::document::Chunk;
use egitbot_rag::embedding::EmbeddingProvider;
use egitbot_rag::error::RagError;
use egitbot_rag::index::VectorIndex;
use proptest::prelude::*;

/// Deterministic byte-histogram embedding, L2-normalized. Identical text
/// always maps to an identical vector.
fn embed_text(text: &str, dim: usize) -> Vec<f32> {
    let mut v = vec![0.0f32; dim];
    for (i, b) in text.bytes().enumerate() {
        v[(b as usize + i) % dim] += 1.0;
    }
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

struct StubEmbedder {
    model: String,
    dim: usize,
}

impl StubEmbedder {
    fn new(model: &str, dim: usize) -> Self {
        Self { model: model.to_string(), dim }
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(embed_text(text, self.dim))
    }

    fn dimensions(&self) -> usize {
        self.dim
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

fn chunk(id: &str, text: &str) -> Chunk {
    Chunk {
        id: id.to_string(),
        text: text.to_string(),
        document_id: "doc".to_string(),
        metadata: HashMap::new(),
    }
}

fn sample_chunks() -> Vec<Chunk> {
    vec![
        chunk("c0", "Soru: 2+3 nedir?\nCevap: 5"),
        chunk("c1", "Soru: Türkiye'nin başkenti neresidir?\nCevap: Ankara"),
        chunk("c2", "Metin: Fotosentez bitkilerin besin üretme sürecidir.\nÖzet: Fotosentez."),
    ]
}

#[tokio::test]
async fn persisted_index_round_trips_exactly() {
    let provider = StubEmbedder::new("stub-minilm", 16);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");

    let built = VectorIndex::build(sample_chunks(), &provider).await.unwrap();
    built.persist(&path).await.unwrap();
    let loaded = VectorIndex::load(&path, &provider).await.unwrap();

    assert_eq!(loaded.len(), built.len());
    assert_eq!(loaded.model_id(), built.model_id());

    let query = embed_text("2+3 nedir?", 16);
    let before = built.query(&query, 3).unwrap();
    let after = loaded.query(&query, 3).unwrap();

    let ids = |r: &[egitbot_rag::ScoredChunk]| {
        r.iter().map(|s| s.chunk.id.clone()).collect::<Vec<_>>()
    };
    assert_eq!(ids(&before), ids(&after));
    for (b, a) in before.iter().zip(&after) {
        assert_eq!(b.score, a.score);
        assert_eq!(b.chunk, a.chunk);
    }
}

#[tokio::test]
async fn persist_leaves_no_temporary_file_behind() {
    let provider = StubEmbedder::new("stub-minilm", 16);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");

    let built = VectorIndex::build(sample_chunks(), &provider).await.unwrap();
    built.persist(&path).await.unwrap();

    assert!(path.exists());
    assert!(!path.with_extension("tmp").exists());
}

#[tokio::test]
async fn load_rejects_a_different_model_identity() {
    let provider_a = StubEmbedder::new("stub-minilm", 16);
    let provider_b = StubEmbedder::new("stub-mpnet", 16);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");

    let built = VectorIndex::build(sample_chunks(), &provider_a).await.unwrap();
    built.persist(&path).await.unwrap();

    let err = VectorIndex::load(&path, &provider_b).await.unwrap_err();
    assert!(matches!(err, RagError::IndexCorrupt(_)), "got {err:?}");
}

#[tokio::test]
async fn load_rejects_a_different_dimensionality() {
    let provider_a = StubEmbedder::new("stub-minilm", 16);
    let provider_b = StubEmbedder::new("stub-minilm", 32);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");

    let built = VectorIndex::build(sample_chunks(), &provider_a).await.unwrap();
    built.persist(&path).await.unwrap();

    let err = VectorIndex::load(&path, &provider_b).await.unwrap_err();
    assert!(matches!(err, RagError::IndexCorrupt(_)), "got {err:?}");
}

#[tokio::test]
async fn load_rejects_a_truncated_file() {
    let provider = StubEmbedder::new("stub-minilm", 16);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");
    tokio::fs::write(&path, b"{\"format_version\": 1, \"model\":").await.unwrap();

    let err = VectorIndex::load(&path, &provider).await.unwrap_err();
    assert!(matches!(err, RagError::IndexCorrupt(_)), "got {err:?}");
}

#[tokio::test]
async fn query_on_an_empty_index_fails_rather_than_returning_nothing() {
    let provider = StubEmbedder::new("stub-minilm", 16);
    let index = VectorIndex::build(Vec::new(), &provider).await.unwrap();

    let err = index.query(&embed_text("soru", 16), 3).unwrap_err();
    assert!(matches!(err, RagError::EmptyIndex));
}

#[tokio::test]
async fn k_larger_than_the_index_is_clamped() {
    let provider = StubEmbedder::new("stub-minilm", 16);
    let index = VectorIndex::build(sample_chunks(), &provider).await.unwrap();

    let results = index.query(&embed_text("soru", 16), 100).unwrap();
    assert_eq!(results.len(), 3);
}

#[tokio::test]
async fn equal_scores_keep_insertion_order() {
    let provider = StubEmbedder::new("stub-minilm", 16);
    // Identical text embeds identically, so both chunks tie exactly.
    let chunks = vec![chunk("first", "aynı metin"), chunk("second", "aynı metin")];
    let index = VectorIndex::build(chunks, &provider).await.unwrap();

    let results = index.query(&embed_text("aynı metin", 16), 2).unwrap();
    assert_eq!(results[0].chunk.id, "first");
    assert_eq!(results[1].chunk.id, "second");
}

#[tokio::test]
async fn open_or_build_prefers_the_persisted_copy() {
    let provider = StubEmbedder::new("stub-minilm", 16);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");

    let built = VectorIndex::build(sample_chunks(), &provider).await.unwrap();
    built.persist(&path).await.unwrap();

    // A different chunk set is ignored because the persisted copy wins.
    let reopened =
        VectorIndex::open_or_build(&path, vec![chunk("other", "başka")], &provider).await.unwrap();
    assert_eq!(reopened.len(), 3);
}

#[tokio::test]
async fn open_or_build_refuses_to_persist_an_empty_index() {
    let provider = StubEmbedder::new("stub-minilm", 16);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");

    let err = VectorIndex::open_or_build(&path, Vec::new(), &provider).await.unwrap_err();
    assert!(matches!(err, RagError::EmptyIndex), "got {err:?}");

    // Nothing on disk: a later startup with a usable corpus must not
    // find a zero-entry index shadowing it.
    assert!(!path.exists());
}

#[tokio::test]
async fn open_or_build_rebuilds_over_a_persisted_empty_index() {
    let provider = StubEmbedder::new("stub-minilm", 16);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");

    let empty = VectorIndex::build(Vec::new(), &provider).await.unwrap();
    empty.persist(&path).await.unwrap();

    let rebuilt = VectorIndex::open_or_build(&path, sample_chunks(), &provider).await.unwrap();
    assert_eq!(rebuilt.len(), 3);
}

#[tokio::test]
async fn failed_existence_check_still_attempts_the_build() {
    let provider = StubEmbedder::new("stub-minilm", 16);
    let dir = tempfile::tempdir().unwrap();
    // A regular file where a directory is expected makes the existence
    // check itself error rather than report "not found".
    let blocker = dir.path().join("blocker");
    tokio::fs::write(&blocker, b"not a directory").await.unwrap();
    let path = blocker.join("index.json");

    // The build runs and the failure surfaces at the persist step, not
    // as a silent skip or a bogus load.
    let err = VectorIndex::open_or_build(&path, sample_chunks(), &provider).await.unwrap_err();
    assert!(matches!(err, RagError::IndexPersist(_)), "got {err:?}");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// For any chunk set and query, results come back ordered by
    /// descending similarity and bounded by both k and the index size.
    #[test]
    fn query_results_are_descending_and_bounded(
        texts in proptest::collection::vec("[a-zçğıöşü ]{1,40}", 1..16),
        query_text in "[a-zçğıöşü ]{1,40}",
        top_k in 1usize..20,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (results, count) = rt.block_on(async {
            let provider = StubEmbedder::new("stub-minilm", 16);
            let chunks: Vec<Chunk> = texts
                .iter()
                .enumerate()
                .map(|(i, text)| chunk(&format!("c{i}"), text))
                .collect();
            let count = chunks.len();
            let index = VectorIndex::build(chunks, &provider).await.unwrap();
            (index.query(&embed_text(&query_text, 16), top_k).unwrap(), count)
        });

        prop_assert!(results.len() <= top_k);
        prop_assert!(results.len() <= count);
        for window in results.windows(2) {
            prop_assert!(
                window[0].score >= window[1].score,
                "results not in descending order: {} < {}",
                window[0].score,
                window[1].score,
            );
        }
    }
}
