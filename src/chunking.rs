//! Document chunking.
//!
//! The chunking unit is the Unicode scalar value (`char`), not the byte:
//! the corpus is Turkish text, and byte-offset windows would split
//! multi-byte characters. Windows of `chunk_size` chars advance by
//! `chunk_size - chunk_overlap` chars per step, so consecutive chunks
//! share `chunk_overlap` chars.

use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// A strategy for splitting documents into chunks.
///
/// Implementations must be deterministic: identical input and
/// configuration always yield an identical chunk sequence.
pub trait Chunker: Send + Sync {
    /// Split a document into ordered chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Splits text into fixed-size character windows with overlap.
///
/// A document shorter than `chunk_size` yields exactly one chunk equal to
/// the document text. Chunk IDs are `{document_id}_{chunk_index}`.
#[derive(Debug, Clone)]
pub struct CharChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl CharChunker {
    /// Create a new `CharChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] unless `chunk_overlap < chunk_size`
    /// and `chunk_size > 0`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be greater than zero".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap })
    }
}

impl Chunker for CharChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every char boundary, plus the end of the text.
        let mut bounds: Vec<usize> = document.text.char_indices().map(|(i, _)| i).collect();
        bounds.push(document.text.len());
        let char_count = bounds.len() - 1;

        let step = self.chunk_size - self.chunk_overlap;
        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let end = (start + self.chunk_size).min(char_count);
            let chunk_index = chunks.len();

            let mut metadata = std::collections::HashMap::new();
            metadata.insert("chunk_index".to_string(), chunk_index.to_string());
            metadata.insert("source_document".to_string(), document.source.clone());

            chunks.push(Chunk {
                id: format!("{}_{chunk_index}", document.id),
                text: document.text[bounds[start]..bounds[end]].to_string(),
                document_id: document.id.clone(),
                metadata,
            });

            if end == char_count {
                break;
            }
            start += step;
        }

        chunks
    }
}

/// Chunk every document in sequence, preserving document order.
pub fn chunk_all(chunker: &dyn Chunker, documents: &[Document]) -> Vec<Chunk> {
    documents.iter().flat_map(|d| chunker.chunk(d)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document { id: "doc".to_string(), text: text.to_string(), source: "test".to_string() }
    }

    fn texts(chunks: &[Chunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn short_document_yields_one_chunk_equal_to_the_document() {
        let chunker = CharChunker::new(100, 10).unwrap();
        let chunks = chunker.chunk(&doc("Soru: 2+3 nedir?\nCevap: 5"));
        assert_eq!(texts(&chunks), vec!["Soru: 2+3 nedir?\nCevap: 5"]);
    }

    #[test]
    fn chunk_count_matches_the_window_formula() {
        // For length L > overlap O and size M: ceil((L - O) / (M - O)).
        let cases = [(5usize, 3usize, 1usize), (6, 3, 1), (10, 4, 2), (2000, 2000, 100)];
        for (len, size, overlap) in cases {
            let chunker = CharChunker::new(size, overlap).unwrap();
            let text: String = "a".repeat(len);
            let chunks = chunker.chunk(&doc(&text));
            let expected = (len - overlap).div_ceil(size - overlap);
            assert_eq!(chunks.len(), expected, "L={len} M={size} O={overlap}");
        }
    }

    #[test]
    fn removing_overlaps_reconstructs_the_document() {
        let chunker = CharChunker::new(7, 3).unwrap();
        let original = "Türkiye'nin başkenti Ankara'dır ve en büyük şehri İstanbul'dur.";
        let chunks = chunker.chunk(&doc(original));

        let mut rebuilt = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i == 0 {
                rebuilt.push_str(&chunk.text);
            } else {
                rebuilt.extend(chunk.text.chars().skip(3));
            }
        }
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn windows_never_split_multibyte_characters() {
        let chunker = CharChunker::new(4, 1).unwrap();
        let chunks = chunker.chunk(&doc("ığüşöçİĞÜŞÖÇ"));
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 4);
        }
    }

    #[test]
    fn chunking_is_deterministic() {
        let chunker = CharChunker::new(5, 2).unwrap();
        let d = doc("fotosentez bitkilerin besin üretme sürecidir");
        assert_eq!(texts(&chunker.chunk(&d)), texts(&chunker.chunk(&d)));
    }

    #[test]
    fn chunk_ids_and_metadata_carry_position() {
        let chunker = CharChunker::new(3, 1).unwrap();
        let chunks = chunker.chunk(&doc("abcdef"));
        assert_eq!(chunks[0].id, "doc_0");
        assert_eq!(chunks[1].id, "doc_1");
        assert_eq!(chunks[1].metadata["chunk_index"], "1");
        assert_eq!(chunks[1].document_id, "doc");
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        let chunker = CharChunker::new(10, 2).unwrap();
        assert!(chunker.chunk(&doc("")).is_empty());
    }

    #[test]
    fn overlap_must_be_less_than_size() {
        assert!(matches!(CharChunker::new(5, 5), Err(RagError::Config(_))));
        assert!(matches!(CharChunker::new(0, 0), Err(RagError::Config(_))));
        assert!(CharChunker::new(5, 0).is_ok());
    }
}
