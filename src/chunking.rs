//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`CharacterChunker`] — a raw sliding window by character count
//! - [`RecursiveChunker`] — splits on paragraph breaks first, then sentence
//!   boundaries, then raw characters, to avoid severing sentences when avoidable
//!
//! All sizes are measured in characters, not bytes, so multi-byte text is
//! never sliced mid-codepoint. Whitespace-only chunks are discarded by
//! every chunker.

use crate::document::{Chunk, Document, META_CHUNK_INDEX};

/// A strategy for splitting documents into chunks.
///
/// Implementations are pure functions over their inputs: they produce
/// [`Chunk`]s with text and metadata but no embeddings. Embeddings are
/// attached later by the pipeline.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document contains no non-whitespace
    /// text. Each returned chunk has an empty embedding vector.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Splits text into fixed-size windows by character count with overlap.
///
/// The window advances by `chunk_size - overlap` characters per step; the
/// final window may be shorter than `chunk_size`.
#[derive(Debug, Clone)]
pub struct CharacterChunker {
    chunk_size: usize,
    overlap: usize,
}

impl CharacterChunker {
    /// Create a new `CharacterChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `overlap` — characters shared between consecutive chunks; must be
    ///   less than `chunk_size` for the window to advance
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self { chunk_size, overlap }
    }
}

impl Chunker for CharacterChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        assemble_chunks(document, window_split(&document.text, self.chunk_size, self.overlap))
    }
}

/// Splits text hierarchically: paragraphs, then sentences, then characters.
///
/// Segments produced at one level are greedily merged back together up to
/// `chunk_size`, so short paragraphs stay grouped while long ones fall
/// through to the next separator level. The exact boundary rules are a
/// tunable policy, not a contract; only the size bound is guaranteed.
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    overlap: usize,
}

impl RecursiveChunker {
    /// Separator hierarchy, coarsest first.
    const SEPARATORS: [&'static str; 4] = ["\n\n", ". ", "! ", "? "];

    /// Create a new `RecursiveChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `overlap` — characters shared between consecutive chunks when the
    ///   character-window fallback is reached
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self { chunk_size, overlap }
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        let pieces =
            split_recursive(&document.text, self.chunk_size, self.overlap, &Self::SEPARATORS);
        assemble_chunks(document, pieces)
    }
}

/// Turn raw text pieces into [`Chunk`]s, dropping whitespace-only pieces.
///
/// Chunk indices are assigned after filtering, so they are contiguous.
fn assemble_chunks(document: &Document, pieces: Vec<String>) -> Vec<Chunk> {
    pieces
        .into_iter()
        .filter(|piece| !piece.trim().is_empty())
        .enumerate()
        .map(|(index, text)| {
            let mut metadata = document.metadata.clone();
            metadata.insert(META_CHUNK_INDEX.to_string(), index.to_string());
            Chunk {
                id: format!("{}_{index}", document.id),
                text,
                embedding: Vec::new(),
                metadata,
                document_id: document.id.clone(),
            }
        })
        .collect()
}

/// Sliding character window with overlap. UTF-8 safe.
fn window_split(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if text.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size.saturating_sub(overlap);
    let mut pieces = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + chunk_size).min(chars.len());
        pieces.push(chars[start..end].iter().collect());
        if end == chars.len() || step == 0 {
            break;
        }
        start += step;
    }

    pieces
}

/// Split `text` on the first separator level, merging segments back up to
/// `chunk_size`. Segments that alone exceed `chunk_size` recurse into the
/// next level; with no levels left, fall back to a raw character window.
fn split_recursive(
    text: &str,
    chunk_size: usize,
    overlap: usize,
    separators: &[&str],
) -> Vec<String> {
    if text.chars().count() <= chunk_size {
        return vec![text.to_string()];
    }

    let Some((separator, rest)) = separators.split_first() else {
        return window_split(text, chunk_size, overlap);
    };

    let segments = split_keeping_separator(text, separator);
    if segments.len() <= 1 {
        // Separator not present; try the next level.
        return split_recursive(text, chunk_size, overlap, rest);
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for segment in segments {
        let segment_len = segment.chars().count();

        if segment_len > chunk_size {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
                current_len = 0;
            }
            pieces.extend(split_recursive(segment, chunk_size, overlap, rest));
        } else if current_len + segment_len > chunk_size {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            current.push_str(segment);
            current_len = segment_len;
        } else {
            current.push_str(segment);
            current_len += segment_len;
        }
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}

/// Split text at a separator, keeping the separator attached to the
/// preceding segment.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut segments = Vec::new();
    let mut start = 0;

    for (pos, matched) in text.match_indices(separator) {
        let end = pos + matched.len();
        segments.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        segments.push(&text[start..]);
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::new("doc", text)
    }

    fn char_len(s: &str) -> usize {
        s.chars().count()
    }

    #[test]
    fn character_chunker_respects_size_bound() {
        let chunker = CharacterChunker::new(10, 3);
        let chunks = chunker.chunk(&doc("abcdefghijklmnopqrstuvwxyz"));
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(char_len(&chunk.text) <= 10);
        }
    }

    #[test]
    fn character_chunker_consecutive_chunks_overlap() {
        let chunker = CharacterChunker::new(10, 4);
        let text = "abcdefghijklmnopqrstuvwxyz0123456789";
        let chunks = chunker.chunk(&doc(text));
        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].text.chars().collect();
            let tail: String = prev[prev.len() - 4..].iter().collect();
            assert!(
                pair[1].text.starts_with(&tail),
                "chunk '{}' does not start with overlap '{tail}'",
                pair[1].text
            );
        }
    }

    #[test]
    fn character_chunker_is_utf8_safe() {
        let chunker = CharacterChunker::new(5, 2);
        let chunks = chunker.chunk(&doc("héllo wörld — ünïcode tëxt"));
        for chunk in &chunks {
            assert!(char_len(&chunk.text) <= 5);
        }
    }

    #[test]
    fn whitespace_only_document_yields_no_chunks() {
        let chunker = RecursiveChunker::new(100, 20);
        assert!(chunker.chunk(&doc("   \n\n \t ")).is_empty());
        let chunker = CharacterChunker::new(100, 20);
        assert!(chunker.chunk(&doc("   \n\n \t ")).is_empty());
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        let chunker = RecursiveChunker::new(100, 20);
        assert!(chunker.chunk(&doc("")).is_empty());
    }

    #[test]
    fn recursive_chunker_keeps_short_text_whole() {
        let chunker = RecursiveChunker::new(500, 50);
        let chunks = chunker.chunk(&doc("Attendance must be at least 75% to sit for the exam."));
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text.contains("75%"));
    }

    #[test]
    fn recursive_chunker_prefers_paragraph_breaks() {
        let para_a = "First paragraph about registration deadlines.";
        let para_b = "Second paragraph about attendance rules.";
        let text = format!("{para_a}\n\n{para_b}");
        let chunker = RecursiveChunker::new(60, 10);
        let chunks = chunker.chunk(&doc(&text));
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].text.contains("registration"));
        assert!(chunks[1].text.contains("attendance"));
    }

    #[test]
    fn recursive_chunker_falls_back_to_sentences() {
        let text = "One sentence here. Another sentence there. A third one follows. \
                    And a fourth to push past the limit.";
        let chunker = RecursiveChunker::new(50, 10);
        let chunks = chunker.chunk(&doc(text));
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(char_len(&chunk.text) <= 50, "oversized chunk: '{}'", chunk.text);
        }
    }

    #[test]
    fn recursive_chunker_respects_size_bound_on_unbroken_text() {
        let text = "x".repeat(1000);
        let chunker = RecursiveChunker::new(128, 16);
        let chunks = chunker.chunk(&doc(&text));
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(char_len(&chunk.text) <= 128);
        }
    }

    #[test]
    fn chunk_ids_and_indices_are_contiguous() {
        let chunker = CharacterChunker::new(5, 0);
        let chunks = chunker.chunk(&doc("aaaaabbbbbccccc"));
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.id, format!("doc_{i}"));
            assert_eq!(chunk.metadata[META_CHUNK_INDEX], i.to_string());
            assert_eq!(chunk.document_id, "doc");
        }
    }

    #[test]
    fn chunks_inherit_document_metadata() {
        let document = Document::new("doc", "some text").with_metadata("page", "3");
        let chunks = RecursiveChunker::new(100, 0).chunk(&document);
        assert_eq!(chunks[0].metadata["page"], "3");
    }
}
