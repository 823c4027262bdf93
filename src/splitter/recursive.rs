// file: src/splitter/recursive.rs
// description: recursive character splitter producing overlapping fixed-size windows
// reference: hierarchical separator splitting (paragraphs, lines, words, characters)

use crate::config::SplitterConfig;
use crate::error::{RagError, Result};
use crate::models::{Chunk, Document};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Splits text into windows of at most `chunk_size` characters.
///
/// The first separator present in the text wins; pieces that are still too
/// large are split again with the remaining, finer separators. Separators
/// stay attached to the start of the piece that follows them, and adjacent
/// windows share up to `chunk_overlap` characters.
#[derive(Debug, Clone)]
pub struct RecursiveCharacterSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveCharacterSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::Config(
                "chunk_size must be greater than 0".to_string(),
            ));
        }

        if chunk_overlap > chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must not exceed chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn from_config(config: &SplitterConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    /// Split a document into chunks, recording each chunk's character offset.
    pub fn split_document(&self, document: &Document) -> Vec<Chunk> {
        let text = &document.content;
        let mut chunks = Vec::new();
        let mut index = 0usize;
        let mut previous_len = 0usize;

        for content in self.split_text(text) {
            let offset = (index + previous_len).saturating_sub(self.chunk_overlap);
            index = find_char_offset(text, &content, offset)
                .or_else(|| find_char_offset(text, &content, 0))
                .unwrap_or(offset);
            previous_len = char_len(&content);

            chunks.push(Chunk::from_document(document, content, index));
        }

        debug!(
            "Split {} into {} chunks",
            document.relative_path,
            chunks.len()
        );
        chunks
    }

    pub fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = documents
            .iter()
            .flat_map(|document| self.split_document(document))
            .collect();

        info!(
            "Split {} documents into {} chunks",
            documents.len(),
            chunks.len()
        );
        chunks
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut final_chunks = Vec::new();

        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut finer: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate.as_str();
                finer = &separators[i + 1..];
                break;
            }
        }

        let mut fitting: Vec<&str> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                final_chunks.extend(self.merge_pieces(&fitting));
                fitting.clear();
            }

            if finer.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    final_chunks.push(trimmed.to_string());
                }
            } else {
                final_chunks.extend(self.split_recursive(piece, finer));
            }
        }

        if !fitting.is_empty() {
            final_chunks.extend(self.merge_pieces(&fitting));
        }

        final_chunks
    }

    /// Greedily combine small pieces into windows, carrying the overlap forward.
    fn merge_pieces(&self, pieces: &[&str]) -> Vec<String> {
        let mut windows = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size {
                if total > self.chunk_size {
                    warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total, self.chunk_size
                    );
                }

                if !current.is_empty() {
                    if let Some(window) = join_pieces(&current) {
                        windows.push(window);
                    }

                    while total > self.chunk_overlap
                        || (total + len > self.chunk_size && total > 0)
                    {
                        match current.pop_front() {
                            Some(front) => total -= char_len(front),
                            None => break,
                        }
                    }
                }
            }

            current.push_back(piece);
            total += len;
        }

        if let Some(window) = join_pieces(&current) {
            windows.push(window);
        }

        windows
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn join_pieces(pieces: &VecDeque<&str>) -> Option<String> {
    let joined: String = pieces.iter().copied().collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Split on `separator`, keeping each separator at the start of the next piece.
/// An empty separator splits into individual characters.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut last = 0;
    for (idx, _) in text.match_indices(separator) {
        pieces.push(&text[last..idx]);
        last = idx;
    }
    pieces.push(&text[last..]);

    pieces.into_iter().filter(|p| !p.is_empty()).collect()
}

/// Find `needle` in `haystack` starting at a character offset, returning a character offset.
fn find_char_offset(haystack: &str, needle: &str, char_offset: usize) -> Option<usize> {
    let byte_start = haystack
        .char_indices()
        .nth(char_offset)
        .map(|(b, _)| b)
        .unwrap_or(haystack.len());

    let tail = &haystack[byte_start..];
    tail.find(needle)
        .map(|b| char_offset + char_len(&tail[..b]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn document(content: &str) -> Document {
        Document::new(
            "data/Personal/note.md".to_string(),
            "note.md".to_string(),
            content.to_string(),
            0,
        )
    }

    fn starts(chunks: &[Chunk]) -> Vec<usize> {
        chunks.iter().map(|c| c.start_index).collect()
    }

    #[test]
    fn test_rejects_overlap_larger_than_size() {
        assert!(RecursiveCharacterSplitter::new(10, 11).is_err());
        assert!(RecursiveCharacterSplitter::new(0, 0).is_err());
        assert!(RecursiveCharacterSplitter::new(10, 10).is_ok());
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let splitter = RecursiveCharacterSplitter::new(300, 100).unwrap();
        let chunks = splitter.split_document(&document("  Hello, world!  "));

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Hello, world!");
        assert_eq!(chunks[0].start_index, 2);
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        let splitter = RecursiveCharacterSplitter::new(300, 100).unwrap();
        assert!(splitter.split_text("").is_empty());
        assert!(splitter.split_text(" \n\n ").is_empty());
    }

    #[test]
    fn test_word_windows_overlap() {
        let splitter = RecursiveCharacterSplitter::new(10, 5).unwrap();
        let chunks = splitter.split_document(&document("aa bb cc dd ee"));

        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["aa bb cc", "cc dd ee"]);
        assert_eq!(starts(&chunks), vec![0, 6]);
    }

    #[test]
    fn test_paragraphs_preferred() {
        let splitter = RecursiveCharacterSplitter::new(20, 0).unwrap();
        let chunks = splitter.split_document(&document("first para\n\nsecond para\n\nthird"));

        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["first para", "second para\n\nthird"]);
        assert_eq!(starts(&chunks), vec![0, 12]);
    }

    #[test]
    fn test_oversized_word_split_by_characters() {
        let splitter = RecursiveCharacterSplitter::new(8, 0).unwrap();
        let chunks = splitter.split_document(&document("ab cdefghijklm no"));

        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["ab", "cdefghi", "jklm", "no"]);
        assert_eq!(starts(&chunks), vec![0, 3, 10, 15]);
    }

    #[test]
    fn test_no_separators_falls_back_to_characters() {
        let splitter = RecursiveCharacterSplitter::new(5, 0).unwrap();
        assert_eq!(splitter.split_text("abcdefghij"), vec!["abcde", "fghij"]);
    }

    #[test]
    fn test_start_index_counts_characters() {
        let splitter = RecursiveCharacterSplitter::new(6, 0).unwrap();
        let chunks = splitter.split_document(&document("héllo wörld"));

        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["héllo", "wörld"]);
        assert_eq!(starts(&chunks), vec![0, 6]);
    }

    #[test]
    fn test_chunks_never_exceed_size() {
        let splitter = RecursiveCharacterSplitter::new(300, 100).unwrap();
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit.\n".repeat(40);
        let chunks = splitter.split_text(&text);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 300));
    }

    #[test]
    fn test_chunk_count_is_reproducible() {
        let splitter = RecursiveCharacterSplitter::new(300, 100).unwrap();
        let docs: Vec<Document> = (0..3)
            .map(|i| document(&format!("Note {} body text. ", i).repeat(60)))
            .collect();

        let first = splitter.split_documents(&docs);
        let second = splitter.split_documents(&docs);

        assert_eq!(first.len(), second.len());
        assert_eq!(
            first.iter().map(|c| c.id.clone()).collect::<Vec<_>>(),
            second.iter().map(|c| c.id.clone()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_every_chunk_is_found_at_its_start_index() {
        let splitter = RecursiveCharacterSplitter::new(50, 20).unwrap();
        let text = "The quick brown fox jumps over the lazy dog.\nPack my box with five dozen liquor jugs.\n\nSphinx of black quartz, judge my vow.";
        let doc = document(text);

        for chunk in splitter.split_document(&doc) {
            let at: String = text
                .chars()
                .skip(chunk.start_index)
                .take(chunk.char_len())
                .collect();
            assert_eq!(at, chunk.content);
        }
    }
}
