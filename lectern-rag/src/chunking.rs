//! Text chunking for course material ingestion.
//!
//! This module provides the [`Chunker`] trait, the [`SentenceChunker`]
//! implementation, and the [`chunk_course`] helper that turns per-lesson
//! text into a course-wide [`CourseChunk`] stream.

use crate::config::RagConfig;
use crate::course::CourseChunk;
use crate::error::{RagError, Result};

/// A strategy for splitting raw text into indexable pieces.
///
/// Chunking is pure: the same input always yields the same output, and no
/// chunker touches storage or embeddings.
pub trait Chunker: Send + Sync {
    /// Split text into chunks.
    ///
    /// Returns an empty `Vec` for empty input.
    fn chunk(&self, text: &str) -> Vec<String>;
}

/// Splits text into overlapping chunks, preferring sentence and paragraph
/// boundaries over hard cuts.
///
/// Sizes are measured in characters, so multi-byte text is never split
/// inside a code point. Each chunk after the first begins exactly
/// `chunk_overlap` characters before the end of the previous chunk, which
/// makes the output reconstructible: the original text equals the first
/// chunk followed by every later chunk minus its first `chunk_overlap`
/// characters.
///
/// # Example
///
/// ```rust,ignore
/// use lectern_rag::SentenceChunker;
///
/// let chunker = SentenceChunker::new(800, 100)?;
/// let chunks = chunker.chunk(lesson_text);
/// ```
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl SentenceChunker {
    /// Create a new `SentenceChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of overlapping characters between consecutive chunks
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ChunkingError`] if `chunk_size` is zero or
    /// `chunk_overlap` is not strictly smaller than `chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::ChunkingError("chunk_size must be greater than zero".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::ChunkingError(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap })
    }

    /// Create a `SentenceChunker` from an already-validated [`RagConfig`].
    pub fn from_config(config: &RagConfig) -> Self {
        Self { chunk_size: config.chunk_size, chunk_overlap: config.chunk_overlap }
    }
}

impl Chunker for SentenceChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let total = chars.len();
        if total <= self.chunk_size {
            return vec![text.to_string()];
        }

        let byte_at = |pos: usize| if pos == total { text.len() } else { chars[pos].0 };

        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let hard_end = (start + self.chunk_size).min(total);
            let end = if hard_end == total {
                total
            } else {
                natural_break(&chars, start + self.chunk_overlap, hard_end).unwrap_or(hard_end)
            };

            chunks.push(text[byte_at(start)..byte_at(end)].to_string());

            if end == total {
                break;
            }
            start = end - self.chunk_overlap;
        }

        chunks
    }
}

/// Find the latest cut position in `(floor + 1, hard_end]` that ends a
/// sentence or paragraph: whitespace preceded by `.`, `!`, `?`, or a newline.
///
/// The lower bound keeps the step past the overlap region, so every chunk
/// advances the scan even when the text is dense with boundaries.
fn natural_break(chars: &[(usize, char)], floor: usize, hard_end: usize) -> Option<usize> {
    let mut cut = hard_end;
    while cut > floor + 1 {
        let last = chars[cut - 1].1;
        if last.is_whitespace() && matches!(chars[cut - 2].1, '.' | '!' | '?' | '\n') {
            return Some(cut);
        }
        cut -= 1;
    }
    None
}

/// Chunk a course's lesson texts into a single [`CourseChunk`] stream.
///
/// Each section is a `(lesson_number, text)` pair; `None` marks preamble
/// text that belongs to the course but precedes the first lesson. Chunk
/// indexes increase monotonically across the whole course, not per lesson.
pub fn chunk_course(
    chunker: &dyn Chunker,
    course_title: &str,
    sections: &[(Option<u32>, &str)],
) -> Vec<CourseChunk> {
    let mut chunks = Vec::new();
    for (lesson_number, text) in sections {
        for content in chunker.chunk(text) {
            chunks.push(CourseChunk {
                content,
                course_title: course_title.to_string(),
                lesson_number: *lesson_number,
                chunk_index: chunks.len(),
            });
        }
    }
    chunks
}
