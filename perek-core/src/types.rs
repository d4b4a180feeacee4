//! Type definitions shared across detectors, processors, and the pipeline
//!
//! This module consolidates the vocabulary of the segmentation pipeline:
//! candidate split positions, their priority classes, and the chunks and
//! chapters built from them.

use serde::{Deserialize, Serialize};

/// Number of characters captured on each side of a split point for diagnostics
const CONTEXT_WINDOW: usize = 20;

// ============================================================================
// Split Point Types
// ============================================================================

/// Priority class of a split point
///
/// Lower values outrank higher ones when multiple detectors propose a split
/// at the same position: a chapter boundary beats a paragraph break, which
/// beats a sentence break, which beats a forced word-level break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SplitPriority {
    /// Chapter heading boundary
    Chapter,
    /// Blank-line paragraph break
    Paragraph,
    /// Sentence-ending punctuation
    Sentence,
    /// Forced break at a word boundary
    Word,
}

/// Classification of a split point
///
/// A closed enum instead of an open metadata bag, so every consumer gets
/// compile-time coverage over the recognized split classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitKind {
    /// Blank-line paragraph break
    ParagraphBreak,
    /// Sentence-ending punctuation break
    SentenceBreak,
    /// Forced break inserted to bound span length
    ForcedBreak,
    /// Chapter heading match
    Chapter {
        /// Title extracted from the heading, if any
        title: Option<String>,
    },
}

impl SplitKind {
    /// The priority class this kind of split carries
    pub fn priority(&self) -> SplitPriority {
        match self {
            SplitKind::ParagraphBreak => SplitPriority::Paragraph,
            SplitKind::SentenceBreak => SplitPriority::Sentence,
            SplitKind::ForcedBreak => SplitPriority::Word,
            SplitKind::Chapter { .. } => SplitPriority::Chapter,
        }
    }
}

/// Bounded text surrounding a split point, for diagnostics and tests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitContext {
    /// Up to [`CONTEXT_WINDOW`] characters before the split position
    pub before: String,
    /// Up to [`CONTEXT_WINDOW`] characters after the split position
    pub after: String,
}

impl SplitContext {
    /// Capture the context around `position` in `text`
    ///
    /// `position` must lie on a char boundary of `text`.
    pub fn capture(text: &str, position: usize) -> Self {
        let before = text[..position]
            .chars()
            .rev()
            .take(CONTEXT_WINDOW)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        let after = text[position..].chars().take(CONTEXT_WINDOW).collect();
        Self { before, after }
    }
}

/// A candidate position at which a chunk boundary may be placed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitPoint {
    /// Byte offset into the text the detector scanned (always a char boundary)
    pub position: usize,
    /// Priority class, derived from `kind`
    pub priority: SplitPriority,
    /// Classification of this split
    pub kind: SplitKind,
    /// The matched delimiter string, for diagnostics
    pub marker: String,
    /// Bounded surrounding text, for diagnostics
    pub context: SplitContext,
}

impl SplitPoint {
    /// Create a split point at `position` in `text`
    pub fn new(position: usize, kind: SplitKind, marker: impl Into<String>, text: &str) -> Self {
        debug_assert!(position <= text.len());
        debug_assert!(text.is_char_boundary(position));
        Self {
            position,
            priority: kind.priority(),
            kind,
            marker: marker.into(),
            context: SplitContext::capture(text, position),
        }
    }
}

// ============================================================================
// Chunk Types
// ============================================================================

/// A half-open byte range `[start, end)` into a text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a span; `start` must not exceed `end`
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Byte length of the span
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Shift both endpoints right by `offset`
    ///
    /// This is the single conversion between chapter-local and absolute
    /// coordinates; no other code mixes the two spaces.
    pub fn offset_by(&self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

/// How a chunk came to exist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChunkKind {
    /// Closed by a paragraph break
    Paragraph,
    /// Closed by a sentence break
    Sentence,
    /// Closed by a forced break
    Forced,
    /// Remainder of a detected chapter
    Chapter,
    /// Remainder of a manually-titled chapter
    ManualChapter,
    /// Produced by the size optimizer's merge pass
    SizeOptimized {
        /// Number of input chunks absorbed into this one
        merged_count: usize,
    },
    /// Produced by sentence-boundary splitting of an oversized chunk
    SentenceSplit {
        /// Ordinal of the parent chunk in the processor's input
        parent: usize,
    },
    /// Produced by word-boundary splitting of an oversized chunk
    WordSplit {
        /// Ordinal of the parent chunk in the processor's input
        parent: usize,
    },
}

/// Chapter attribution carried on a chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRef {
    /// Stable identifier of the owning chapter
    pub id: usize,
    /// Chapter title, if one was detected or supplied
    pub title: Option<String>,
    /// Ordinal of the chapter among all resolved chapters
    pub index: usize,
    /// Ordinal of the chunk within its chapter
    pub chunk_index: usize,
}

/// A contiguous, trimmed slice of text bounded by accepted split points
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Trimmed text content
    pub content: String,
    /// Byte range in the original input text (not trimmed, so it may cover
    /// whitespace that `content` does not)
    pub span: Span,
    /// How this chunk was produced
    pub kind: ChunkKind,
    /// Owning chapter, if chapters were resolved
    pub chapter: Option<ChapterRef>,
}

impl TextChunk {
    /// Create a chunk, trimming `content`
    pub fn new(content: impl Into<String>, span: Span, kind: ChunkKind) -> Self {
        Self {
            content: content.into().trim().to_string(),
            span,
            kind,
            chapter: None,
        }
    }

    /// Character count of the trimmed content
    ///
    /// Size bounds are expressed in characters, not bytes, so that Hebrew
    /// text is not penalized for its multibyte encoding.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Attach chapter attribution
    pub fn with_chapter(mut self, chapter: ChapterRef) -> Self {
        self.chapter = Some(chapter);
        self
    }
}

/// A resolved top-level text division
///
/// Derived once per segmentation call, either from a chapter detector's
/// output or from alignment of externally supplied titles, and never
/// mutated afterward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// Stable identifier (ordinal among resolved chapters)
    pub id: usize,
    /// Title, if detected or supplied
    pub title: Option<String>,
    /// Byte range in the original text
    pub span: Span,
    /// Chapter-local copy of the text slice
    pub content: String,
}
