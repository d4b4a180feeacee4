//! The segmentation pipeline
//!
//! One call to [`SegmentationPipeline::split_text`] runs a linear sequence
//! of stages: chapter resolution, per-chapter split-point collection,
//! initial chunk construction, translation to absolute offsets, then the
//! processor chain. No state persists across calls, so one pipeline may
//! serve concurrent calls on different texts.

use log::{debug, trace};

use perek_core::scan::{backward_break, char_positions};
use perek_core::{
    Chapter, ChapterRef, ChunkKind, ChunkProcessor, Span, SplitDetector, SplitKind, SplitPoint,
    TextChunk, CHAPTER_DETECTOR_NAME,
};

use crate::chapters::{resolve_chapters, ChapterOrigin};
use crate::config::PipelineConfig;
use crate::error::Result;

/// Per-call options for a segmentation run
#[derive(Debug, Clone, Default)]
pub struct SplitOptions {
    /// Ordered chapter titles supplied by the caller
    ///
    /// When present, these are the authoritative chapter count: they are
    /// aligned against the text instead of running the chapter detector.
    pub manual_chapter_titles: Option<Vec<String>>,
}

/// Orchestrator that turns raw text into an ordered chunk sequence
pub struct SegmentationPipeline {
    config: PipelineConfig,
    detectors: Vec<Box<dyn SplitDetector>>,
    processors: Vec<Box<dyn ChunkProcessor>>,
}

impl SegmentationPipeline {
    /// Create a pipeline, failing fast on invalid configuration
    pub fn new(
        config: PipelineConfig,
        detectors: Vec<Box<dyn SplitDetector>>,
        processors: Vec<Box<dyn ChunkProcessor>>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            detectors,
            processors,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Names of the configured detectors, in run order
    pub fn detector_names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    /// Names of the configured processors, in run order
    pub fn processor_names(&self) -> Vec<&'static str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    /// Segment `text` into ordered chunks
    pub fn split_text(&self, text: &str) -> Vec<TextChunk> {
        self.split_text_with(text, &SplitOptions::default())
    }

    /// Segment `text` with per-call options
    pub fn split_text_with(&self, text: &str, options: &SplitOptions) -> Vec<TextChunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let chapter_detector = self
            .detectors
            .iter()
            .find(|d| d.name() == CHAPTER_DETECTOR_NAME && d.is_enabled())
            .map(|d| d.as_ref());
        let (chapters, origin) = resolve_chapters(
            text,
            options.manual_chapter_titles.as_deref(),
            chapter_detector,
            self.config.fuzzy_match_threshold,
        );
        debug!("resolved {} chapter(s) ({origin:?})", chapters.len());

        let remainder_kind = match origin {
            ChapterOrigin::Manual => ChunkKind::ManualChapter,
            ChapterOrigin::Detected | ChapterOrigin::Implicit => ChunkKind::Chapter,
        };

        let mut chunks = Vec::new();
        for (index, chapter) in chapters.iter().enumerate() {
            let points = self.collect_points(&chapter.content);
            trace!(
                "chapter {index}: {} split point(s) over {} byte(s)",
                points.len(),
                chapter.content.len()
            );
            let local = self.build_chunks(&chapter.content, &points, remainder_kind.clone());
            chunks.extend(into_absolute(local, chapter, index));
        }
        debug!("built {} initial chunk(s)", chunks.len());

        for processor in self.processors.iter().filter(|p| p.is_enabled()) {
            chunks = processor.process(text, chunks);
            trace!("{}: {} chunk(s)", processor.name(), chunks.len());
        }

        renumber(&mut chunks);
        chunks
    }

    /// Run every enabled detector except the chapter detector over
    /// chapter-local text and return the merged, ordered split points
    ///
    /// Position is the primary sort key; priority breaks ties, so coincident
    /// paragraph and sentence breaks resolve deterministically to the
    /// paragraph classification.
    fn collect_points(&self, text: &str) -> Vec<SplitPoint> {
        let mut points = Vec::new();
        for detector in &self.detectors {
            if !detector.is_enabled() || detector.name() == CHAPTER_DETECTOR_NAME {
                continue;
            }
            points.extend(detector.find_split_points(text));
        }
        points.sort_by_key(|p| (p.position, p.priority));
        points
    }

    /// Walk the sorted split points and build chunks with chapter-local
    /// spans
    ///
    /// Spans within bounds are accepted as chunks; oversized spans are
    /// force-split immediately rather than waiting for a better point;
    /// undersized spans keep accumulating. The trailing remainder becomes a
    /// final chunk regardless of size.
    fn build_chunks(
        &self,
        text: &str,
        points: &[SplitPoint],
        remainder_kind: ChunkKind,
    ) -> Vec<TextChunk> {
        let mut chunks = Vec::new();
        let mut boundary = 0usize;

        for point in points {
            if point.position <= boundary || point.position > text.len() {
                continue;
            }
            let span_text = &text[boundary..point.position];
            let span_chars = span_text.chars().count();
            if span_chars < self.config.min_chunk_size {
                continue;
            }
            if span_chars > self.config.max_chunk_size {
                self.force_split_span(text, boundary, point.position, &mut chunks);
            } else if !span_text.trim().is_empty() {
                chunks.push(TextChunk::new(
                    span_text,
                    Span::new(boundary, point.position),
                    chunk_kind_for(&point.kind),
                ));
            }
            boundary = point.position;
        }

        if boundary < text.len() && !text[boundary..].trim().is_empty() {
            chunks.push(TextChunk::new(
                &text[boundary..],
                Span::new(boundary, text.len()),
                remainder_kind,
            ));
        }

        chunks
    }

    /// Carve an oversized span into bounded chunks at word boundaries
    ///
    /// Same placement rules as the punctuation detector's forced breaks:
    /// search backward for whitespace, prefer script transitions, fall back
    /// to the hard position.
    fn force_split_span(
        &self,
        text: &str,
        start: usize,
        end: usize,
        chunks: &mut Vec<TextChunk>,
    ) {
        let chars = char_positions(&text[start..end]);
        let max = self.config.max_chunk_size;
        let mut piece_start = 0usize; // char index

        while chars.len() - piece_start > max {
            let limit = piece_start + max - 1;
            let break_idx = backward_break(&chars, limit, self.config.break_search_window)
                .filter(|&idx| idx > piece_start)
                .unwrap_or(limit);
            let piece_span = Span::new(
                start + chars[piece_start].0,
                start + chars[break_idx].0,
            );
            let piece = &text[piece_span.start..piece_span.end];
            if !piece.trim().is_empty() {
                chunks.push(TextChunk::new(piece, piece_span, ChunkKind::Forced));
            }
            piece_start = break_idx;
        }

        let piece_span = Span::new(start + chars[piece_start].0, end);
        let piece = &text[piece_span.start..piece_span.end];
        if !piece.trim().is_empty() {
            chunks.push(TextChunk::new(piece, piece_span, ChunkKind::Forced));
        }
    }
}

/// Translate chapter-local chunks into absolute coordinates and attach
/// chapter attribution
///
/// This is the single crossing between the two coordinate spaces.
fn into_absolute(
    local: Vec<TextChunk>,
    chapter: &Chapter,
    chapter_index: usize,
) -> Vec<TextChunk> {
    local
        .into_iter()
        .enumerate()
        .map(|(chunk_index, mut chunk)| {
            chunk.span = chunk.span.offset_by(chapter.span.start);
            chunk.chapter = Some(ChapterRef {
                id: chapter.id,
                title: chapter.title.clone(),
                index: chapter_index,
                chunk_index,
            });
            chunk
        })
        .collect()
}

/// Reassign per-chapter chunk ordinals after the processor chain
///
/// Merging and splitting leave gaps and duplicates; persisted ordinals must
/// be gap-free in emission order.
fn renumber(chunks: &mut [TextChunk]) {
    let mut current_chapter: Option<usize> = None;
    let mut next_index = 0usize;
    for chunk in chunks {
        if let Some(chapter) = chunk.chapter.as_mut() {
            if current_chapter != Some(chapter.id) {
                current_chapter = Some(chapter.id);
                next_index = 0;
            }
            chapter.chunk_index = next_index;
            next_index += 1;
        }
    }
}

/// The chunk classification produced by accepting a split point
fn chunk_kind_for(kind: &SplitKind) -> ChunkKind {
    match kind {
        SplitKind::ParagraphBreak => ChunkKind::Paragraph,
        SplitKind::SentenceBreak => ChunkKind::Sentence,
        SplitKind::ForcedBreak => ChunkKind::Forced,
        SplitKind::Chapter { .. } => ChunkKind::Chapter,
    }
}
