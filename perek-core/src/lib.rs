//! Split detection and chunk processing for Hebrew-aware book segmentation
//!
//! This crate provides the algorithmic core of the segmentation pipeline:
//! the shared vocabulary types ([`SplitPoint`], [`TextChunk`], [`Chapter`]),
//! the [`SplitDetector`] and [`ChunkProcessor`] traits, and the concrete
//! implementations used for audiobook narration chunking.

#![warn(missing_docs)]

pub mod detector;
pub mod error;
pub mod processor;
pub mod scan;
pub mod types;

// Re-export key types
pub use detector::{
    ChapterConfig, ChapterDetector, PunctuationConfig, PunctuationDetector, SplitDetector,
    CHAPTER_DETECTOR_NAME,
};
pub use error::{CoreError, Result};
pub use processor::{ChunkProcessor, SizeOptimizer, SizeOptimizerConfig};
pub use types::{
    Chapter, ChapterRef, ChunkKind, Span, SplitContext, SplitKind, SplitPoint, SplitPriority,
    TextChunk,
};
