//! Segmentation pipeline orchestration for book narration chunking
//!
//! This crate assembles the detectors and processors from `perek-core` into
//! a pipeline that turns long-form text into bounded-size chunks suitable
//! for sequential text-to-speech narration: it resolves chapter boundaries
//! (detected headings or externally supplied titles), collects and
//! reconciles split points per chapter, builds size-bounded chunks, and
//! runs the processor chain.

#![warn(missing_docs)]

mod chapters;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod presets;

// Re-export key types
pub use config::{PipelineBuilder, PipelineConfig};
pub use error::{EngineError, Result};
pub use pipeline::{SegmentationPipeline, SplitOptions};
pub use presets::Preset;

// Re-export the core vocabulary for convenience
pub use perek_core::{
    Chapter, ChapterRef, ChunkKind, ChunkProcessor, Span, SplitDetector, SplitKind, SplitPoint,
    SplitPriority, TextChunk,
};
