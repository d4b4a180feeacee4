//! Chunk post-processing
//!
//! Processors transform an already-formed chunk sequence. They run in
//! pipeline order, each receiving the previous processor's output, and must
//! preserve total span coverage: the union of output spans equals the union
//! of input spans, modulo the whitespace trimmed from chunk content.

mod size;

pub use size::{SizeOptimizer, SizeOptimizerConfig};

use crate::types::TextChunk;

/// A transformation over a formed chunk sequence
///
/// Implementations hold only static configuration; one instance may serve
/// concurrent segmentation calls.
pub trait ChunkProcessor: Send + Sync {
    /// Stable name used for pipeline introspection
    fn name(&self) -> &'static str;

    /// Whether this processor should run
    fn is_enabled(&self) -> bool {
        true
    }

    /// Transform `chunks`; spans stay in the coordinate space of `text`
    fn process(&self, text: &str, chunks: Vec<TextChunk>) -> Vec<TextChunk>;
}
