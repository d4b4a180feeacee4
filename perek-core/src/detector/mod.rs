//! Split detection
//!
//! Detectors scan raw text and emit candidate split positions. Each detector
//! is independent: it neither sees nor depends on other detectors' output,
//! and the pipeline reconciles overlapping signals by position and priority.

mod chapter;
mod punctuation;

pub use chapter::{ChapterConfig, ChapterDetector};
pub use punctuation::{PunctuationConfig, PunctuationDetector};

use crate::types::SplitPoint;

/// Name under which the chapter detector registers itself
///
/// The pipeline suppresses this detector when scanning chapter-local text,
/// since chapter boundaries have already been consumed by then.
pub const CHAPTER_DETECTOR_NAME: &str = "chapter";

/// A detector of candidate split positions
///
/// Implementations must be side-effect-free with respect to the input text
/// and must return positions valid for that exact input string. Detectors
/// hold only static configuration, so one instance may serve concurrent
/// segmentation calls.
pub trait SplitDetector: Send + Sync {
    /// Stable name used for pipeline introspection and selective exclusion
    fn name(&self) -> &'static str;

    /// Whether this detector should run
    fn is_enabled(&self) -> bool {
        true
    }

    /// Scan `text` and return all candidate split points
    fn find_split_points(&self, text: &str) -> Vec<SplitPoint>;
}
