//! Pipeline configuration and builder

use perek_core::{ChunkProcessor, SplitDetector};

use crate::error::{EngineError, Result};
use crate::pipeline::SegmentationPipeline;

/// Size and behavior options for the segmentation pipeline
///
/// All sizes are character counts. Positions in the resulting chunks are
/// byte offsets, always on UTF-8 boundaries.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Spans below this are not cut; the builder keeps accumulating
    pub min_chunk_size: usize,
    /// Spans above this are force-split immediately
    pub max_chunk_size: usize,
    /// Preferred chunk size for the size optimizer's merge pass
    pub target_chunk_size: usize,
    /// Never merge chunks across chapter boundaries
    pub preserve_chapter_boundaries: bool,
    /// Word-overlap ratio a fuzzy title match must reach to be accepted
    ///
    /// An empirically chosen default; kept configurable rather than assumed
    /// optimal.
    pub fuzzy_match_threshold: f64,
    /// How far backward (in characters) forced chunk splitting searches for
    /// whitespace before breaking at the hard position
    pub break_search_window: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_chunk_size: 100,
            max_chunk_size: 500,
            target_chunk_size: 300,
            preserve_chapter_boundaries: true,
            fuzzy_match_threshold: 0.7,
            break_search_window: 100,
        }
    }
}

impl PipelineConfig {
    /// Default bounds tuned for narration-length chunks
    pub fn narration() -> Self {
        Self::default()
    }

    /// Smaller chunks, for voices that degrade on long inputs
    pub fn fine_grained() -> Self {
        Self {
            min_chunk_size: 40,
            max_chunk_size: 200,
            target_chunk_size: 120,
            ..Self::default()
        }
    }

    /// Larger chunks, for batch synthesis
    pub fn coarse() -> Self {
        Self {
            min_chunk_size: 300,
            max_chunk_size: 1500,
            target_chunk_size: 900,
            ..Self::default()
        }
    }

    /// Fail fast on configurations the pipeline cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_size == 0 {
            return Err(EngineError::InvalidConfig(
                "max chunk size must be positive".to_string(),
            ));
        }
        if self.min_chunk_size > self.max_chunk_size {
            return Err(EngineError::InvalidConfig(format!(
                "min chunk size {} exceeds max chunk size {}",
                self.min_chunk_size, self.max_chunk_size
            )));
        }
        if self.target_chunk_size < self.min_chunk_size
            || self.target_chunk_size > self.max_chunk_size
        {
            return Err(EngineError::InvalidConfig(format!(
                "target chunk size {} must lie within [{}, {}]",
                self.target_chunk_size, self.min_chunk_size, self.max_chunk_size
            )));
        }
        if !(self.fuzzy_match_threshold > 0.0 && self.fuzzy_match_threshold <= 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "fuzzy match threshold {} must lie in (0, 1]",
                self.fuzzy_match_threshold
            )));
        }
        Ok(())
    }
}

/// Builder for custom pipeline assemblies
///
/// Detectors and processors run in the order they are added.
#[derive(Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
    detectors: Vec<Box<dyn SplitDetector>>,
    processors: Vec<Box<dyn ChunkProcessor>>,
}

impl PipelineBuilder {
    /// Create a builder with the default configuration and no components
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the minimum chunk size in characters
    pub fn min_chunk_size(mut self, size: usize) -> Self {
        self.config.min_chunk_size = size;
        self
    }

    /// Set the maximum chunk size in characters
    pub fn max_chunk_size(mut self, size: usize) -> Self {
        self.config.max_chunk_size = size;
        self
    }

    /// Set the target chunk size in characters
    pub fn target_chunk_size(mut self, size: usize) -> Self {
        self.config.target_chunk_size = size;
        self
    }

    /// Set whether merging may cross chapter boundaries
    pub fn preserve_chapter_boundaries(mut self, preserve: bool) -> Self {
        self.config.preserve_chapter_boundaries = preserve;
        self
    }

    /// Set the fuzzy title-match acceptance threshold
    pub fn fuzzy_match_threshold(mut self, threshold: f64) -> Self {
        self.config.fuzzy_match_threshold = threshold;
        self
    }

    /// Append a split detector
    pub fn detector(mut self, detector: Box<dyn SplitDetector>) -> Self {
        self.detectors.push(detector);
        self
    }

    /// Append a chunk processor
    pub fn processor(mut self, processor: Box<dyn ChunkProcessor>) -> Self {
        self.processors.push(processor);
        self
    }

    /// Validate the configuration and build the pipeline
    pub fn build(self) -> Result<SegmentationPipeline> {
        SegmentationPipeline::new(self.config, self.detectors, self.processors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
        assert!(PipelineConfig::fine_grained().validate().is_ok());
        assert!(PipelineConfig::coarse().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_bounds() {
        let config = PipelineConfig {
            min_chunk_size: 600,
            max_chunk_size: 500,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_target_outside_bounds() {
        let config = PipelineConfig {
            target_chunk_size: 600,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_threshold() {
        let config = PipelineConfig {
            fuzzy_match_threshold: 1.5,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PipelineConfig {
            fuzzy_match_threshold: 0.0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn builder_fails_fast_on_bad_config() {
        let result = PipelineBuilder::new()
            .min_chunk_size(600)
            .max_chunk_size(500)
            .build();
        assert!(result.is_err());
    }
}
