//! Named pipeline assemblies
//!
//! Most callers want one of a few standard configurations rather than
//! hand-assembling detectors and processors. A preset builds a complete
//! pipeline from a [`PipelineConfig`]; callers needing a custom mix use
//! [`PipelineBuilder`](crate::PipelineBuilder) directly.

use perek_core::{
    ChapterDetector, PunctuationDetector, SizeOptimizer, SizeOptimizerConfig,
};

use crate::config::PipelineConfig;
use crate::error::{EngineError, Result};
use crate::pipeline::SegmentationPipeline;

/// Standard pipeline assemblies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Full narration pipeline: sentence and paragraph detection, chapter
    /// detection, and size optimization
    Narration,
    /// Sentence and paragraph detection only, no chapter detection and no
    /// size optimization
    Paragraphs,
    /// No detectors or processors; each chapter (or the whole text) comes
    /// back as a single chunk
    Raw,
}

impl Preset {
    /// Look up a preset by name
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "narration" => Ok(Preset::Narration),
            "paragraphs" => Ok(Preset::Paragraphs),
            "raw" => Ok(Preset::Raw),
            other => Err(EngineError::InvalidConfig(format!(
                "unknown preset {other:?} (expected narration, paragraphs, or raw)"
            ))),
        }
    }

    /// The preset's canonical name
    pub fn name(&self) -> &'static str {
        match self {
            Preset::Narration => "narration",
            Preset::Paragraphs => "paragraphs",
            Preset::Raw => "raw",
        }
    }

    /// Build a pipeline with the default configuration
    pub fn build(self) -> Result<SegmentationPipeline> {
        self.build_with(PipelineConfig::default())
    }

    /// Build a pipeline with a custom configuration
    ///
    /// The size optimizer, when the preset includes one, inherits the
    /// configuration's chunk-size bounds.
    pub fn build_with(self, config: PipelineConfig) -> Result<SegmentationPipeline> {
        match self {
            Preset::Narration => {
                let optimizer = SizeOptimizer::with_config(SizeOptimizerConfig {
                    min_size: config.min_chunk_size,
                    max_size: config.max_chunk_size,
                    target_size: config.target_chunk_size,
                    preserve_chapter_boundaries: config.preserve_chapter_boundaries,
                    ..SizeOptimizerConfig::default()
                })?;
                SegmentationPipeline::new(
                    config,
                    vec![
                        Box::new(PunctuationDetector::new()),
                        Box::new(ChapterDetector::new()),
                    ],
                    vec![Box::new(optimizer)],
                )
            }
            Preset::Paragraphs => SegmentationPipeline::new(
                config,
                vec![Box::new(PunctuationDetector::new())],
                vec![],
            ),
            Preset::Raw => SegmentationPipeline::new(config, vec![], vec![]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perek_core::CHAPTER_DETECTOR_NAME;

    #[test]
    fn preset_names_round_trip() {
        for preset in [Preset::Narration, Preset::Paragraphs, Preset::Raw] {
            assert_eq!(Preset::from_name(preset.name()).unwrap(), preset);
        }
        assert!(Preset::from_name("unknown").is_err());
    }

    #[test]
    fn narration_assembles_full_pipeline() {
        let pipeline = Preset::Narration.build().unwrap();
        assert!(pipeline
            .detector_names()
            .contains(&CHAPTER_DETECTOR_NAME));
        assert_eq!(pipeline.detector_names().len(), 2);
        assert_eq!(pipeline.processor_names(), vec!["size-optimizer"]);
    }

    #[test]
    fn paragraphs_has_no_chapter_detection() {
        let pipeline = Preset::Paragraphs.build().unwrap();
        assert!(!pipeline
            .detector_names()
            .contains(&CHAPTER_DETECTOR_NAME));
        assert!(pipeline.processor_names().is_empty());
    }

    #[test]
    fn raw_is_empty() {
        let pipeline = Preset::Raw.build().unwrap();
        assert!(pipeline.detector_names().is_empty());
        assert!(pipeline.processor_names().is_empty());
    }

    #[test]
    fn build_with_propagates_bad_config() {
        let config = PipelineConfig {
            min_chunk_size: 900,
            max_chunk_size: 500,
            ..PipelineConfig::default()
        };
        assert!(Preset::Narration.build_with(config).is_err());
    }
}
