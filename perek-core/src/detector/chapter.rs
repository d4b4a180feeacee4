//! Chapter heading detection
//!
//! Applies an ordered list of heading patterns against the whole text and
//! emits one chapter-priority split point per accepted match. Earlier
//! patterns claim their match positions first, so the Hebrew and English
//! heading forms take precedence over bare numeral lines.

use std::collections::HashSet;

use log::trace;
use regex::{Captures, Regex};

use crate::detector::SplitDetector;
use crate::error::{CoreError, Result};
use crate::types::{SplitKind, SplitPoint};

/// Configuration for the chapter heading detector
#[derive(Debug, Clone)]
pub struct ChapterConfig {
    /// Ordered heading patterns, applied with multiline matching
    pub patterns: Vec<String>,
    /// Minimum accepted title length in characters
    pub min_title_length: usize,
    /// Maximum accepted title length in characters
    pub max_title_length: usize,
}

impl Default for ChapterConfig {
    fn default() -> Self {
        Self {
            patterns: vec![
                // Hebrew: "פרק שני: כותרת", "חלק 3 - כותרת"
                r"(?m)^[ \t]*(?:פרק|חלק)[ \t]+(?:[א-ת]+|\d+)[ \t]*[:.\-–—]?[ \t]*(.*)$".to_string(),
                // English: "Chapter 7: Title", "Part IV"
                r"(?m)^[ \t]*(?:[Cc]hapter|CHAPTER|[Pp]art|PART)[ \t]+(?:\d+|[IVXLCDMivxlcdm]+)[ \t]*[:.\-–—]?[ \t]*(.*)$"
                    .to_string(),
                // Bare numeric or roman-numeral heading lines
                r"(?m)^[ \t]*(\d{1,4}|[IVXLCDM]{1,8})[ \t]*$".to_string(),
            ],
            min_title_length: 1,
            max_title_length: 120,
        }
    }
}

/// Detector for chapter headings
#[derive(Debug)]
pub struct ChapterDetector {
    config: ChapterConfig,
    regexes: Vec<Regex>,
}

impl Default for ChapterDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ChapterDetector {
    /// Create a detector with the default heading patterns
    pub fn new() -> Self {
        Self::with_config(ChapterConfig::default())
            .expect("built-in chapter patterns must compile")
    }

    /// Create a detector with a custom configuration
    pub fn with_config(config: ChapterConfig) -> Result<Self> {
        if config.patterns.is_empty() {
            return Err(CoreError::InvalidConfig(
                "chapter detector requires at least one pattern".to_string(),
            ));
        }
        if config.min_title_length > config.max_title_length {
            return Err(CoreError::InvalidConfig(format!(
                "min title length {} exceeds max title length {}",
                config.min_title_length, config.max_title_length
            )));
        }
        let regexes = config
            .patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| CoreError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { config, regexes })
    }

    /// The active configuration
    pub fn config(&self) -> &ChapterConfig {
        &self.config
    }

    /// Extract a title from a heading match
    ///
    /// First non-empty capture group, falling back to the text after a
    /// colon, falling back to the words after the heading token.
    fn extract_title(caps: &Captures<'_>, matched: &str) -> String {
        for group in caps.iter().skip(1).flatten() {
            let candidate = group.as_str().trim();
            if !candidate.is_empty() {
                return candidate.to_string();
            }
        }
        if let Some(colon) = matched.find(':') {
            let candidate = matched[colon + 1..].trim();
            if !candidate.is_empty() {
                return candidate.to_string();
            }
        }
        matched
            .split_whitespace()
            .skip(1)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl SplitDetector for ChapterDetector {
    fn name(&self) -> &'static str {
        super::CHAPTER_DETECTOR_NAME
    }

    fn find_split_points(&self, text: &str) -> Vec<SplitPoint> {
        let mut points = Vec::new();
        let mut claimed: HashSet<usize> = HashSet::new();

        for regex in &self.regexes {
            for caps in regex.captures_iter(text) {
                let Some(matched) = caps.get(0) else { continue };
                if !claimed.insert(matched.start()) {
                    continue;
                }
                let title = Self::extract_title(&caps, matched.as_str());
                let title_len = title.chars().count();
                if title_len < self.config.min_title_length
                    || title_len > self.config.max_title_length
                {
                    continue;
                }
                points.push(SplitPoint::new(
                    matched.start(),
                    SplitKind::Chapter { title: Some(title) },
                    matched.as_str().trim(),
                    text,
                ));
            }
        }

        points.sort_by_key(|p| p.position);
        trace!("{} heading match(es)", points.len());
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(points: &[SplitPoint]) -> Vec<String> {
        points
            .iter()
            .filter_map(|p| match &p.kind {
                SplitKind::Chapter { title } => title.clone(),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn detects_hebrew_chapter_headings() {
        let detector = ChapterDetector::new();
        let text = "פרק 1: התחלה\nתוכן הפרק הראשון כאן.\n\nפרק 2: המשך\nתוכן הפרק השני כאן.";
        let points = detector.find_split_points(text);
        assert_eq!(points.len(), 2);
        assert_eq!(titles(&points), vec!["התחלה", "המשך"]);
        assert_eq!(points[0].position, 0);
        assert_eq!(points[1].position, text.find("פרק 2").unwrap());
    }

    #[test]
    fn detects_hebrew_letter_numbered_chapters() {
        let detector = ChapterDetector::new();
        let text = "פרק א: פתיחה\nתוכן.\nחלק ב - אמצע\nעוד תוכן.";
        let points = detector.find_split_points(text);
        assert_eq!(titles(&points), vec!["פתיחה", "אמצע"]);
    }

    #[test]
    fn detects_english_chapter_headings() {
        let detector = ChapterDetector::new();
        let text = "Chapter 1: The Beginning\nSome prose here.\nChapter 2\nMore prose.";
        let points = detector.find_split_points(text);
        assert_eq!(points.len(), 2);
        assert_eq!(titles(&points)[0], "The Beginning");
    }

    #[test]
    fn chapter_without_title_text_falls_back_to_token_words() {
        let detector = ChapterDetector::new();
        let text = "Chapter 2\nProse follows the bare heading.";
        let points = detector.find_split_points(text);
        assert_eq!(points.len(), 1);
        assert_eq!(titles(&points), vec!["2"]);
    }

    #[test]
    fn detects_bare_roman_numeral_heading() {
        let detector = ChapterDetector::new();
        let text = "Some intro text.\nIV\nThe fourth section begins.";
        let points = detector.find_split_points(text);
        assert_eq!(points.len(), 1);
        assert_eq!(titles(&points), vec!["IV"]);
        assert_eq!(points[0].position, text.find("IV").unwrap());
    }

    #[test]
    fn rejects_overlong_titles() {
        let config = ChapterConfig {
            max_title_length: 10,
            ..ChapterConfig::default()
        };
        let detector = ChapterDetector::with_config(config).unwrap();
        let text = "פרק 1: כותרת ארוכה מאוד שחורגת בהרבה מהמגבלה שנקבעה";
        assert!(detector.find_split_points(text).is_empty());
    }

    #[test]
    fn plain_prose_yields_no_points() {
        let detector = ChapterDetector::new();
        let text = "סתם טקסט רגיל בלי כותרות.\nעוד שורה של טקסט רגיל.";
        assert!(detector.find_split_points(text).is_empty());
    }

    #[test]
    fn rejects_empty_pattern_list() {
        let config = ChapterConfig {
            patterns: vec![],
            ..ChapterConfig::default()
        };
        assert!(ChapterDetector::with_config(config).is_err());
    }
}
