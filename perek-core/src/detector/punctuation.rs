//! Punctuation and paragraph split detection
//!
//! Emits three classes of split point in a single forward scan: paragraph
//! breaks at blank-line indicators, sentence breaks after Hebrew-aware
//! terminator characters, and forced word-level breaks that guarantee no
//! unbroken span ever exceeds the configured maximum. The forced break is a
//! correctness safety valve, not a stylistic feature, and is never skipped.

use crate::detector::SplitDetector;
use crate::error::{CoreError, Result};
use crate::scan::{backward_break, char_positions};
use crate::types::{SplitKind, SplitPoint};

/// Configuration for the punctuation/paragraph detector
#[derive(Debug, Clone)]
pub struct PunctuationConfig {
    /// Blank-line indicator marking a paragraph break
    pub paragraph_break: String,
    /// Sentence-ending characters (standard punctuation plus sof pasuq)
    pub sentence_terminators: Vec<char>,
    /// Characters whose parity decides whether a position is inside a quote
    pub quote_chars: Vec<char>,
    /// Minimum characters between accepted sentence breaks
    ///
    /// Prevents pathological over-splitting on abbreviations and initials.
    pub min_sentence_length: usize,
    /// Maximum characters any span may run without a break
    pub max_sentence_length: usize,
    /// How far backward (in characters) a forced break searches for
    /// whitespace before giving up and breaking at the hard position
    pub break_search_window: usize,
}

impl Default for PunctuationConfig {
    fn default() -> Self {
        Self {
            paragraph_break: "\n\n".to_string(),
            sentence_terminators: vec!['.', '!', '?', '׃'],
            quote_chars: vec!['"'],
            min_sentence_length: 10,
            max_sentence_length: 800,
            break_search_window: 100,
        }
    }
}

/// Detector for paragraph, sentence, and forced breaks
#[derive(Debug, Clone)]
pub struct PunctuationDetector {
    config: PunctuationConfig,
}

impl Default for PunctuationDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl PunctuationDetector {
    /// Create a detector with the default Hebrew-aware configuration
    pub fn new() -> Self {
        Self {
            config: PunctuationConfig::default(),
        }
    }

    /// Create a detector with a custom configuration
    pub fn with_config(config: PunctuationConfig) -> Result<Self> {
        if config.paragraph_break.is_empty() {
            return Err(CoreError::InvalidConfig(
                "paragraph break indicator must not be empty".to_string(),
            ));
        }
        if config.max_sentence_length == 0 {
            return Err(CoreError::InvalidConfig(
                "max sentence length must be positive".to_string(),
            ));
        }
        if config.min_sentence_length >= config.max_sentence_length {
            return Err(CoreError::InvalidConfig(format!(
                "min sentence length {} must be below max sentence length {}",
                config.min_sentence_length, config.max_sentence_length
            )));
        }
        Ok(Self { config })
    }

    /// The active configuration
    pub fn config(&self) -> &PunctuationConfig {
        &self.config
    }
}

impl SplitDetector for PunctuationDetector {
    fn name(&self) -> &'static str {
        "punctuation"
    }

    fn find_split_points(&self, text: &str) -> Vec<SplitPoint> {
        let mut points = Vec::new();
        if text.is_empty() {
            return points;
        }

        let chars = char_positions(text);
        let cfg = &self.config;

        // All counters are char indices; `last_*` mark the char index just
        // past the most recent accepted break of that class.
        let mut quote_parity = 0usize;
        let mut last_sentence_break = 0usize;
        let mut last_break = 0usize;
        let mut next_paragraph_search = 0usize; // byte offset

        for (idx, &(pos, ch)) in chars.iter().enumerate() {
            if pos >= next_paragraph_search && text[pos..].starts_with(&cfg.paragraph_break) {
                points.push(SplitPoint::new(
                    pos,
                    SplitKind::ParagraphBreak,
                    cfg.paragraph_break.clone(),
                    text,
                ));
                next_paragraph_search = pos + cfg.paragraph_break.len();
                last_break = idx;
            }

            if cfg.sentence_terminators.contains(&ch) {
                let followed = chars
                    .get(idx + 1)
                    .map_or(true, |&(_, next)| next.is_whitespace());
                let boundary = idx + 1;
                if followed
                    && quote_parity % 2 == 0
                    && boundary - last_sentence_break >= cfg.min_sentence_length
                {
                    points.push(SplitPoint::new(
                        pos + ch.len_utf8(),
                        SplitKind::SentenceBreak,
                        ch.to_string(),
                        text,
                    ));
                    last_sentence_break = boundary;
                    last_break = boundary;
                }
            }

            if cfg.quote_chars.contains(&ch) {
                quote_parity += 1;
            }

            if idx + 1 - last_break >= cfg.max_sentence_length {
                let chosen = backward_break(&chars, idx, cfg.break_search_window)
                    .filter(|&j| j > last_break);
                let (break_idx, marker) = match chosen {
                    Some(j) => (j, chars[j].1.to_string()),
                    None => (idx, String::new()),
                };
                points.push(SplitPoint::new(
                    chars[break_idx].0,
                    SplitKind::ForcedBreak,
                    marker,
                    text,
                ));
                last_break = break_idx;
            }
        }

        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SplitPriority;

    fn points_of_kind(points: &[SplitPoint], priority: SplitPriority) -> Vec<&SplitPoint> {
        points.iter().filter(|p| p.priority == priority).collect()
    }

    #[test]
    fn finds_paragraph_breaks() {
        let detector = PunctuationDetector::new();
        let text = "פסקה ראשונה כאן\n\nפסקה שנייה כאן";
        let points = detector.find_split_points(text);
        let paras = points_of_kind(&points, SplitPriority::Paragraph);
        assert_eq!(paras.len(), 1);
        assert_eq!(paras[0].position, "פסקה ראשונה כאן".len());
    }

    #[test]
    fn finds_sentence_breaks_after_terminators() {
        let detector = PunctuationDetector::new();
        let text = "המשפט הראשון נגמר כאן. המשפט השני ממשיך הלאה";
        let points = detector.find_split_points(text);
        let sentences = points_of_kind(&points, SplitPriority::Sentence);
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].position, "המשפט הראשון נגמר כאן.".len());
        assert_eq!(sentences[0].marker, ".");
    }

    #[test]
    fn accepts_sof_pasuq_terminator() {
        let detector = PunctuationDetector::new();
        let text = "בראשית ברא אלהים׃ ויאמר אלהים יהי אור";
        let points = detector.find_split_points(text);
        let sentences = points_of_kind(&points, SplitPriority::Sentence);
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].marker, "׃");
    }

    #[test]
    fn rejects_terminator_not_followed_by_whitespace() {
        let detector = PunctuationDetector::new();
        let text = "גרסה 1.5 של התוכנה יצאה לאור";
        let points = detector.find_split_points(text);
        assert!(points_of_kind(&points, SplitPriority::Sentence).is_empty());
    }

    #[test]
    fn rejects_terminator_inside_quotes() {
        let detector = PunctuationDetector::new();
        let text = "הוא אמר \"תעצור כאן. עכשיו\" והמשיך ללכת. סוף הסיפור";
        let points = detector.find_split_points(text);
        let sentences = points_of_kind(&points, SplitPriority::Sentence);
        // Only the period outside the quote span is accepted.
        assert_eq!(sentences.len(), 1);
        assert!(sentences[0].position > text.find('"').unwrap());
    }

    #[test]
    fn respects_min_sentence_length() {
        let detector = PunctuationDetector::new();
        // The first period sits three characters in, well below the minimum.
        let text = "א.ב. כהן הגיע לפגישה בזמן. כולם שמחו לראותו";
        let points = detector.find_split_points(text);
        let sentences = points_of_kind(&points, SplitPriority::Sentence);
        assert_eq!(sentences.len(), 1);
        assert_eq!(
            sentences[0].position,
            "א.ב. כהן הגיע לפגישה בזמן.".len()
        );
    }

    #[test]
    fn sentence_at_end_of_text_is_accepted() {
        let detector = PunctuationDetector::new();
        let text = "המשפט האחרון נגמר בדיוק בסוף.";
        let points = detector.find_split_points(text);
        let sentences = points_of_kind(&points, SplitPriority::Sentence);
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].position, text.len());
    }

    #[test]
    fn forced_break_bounds_unbroken_spans() {
        let config = PunctuationConfig {
            max_sentence_length: 800,
            ..PunctuationConfig::default()
        };
        let detector = PunctuationDetector::with_config(config).unwrap();
        // Exactly 900 characters of space-separated words, no punctuation.
        let text = "אבגדח ".repeat(150);
        assert_eq!(text.chars().count(), 900);
        let points = detector.find_split_points(&text);
        let forced = points_of_kind(&points, SplitPriority::Word);
        assert_eq!(forced.len(), 1);
        let break_chars = text[..forced[0].position].chars().count();
        // Within the backward window of the 800-character mark.
        assert!(break_chars > 700 && break_chars < 800, "broke at {break_chars}");
        // Placed on whitespace.
        assert_eq!(forced[0].marker, " ");
    }

    #[test]
    fn forced_break_hard_position_without_whitespace() {
        let config = PunctuationConfig {
            max_sentence_length: 50,
            break_search_window: 10,
            ..PunctuationConfig::default()
        };
        let detector = PunctuationDetector::with_config(config).unwrap();
        let text = "א".repeat(60);
        let points = detector.find_split_points(&text);
        let forced = points_of_kind(&points, SplitPriority::Word);
        assert_eq!(forced.len(), 1);
        let break_chars = text[..forced[0].position].chars().count();
        assert_eq!(break_chars, 49);
        assert_eq!(forced[0].marker, "");
    }

    #[test]
    fn paragraph_and_sentence_coincide_at_same_position() {
        let detector = PunctuationDetector::new();
        let text = "המשפט הזה נגמר עם נקודה.\n\nפסקה חדשה מתחילה";
        let points = detector.find_split_points(text);
        let paras = points_of_kind(&points, SplitPriority::Paragraph);
        let sentences = points_of_kind(&points, SplitPriority::Sentence);
        assert_eq!(paras.len(), 1);
        assert_eq!(sentences.len(), 1);
        // Both land on the byte right after the period.
        assert_eq!(paras[0].position, sentences[0].position);
    }

    #[test]
    fn empty_text_yields_no_points() {
        let detector = PunctuationDetector::new();
        assert!(detector.find_split_points("").is_empty());
    }

    #[test]
    fn rejects_invalid_config() {
        let config = PunctuationConfig {
            min_sentence_length: 900,
            max_sentence_length: 800,
            ..PunctuationConfig::default()
        };
        assert!(PunctuationDetector::with_config(config).is_err());
    }
}
