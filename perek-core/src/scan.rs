//! Character-scan helpers shared by detectors and forced splitting
//!
//! Forced breaks must land on char boundaries and prefer positions that read
//! naturally in mixed Hebrew/Latin text. The helpers here centralize that
//! logic so the punctuation detector, the pipeline's forced chunk splitter,
//! and the size optimizer all place breaks the same way.

/// Whether `ch` falls in the Hebrew Unicode block
pub fn is_hebrew(ch: char) -> bool {
    ('\u{0590}'..='\u{05FF}').contains(&ch)
}

/// Collect `(byte_offset, char)` pairs for a text
///
/// Detectors index by character for size arithmetic while reporting byte
/// offsets, so most scans materialize this table once up front.
pub fn char_positions(text: &str) -> Vec<(usize, char)> {
    text.char_indices().collect()
}

/// Search backward from `limit` for the best break position
///
/// Scans at most `window` characters back from `chars[limit]` looking for
/// whitespace. A whitespace position sitting exactly on a Hebrew/non-Hebrew
/// script transition is preferred over one that merely separates words of
/// the same script; among equally good candidates the one closest to
/// `limit` wins. Returns the char index of the chosen whitespace, or `None`
/// when the window contains no whitespace at all (callers then break at the
/// hard limit).
pub fn backward_break(chars: &[(usize, char)], limit: usize, window: usize) -> Option<usize> {
    let limit = limit.min(chars.len().saturating_sub(1));
    let floor = limit.saturating_sub(window);
    let mut first_whitespace = None;

    let mut idx = limit;
    while idx > floor {
        if chars[idx].1.is_whitespace() {
            if first_whitespace.is_none() {
                first_whitespace = Some(idx);
            }
            if is_script_transition(chars, idx) {
                return Some(idx);
            }
        }
        idx -= 1;
    }

    first_whitespace
}

/// Whether the whitespace at `idx` separates Hebrew from non-Hebrew text
fn is_script_transition(chars: &[(usize, char)], idx: usize) -> bool {
    if idx == 0 || idx + 1 >= chars.len() {
        return false;
    }
    let prev = chars[idx - 1].1;
    let next = chars[idx + 1].1;
    prev.is_alphabetic() && next.is_alphabetic() && is_hebrew(prev) != is_hebrew(next)
}
