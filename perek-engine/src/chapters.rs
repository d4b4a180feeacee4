//! Chapter resolution and manual title alignment
//!
//! Externally supplied titles are the authoritative chapter count even when
//! the text's own formatting is inconsistent, so alignment tries
//! progressively looser strategies: normalized exact match, line-by-line
//! multiline match, then fuzzy word-overlap match. Titles that fail every
//! strategy are dropped; if nothing matches at all the text is divided
//! evenly — a degraded but deterministic result rather than a failure.

use log::debug;
use perek_core::scan::char_positions;
use perek_core::{Chapter, Span, SplitDetector, SplitKind};

/// Title used for a leading chapter when no better heuristic applies
const FALLBACK_LEADING_TITLE: &str = "Chapter 1";

/// Longest first line (in characters) still usable as a heuristic title
const MAX_HEURISTIC_TITLE_LEN: usize = 80;

/// How chapters were resolved, which decides the chunk kind of chapter
/// remainders downstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChapterOrigin {
    /// Aligned from externally supplied titles
    Manual,
    /// Derived from the chapter detector's split points
    Detected,
    /// Single implicit chapter wrapping the whole text
    Implicit,
}

/// Resolve chapter boundaries for one segmentation call
pub(crate) fn resolve_chapters(
    text: &str,
    manual_titles: Option<&[String]>,
    chapter_detector: Option<&dyn SplitDetector>,
    fuzzy_threshold: f64,
) -> (Vec<Chapter>, ChapterOrigin) {
    if let Some(titles) = manual_titles.filter(|titles| !titles.is_empty()) {
        return (
            resolve_manual(text, titles, fuzzy_threshold),
            ChapterOrigin::Manual,
        );
    }
    if let Some(detector) = chapter_detector {
        let chapters = resolve_detected(text, detector);
        if !chapters.is_empty() {
            return (chapters, ChapterOrigin::Detected);
        }
    }
    (vec![implicit_chapter(text)], ChapterOrigin::Implicit)
}

/// Derive chapters from the chapter detector's output
fn resolve_detected(text: &str, detector: &dyn SplitDetector) -> Vec<Chapter> {
    let mut starts: Vec<(usize, Option<String>)> = detector
        .find_split_points(text)
        .into_iter()
        .filter_map(|point| match point.kind {
            SplitKind::Chapter { title } => Some((point.position, title)),
            _ => None,
        })
        .collect();
    starts.sort_by_key(|&(position, _)| position);
    starts.dedup_by_key(|&mut (position, _)| position);

    if starts.is_empty() {
        return Vec::new();
    }
    if !text[..starts[0].0].trim().is_empty() {
        starts.insert(0, (0, Some(leading_title(text))));
    } else if starts[0].0 > 0 {
        // Only whitespace precedes the first heading; fold it in.
        starts[0].0 = 0;
    }
    build_chapters(text, starts)
}

/// Align supplied titles against the text and derive chapters from the
/// matched positions
fn resolve_manual(text: &str, titles: &[String], fuzzy_threshold: f64) -> Vec<Chapter> {
    let mut matched: Vec<(usize, String)> = titles
        .iter()
        .filter_map(|title| {
            let position = align_title(text, title, fuzzy_threshold);
            if position.is_none() {
                debug!("dropping unmatched chapter title: {title:?}");
            }
            position.map(|pos| (pos, title.clone()))
        })
        .collect();

    if matched.is_empty() {
        debug!("no chapter title matched; dividing text into {} segments", titles.len());
        return even_division(text, titles);
    }

    matched.sort_by_key(|&(position, _)| position);
    matched.dedup_by_key(|&mut (position, _)| position);

    let mut starts: Vec<(usize, Option<String>)> = Vec::with_capacity(matched.len() + 1);
    if !text[..matched[0].0].trim().is_empty() {
        starts.push((0, Some(leading_title(text))));
    } else if matched[0].0 > 0 {
        matched[0].0 = 0;
    }
    starts.extend(matched.into_iter().map(|(pos, title)| (pos, Some(title))));
    build_chapters(text, starts)
}

/// Locate one title in the text, trying exact, multiline, then fuzzy match
fn align_title(text: &str, title: &str, fuzzy_threshold: f64) -> Option<usize> {
    let (norm_text, offset_map) = normalize_with_map(text);
    let norm_title = normalize(title);
    if !norm_title.is_empty() {
        if let Some(found) = norm_text.find(&norm_title) {
            return Some(offset_map[found]);
        }
    }
    if title.lines().filter(|line| !line.trim().is_empty()).count() > 1 {
        if let Some(position) = multiline_match(text, title) {
            return Some(position);
        }
    }
    fuzzy_match(text, title, fuzzy_threshold)
}

/// Match a multi-line title against consecutive lines of the text,
/// tolerating either side containing the other per line
fn multiline_match(text: &str, title: &str) -> Option<usize> {
    let title_lines: Vec<String> = title
        .lines()
        .map(normalize)
        .filter(|line| !line.is_empty())
        .collect();
    if title_lines.len() < 2 {
        return None;
    }

    let mut text_lines = Vec::new();
    let mut offset = 0;
    for line in text.split('\n') {
        text_lines.push((offset, normalize(line)));
        offset += line.len() + 1;
    }

    let window = title_lines.len();
    for start in 0..text_lines.len().saturating_sub(window - 1) {
        let all_match = title_lines.iter().enumerate().all(|(i, title_line)| {
            let text_line = &text_lines[start + i].1;
            !text_line.is_empty()
                && (text_line.contains(title_line.as_str())
                    || title_line.contains(text_line.as_str()))
        });
        if all_match {
            return Some(text_lines[start].0);
        }
    }
    None
}

/// Scan for the earliest window where enough of the title's significant
/// words appear, in order, by substring containment
fn fuzzy_match(text: &str, title: &str, threshold: f64) -> Option<usize> {
    let words: Vec<String> = title
        .split_whitespace()
        .filter(|word| word.chars().count() > 2)
        .map(str::to_lowercase)
        .collect();
    if words.is_empty() {
        return None;
    }

    let tokens = lowercase_tokens(text);
    let window = words.len() * 3;

    for start in 0..tokens.len() {
        let limit = (start + window).min(tokens.len());
        let mut matched = 0usize;
        let mut cursor = start;
        for word in &words {
            while cursor < limit && !tokens[cursor].1.contains(word.as_str()) {
                cursor += 1;
            }
            if cursor < limit {
                matched += 1;
                cursor += 1;
            }
        }
        if matched as f64 / words.len() as f64 >= threshold {
            return Some(tokens[start].0);
        }
    }
    None
}

/// Divide the text into equal-length segments, one per supplied title
fn even_division(text: &str, titles: &[String]) -> Vec<Chapter> {
    let chars = char_positions(text);
    let per_segment = (chars.len() / titles.len()).max(1);
    titles
        .iter()
        .enumerate()
        .map(|(index, title)| {
            let start = chars
                .get(index * per_segment)
                .map_or(text.len(), |&(pos, _)| pos);
            let end = if index + 1 == titles.len() {
                text.len()
            } else {
                chars
                    .get((index + 1) * per_segment)
                    .map_or(text.len(), |&(pos, _)| pos)
            };
            Chapter {
                id: index,
                title: Some(title.clone()),
                span: Span::new(start, end),
                content: text[start..end].to_string(),
            }
        })
        .collect()
}

/// Build chapters from sorted start positions, each ending where the next
/// begins (or at text end)
fn build_chapters(text: &str, starts: Vec<(usize, Option<String>)>) -> Vec<Chapter> {
    starts
        .iter()
        .enumerate()
        .map(|(index, (start, title))| {
            let end = starts
                .get(index + 1)
                .map_or(text.len(), |&(next_start, _)| next_start);
            Chapter {
                id: index,
                title: title.clone(),
                span: Span::new(*start, end),
                content: text[*start..end].to_string(),
            }
        })
        .collect()
}

/// Single implicit chapter wrapping the whole text
fn implicit_chapter(text: &str) -> Chapter {
    Chapter {
        id: 0,
        title: None,
        span: Span::new(0, text.len()),
        content: text.to_string(),
    }
}

/// Heuristic title for an unlabeled leading chapter
fn leading_title(text: &str) -> String {
    let first_line = text.lines().map(str::trim).find(|line| !line.is_empty());
    match first_line {
        Some(line) if line.chars().count() <= MAX_HEURISTIC_TITLE_LEN => line.to_string(),
        _ => FALLBACK_LEADING_TITLE.to_string(),
    }
}

/// Lowercase, whitespace-collapsed form of a string
fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Normalized form of `text` plus a map from each normalized byte back to
/// the original byte offset that produced it
fn normalize_with_map(text: &str) -> (String, Vec<usize>) {
    let mut normalized = String::new();
    let mut map = Vec::new();
    let mut pending_space: Option<usize> = None;
    let mut seen_content = false;

    for (pos, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if seen_content && pending_space.is_none() {
                pending_space = Some(pos);
            }
            continue;
        }
        if let Some(space_pos) = pending_space.take() {
            normalized.push(' ');
            map.push(space_pos);
        }
        for lowered in ch.to_lowercase() {
            let before = normalized.len();
            normalized.push(lowered);
            for _ in before..normalized.len() {
                map.push(pos);
            }
        }
        seen_content = true;
    }

    (normalized, map)
}

/// Lowercased whitespace-separated tokens with their byte offsets
fn lowercase_tokens(text: &str) -> Vec<(usize, String)> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    for (pos, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some(s) = start.take() {
                tokens.push((s, text[s..pos].to_lowercase()));
            }
        } else if start.is_none() {
            start = Some(pos);
        }
    }
    if let Some(s) = start {
        tokens.push((s, text[s..].to_lowercase()));
    }
    tokens
}
