//! Match extraction and snippet generation.
//!
//! For every accepted result the engine reports which fields matched,
//! where, and a short human-readable excerpt. Positions are byte
//! offsets into the normalized field text, best-effort (0 when the
//! backend reported none). Contexts extend outward to word boundaries,
//! capped at a fixed radius, with `…` marking truncation.

use crate::types::Field;
use serde::{Deserialize, Serialize};

/// Context radius around a match, in characters per side.
pub const CONTEXT_RADIUS: usize = 50;

/// Extra characters allowed when extending a context edge outward to
/// the enclosing word boundary.
const BOUNDARY_SLACK: usize = 12;

/// One field-level match within a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub field: Field,
    /// Byte offset of the match in the field text; 0 when unknown.
    pub position: usize,
    /// Byte length of the matched text.
    pub length: usize,
    /// Word-boundary-extended excerpt around the match.
    pub context: String,
}

/// Finds byte ranges of `needle` occurrences in `haystack`.
///
/// Case-insensitive search compares lower-cased character streams, so
/// offsets always index the original text even when folding changes
/// byte lengths. `needle` must already be folded for the insensitive
/// path (the planner folds query literals).
#[must_use]
pub fn find_occurrences(
    haystack: &str,
    needle: &str,
    case_sensitive: bool,
) -> Vec<(usize, usize)> {
    if needle.is_empty() {
        return Vec::new();
    }
    if case_sensitive {
        return haystack
            .match_indices(needle)
            .map(|(start, matched)| (start, start + matched.len()))
            .collect();
    }

    let mut out = Vec::new();
    let mut iter = haystack.char_indices();
    loop {
        let rest_start = match iter.clone().next() {
            Some((idx, _)) => idx,
            None => break,
        };
        if let Some(len) = folded_prefix_len(&haystack[rest_start..], needle) {
            out.push((rest_start, rest_start + len));
        }
        if iter.next().is_none() {
            break;
        }
    }
    out
}

/// Returns the byte length of the prefix of `text` whose lower-case
/// folding equals `needle`, if any.
fn folded_prefix_len(text: &str, needle: &str) -> Option<usize> {
    let mut needle_chars = needle.chars();
    let mut consumed = 0;

    for c in text.chars() {
        let mut matched_any = false;
        for folded in c.to_lowercase() {
            match needle_chars.next() {
                Some(expected) if expected == folded => matched_any = true,
                Some(_) => return None,
                // Needle exhausted mid-fold: the original char straddles
                // the needle end, not a clean match
                None => return None,
            }
        }
        if !matched_any {
            return None;
        }
        consumed += c.len_utf8();
        if needle_chars.clone().next().is_none() {
            return Some(consumed);
        }
    }
    None
}

/// Extracts a context excerpt around `[start, end)` in `text`.
///
/// The window spans `CONTEXT_RADIUS` characters on each side, extended
/// outward to the nearest word boundary (bounded), and trimmed. `…` is
/// prefixed/suffixed when the excerpt is truncated on that side.
#[must_use]
pub fn extract_context(text: &str, start: usize, end: usize) -> String {
    let start = start.min(text.len());
    let end = end.clamp(start, text.len());

    let mut left = floor_char_boundary(text, start);
    for _ in 0..CONTEXT_RADIUS {
        match text[..left].chars().next_back() {
            Some(c) => left -= c.len_utf8(),
            None => break,
        }
    }
    // Extend outward so the excerpt does not open mid-word
    let mut slack = BOUNDARY_SLACK;
    while left > 0 && slack > 0 {
        match text[..left].chars().next_back() {
            Some(c) if !c.is_whitespace() => {
                left -= c.len_utf8();
                slack -= 1;
            }
            _ => break,
        }
    }

    let mut right = ceil_char_boundary(text, end);
    let mut taken = 0;
    for c in text[right..].chars() {
        if taken == CONTEXT_RADIUS {
            break;
        }
        right += c.len_utf8();
        taken += 1;
    }
    let mut slack = BOUNDARY_SLACK;
    for c in text[right..].chars() {
        if slack == 0 || c.is_whitespace() {
            break;
        }
        right += c.len_utf8();
        slack -= 1;
    }

    let excerpt = text[left..right].trim();
    let mut out = String::with_capacity(excerpt.len() + 8);
    if left > 0 {
        out.push('…');
    }
    out.push_str(excerpt);
    if right < text.len() {
        out.push('…');
    }
    out
}

fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    idx = idx.min(text.len());
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(text: &str, mut idx: usize) -> usize {
    idx = idx.min(text.len());
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

/// Builds match records for every occurrence of `needle` in one field.
#[must_use]
pub fn extract_field_matches(
    field: Field,
    text: &str,
    needle: &str,
    case_sensitive: bool,
) -> Vec<MatchRecord> {
    find_occurrences(text, needle, case_sensitive)
        .into_iter()
        .map(|(start, end)| MatchRecord {
            field,
            position: start,
            length: end - start,
            context: extract_context(text, start, end),
        })
        .collect()
}

/// Chooses the single best display snippet for a result.
///
/// Preference order: a context where the query appears within the
/// first `CONTEXT_RADIUS` characters (prominence), then any context
/// containing the query, then the record from the highest-priority
/// field, then the empty string.
#[must_use]
pub fn best_snippet(records: &[MatchRecord], needle: &str, case_sensitive: bool) -> String {
    let query_at = |context: &str| {
        find_occurrences(context, needle, case_sensitive)
            .first()
            .map(|&(start, _)| start)
    };

    if let Some(record) = records.iter().find(|r| {
        query_at(&r.context).is_some_and(|pos| pos < CONTEXT_RADIUS)
    }) {
        return record.context.clone();
    }

    if let Some(record) = records.iter().find(|r| query_at(&r.context).is_some()) {
        return record.context.clone();
    }

    records
        .iter()
        .min_by_key(|r| r.field.priority())
        .map(|r| r.context.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_occurrences_case_sensitive() {
        let hits = find_occurrences("aXbXa", "X", true);
        assert_eq!(hits, vec![(1, 2), (3, 4)]);
        assert!(find_occurrences("abc", "x", true).is_empty());
    }

    #[test]
    fn test_find_occurrences_case_insensitive() {
        let hits = find_occurrences("JavaScript and javascript", "javascript", false);
        assert_eq!(hits, vec![(0, 10), (15, 25)]);
    }

    #[test]
    fn test_find_occurrences_multibyte() {
        // 'É' folds to 'é' (2 bytes each); offsets index the original
        let hits = find_occurrences("CAFÉ au lait", "café", false);
        assert_eq!(hits, vec![(0, 5)]);
    }

    #[test]
    fn test_extract_context_short_text_unmarked() {
        let text = "a tiny note";
        let ctx = extract_context(text, 2, 6);
        assert_eq!(ctx, "a tiny note");
        assert!(!ctx.contains('…'));
    }

    #[test]
    fn test_extract_context_truncates_with_ellipsis() {
        let long = "word ".repeat(40);
        let start = long.find("word").unwrap() + 100;
        let start = long[..start].rfind("word").unwrap();
        let ctx = extract_context(&long, start, start + 4);

        assert!(ctx.starts_with('…'));
        assert!(ctx.ends_with('…'));
        assert!(ctx.contains("word"));
        // Window stays near the configured radius
        assert!(ctx.chars().count() <= 2 * (CONTEXT_RADIUS + 16) + 6);
    }

    #[test]
    fn test_extract_context_extends_to_word_boundary() {
        let text = format!("{}interesting middle words here", "x".repeat(60));
        let pos = text.find("middle").unwrap();
        let ctx = extract_context(&text, pos, pos + 6);
        // The left edge lands inside "interesting"; the excerpt must not
        // open with a word fragment beyond the slack budget
        assert!(ctx.contains("middle words here"));
    }

    #[test]
    fn test_extract_field_matches() {
        let records = extract_field_matches(Field::Content, "foo bar foo", "foo", true);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].position, 0);
        assert_eq!(records[0].length, 3);
        assert_eq!(records[1].position, 8);
        assert_eq!(records[0].field, Field::Content);
    }

    #[test]
    fn test_best_snippet_prefers_prominent_context() {
        let records = vec![
            MatchRecord {
                field: Field::Content,
                position: 0,
                length: 4,
                context: format!("{} rust at the end", "pad ".repeat(20)),
            },
            MatchRecord {
                field: Field::Content,
                position: 0,
                length: 4,
                context: "rust right at the start".to_string(),
            },
        ];
        let snippet = best_snippet(&records, "rust", false);
        assert_eq!(snippet, "rust right at the start");
    }

    #[test]
    fn test_best_snippet_falls_back_to_field_priority() {
        let records = vec![
            MatchRecord {
                field: Field::Content,
                position: 0,
                length: 1,
                context: "body context".to_string(),
            },
            MatchRecord {
                field: Field::Title,
                position: 0,
                length: 1,
                context: "title context".to_string(),
            },
        ];
        // Needle not present in either context: field priority decides
        let snippet = best_snippet(&records, "zzz", false);
        assert_eq!(snippet, "title context");
    }

    #[test]
    fn test_best_snippet_empty_records() {
        assert_eq!(best_snippet(&[], "x", false), "");
    }
}
