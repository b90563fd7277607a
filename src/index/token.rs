//! Per-field token index for whole-word, fuzzy and prefix lookups.
//!
//! Terms are maximal alphanumeric/underscore runs. Whole-word lookup is
//! exact term equality; fuzzy lookup scans the term dictionary with a
//! length-banded, early-exit edit distance; prefix enumeration serves
//! autocomplete suggestions.

use crate::document::Document;
use crate::types::{DocId, Field};
use ahash::AHashMap;
use roaring::RoaringBitmap;

/// A fuzzy dictionary hit: which term matched, where, at what distance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyHit {
    pub id: DocId,
    pub field: Field,
    /// The dictionary term that matched (not the query term).
    pub term: String,
    /// Edit distance from the query term; 0 for prefix extensions.
    pub edits: usize,
}

/// In-memory token index, one `term → postings` map per field.
///
/// Case folding is baked in at construction, mirroring the trigram
/// index: tokenizer behavior is a structural property of the index,
/// not a per-query parameter.
pub struct TokenIndex {
    fields: AHashMap<Field, AHashMap<String, RoaringBitmap>>,
    fold_case: bool,
}

impl TokenIndex {
    #[must_use]
    pub fn new(fold_case: bool) -> Self {
        Self {
            fields: AHashMap::new(),
            fold_case,
        }
    }

    /// Adds every field of a document to the index.
    pub fn add_document(&mut self, id: DocId, doc: &Document) {
        for field in Field::ALL {
            let text = doc.field_text(field);
            if text.is_empty() {
                continue;
            }
            let postings = self.fields.entry(field).or_default();
            for token in tokenize(text, self.fold_case) {
                postings.entry(token).or_default().insert(id.as_u32());
            }
        }
    }

    /// Removes a document from all fields.
    pub fn remove_document(&mut self, id: DocId) {
        for postings in self.fields.values_mut() {
            for bitmap in postings.values_mut() {
                bitmap.remove(id.as_u32());
            }
        }
    }

    /// Processes a query term the way indexed terms were processed.
    #[must_use]
    pub fn process_term(&self, term: &str) -> String {
        if self.fold_case {
            term.to_lowercase()
        } else {
            term.to_string()
        }
    }

    /// Exact whole-word lookup: postings per requested field.
    ///
    /// Returned tuples preserve the order of `fields`, keeping result
    /// encounter order deterministic.
    #[must_use]
    pub fn lookup_word(&self, term: &str, fields: &[Field]) -> Vec<(Field, RoaringBitmap)> {
        let term = self.process_term(term);
        let mut out = Vec::new();
        for field in fields {
            if let Some(bitmap) = self.fields.get(field).and_then(|p| p.get(&term)) {
                if !bitmap.is_empty() {
                    out.push((*field, bitmap.clone()));
                }
            }
        }
        out
    }

    /// Fuzzy lookup: dictionary terms within an edit-distance budget of
    /// the query term, or prefix extensions of it.
    ///
    /// Hits are sorted (field priority, term, id) before returning —
    /// hash-map iteration order must never leak into result ordering.
    #[must_use]
    pub fn lookup_fuzzy(&self, term: &str, fields: &[Field]) -> Vec<FuzzyHit> {
        let term = self.process_term(term);
        let budget = fuzzy_budget(&term);
        let mut hits = Vec::new();

        for field in fields {
            let Some(postings) = self.fields.get(field) else {
                continue;
            };
            for (candidate, bitmap) in postings {
                let edits = if candidate.starts_with(&term) {
                    Some(0)
                } else {
                    levenshtein_within(candidate, &term, budget)
                };
                let Some(edits) = edits else { continue };

                for id in bitmap.iter() {
                    hits.push(FuzzyHit {
                        id: DocId::new(id),
                        field: *field,
                        term: candidate.clone(),
                        edits,
                    });
                }
            }
        }

        hits.sort_by(|a, b| {
            a.field
                .priority()
                .cmp(&b.field.priority())
                .then_with(|| a.term.cmp(&b.term))
                .then_with(|| a.id.as_u32().cmp(&b.id.as_u32()))
        });
        hits
    }

    /// Enumerates dictionary terms starting with `prefix` across the
    /// requested fields, with the number of documents containing each.
    ///
    /// Sorted by document count descending, then term, so suggestion
    /// order is deterministic.
    #[must_use]
    pub fn suggest(&self, prefix: &str, fields: &[Field], cap: usize) -> Vec<(String, u64)> {
        let prefix = self.process_term(prefix);
        if prefix.is_empty() || cap == 0 {
            return Vec::new();
        }

        let mut merged: AHashMap<&str, RoaringBitmap> = AHashMap::new();
        for field in fields {
            let Some(postings) = self.fields.get(field) else {
                continue;
            };
            for (term, bitmap) in postings {
                if term.starts_with(&prefix) {
                    *merged.entry(term.as_str()).or_default() |= bitmap;
                }
            }
        }

        let mut suggestions: Vec<(String, u64)> = merged
            .into_iter()
            .map(|(term, bitmap)| (term.to_string(), bitmap.len()))
            .collect();
        suggestions.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        suggestions.truncate(cap);
        suggestions
    }

    /// Returns the number of unique (field, term) keys indexed.
    #[must_use]
    pub fn term_count(&self) -> usize {
        self.fields.values().map(|m| m.len()).sum()
    }
}

impl std::fmt::Debug for TokenIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIndex")
            .field("fold_case", &self.fold_case)
            .field("term_count", &self.term_count())
            .finish()
    }
}

/// Splits text into maximal alphanumeric/underscore runs.
pub fn tokenize(text: &str, fold_case: bool) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| !t.is_empty())
        .map(move |t| {
            if fold_case {
                t.to_lowercase()
            } else {
                t.to_string()
            }
        })
}

/// Edit-distance budget for a query term: short terms would otherwise
/// match most of the dictionary.
#[must_use]
pub fn fuzzy_budget(term: &str) -> usize {
    if term.chars().count() < 5 {
        1
    } else {
        2
    }
}

/// Banded Levenshtein distance with early exit.
///
/// Returns `None` as soon as the distance provably exceeds
/// `max_distance` (length gap, or a full row above the band).
#[must_use]
pub fn levenshtein_within(s1: &str, s2: &str, max_distance: usize) -> Option<usize> {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    if len1.abs_diff(len2) > max_distance {
        return None;
    }
    if len1 == 0 {
        return Some(len2);
    }
    if len2 == 0 {
        return Some(len1);
    }

    let mut prev = vec![0usize; len2 + 1];
    let mut curr = vec![0usize; len2 + 1];

    for (j, slot) in prev.iter_mut().enumerate() {
        *slot = j;
    }

    for i in 1..=len1 {
        curr[0] = i;
        let mut min_in_row = curr[0];

        for j in 1..=len2 {
            let cost = usize::from(s1_chars[i - 1] != s2_chars[j - 1]);
            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
            min_in_row = min_in_row.min(curr[j]);
        }

        // The minimum over a row never decreases in later rows
        if min_in_row > max_distance {
            return None;
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    if prev[len2] <= max_distance {
        Some(prev[len2])
    } else {
        None
    }
}
