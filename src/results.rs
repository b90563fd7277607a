//! Result normalization: heterogeneous raw hits → ranked search results.
//!
//! The three lookup backends produce three hit shapes: bare candidate
//! bitmaps (trigram/scan), per-(field, term) postings (whole word), and
//! fuzzy hit objects. They are resolved here, once; nothing downstream
//! branches on engine-specific shapes.
//!
//! Deduplication is by document id: multi-field hits merge their match
//! maps (union of matched terms per field) and keep the maximum score.
//! Ordering is deterministic (descending score, ties broken by
//! first-encounter order), so identical queries on an unchanged index
//! always return the same list.

use crate::index::{DocStore, FuzzyHit};
use crate::query::QueryPlan;
use crate::snippet::{self, MatchRecord};
use crate::types::{DocId, Field, Score};
use ahash::AHashMap;
use regex::Regex;
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A raw hit as produced by one of the lookup backends.
#[derive(Debug)]
pub enum RawHit {
    /// Unverified candidate ids (trigram superset or scan result).
    Candidates(RoaringBitmap),
    /// Exact whole-word postings for one field and term.
    Postings {
        field: Field,
        term: String,
        ids: RoaringBitmap,
    },
    /// One fuzzy dictionary hit.
    Fuzzy(FuzzyHit),
}

/// One ranked search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Stable document id (the note's path).
    pub id: String,
    pub file_name: String,
    pub title: String,
    /// Normalized relevance in [0, 1], comparable within one query.
    pub score: Score,
    /// Matched terms per field.
    pub matches: BTreeMap<Field, Vec<String>>,
    /// Field-level match records with positions and contexts.
    pub records: Vec<MatchRecord>,
    /// Best display excerpt for this result.
    pub snippet: String,
}

/// An autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub term: String,
    /// Number of documents containing the term.
    pub doc_count: u64,
}

/// Per-document accumulator, kept in first-encounter order.
struct Builder {
    doc_id: DocId,
    raw_score: f64,
    matches: BTreeMap<Field, Vec<String>>,
    records: Vec<MatchRecord>,
}

impl Builder {
    fn new(doc_id: DocId) -> Self {
        Self {
            doc_id,
            raw_score: 0.0,
            matches: BTreeMap::new(),
            records: Vec::new(),
        }
    }

    /// Merges one field contribution: the result keeps the maximum
    /// score seen for this document, never a sum. Multiple field
    /// matches refine relevance, they do not stack it.
    fn merge_score(&mut self, contribution: f64) {
        self.raw_score = self.raw_score.max(contribution);
    }

    fn add_term(&mut self, field: Field, term: &str) {
        let terms = self.matches.entry(field).or_default();
        if !terms.iter().any(|t| t == term) {
            terms.push(term.to_string());
        }
    }
}

/// Accumulates builders while preserving first-encounter order.
#[derive(Default)]
struct Accumulator {
    order: Vec<Builder>,
    index_of: AHashMap<u32, usize>,
}

impl Accumulator {
    fn entry(&mut self, id: DocId) -> &mut Builder {
        let slot = match self.index_of.get(&id.as_u32()) {
            Some(&slot) => slot,
            None => {
                self.order.push(Builder::new(id));
                let slot = self.order.len() - 1;
                self.index_of.insert(id.as_u32(), slot);
                slot
            }
        };
        &mut self.order[slot]
    }
}

/// Normalizes raw hits into a deduplicated, sorted, score-normalized
/// result list.
///
/// Returns an empty list (never an error) when the hits are all
/// false positives or a post-filter pattern cannot be built; the
/// latter is reported as a diagnostic (interactive search stays
/// resilient to pathological queries).
#[must_use]
pub fn normalize(
    raw: Vec<RawHit>,
    plan: &QueryPlan,
    store: &DocStore,
    default_limit: usize,
) -> Vec<SearchResult> {
    let mut acc = Accumulator::default();
    let mut word_patterns: AHashMap<String, Regex> = AHashMap::new();

    for hit in raw {
        match hit {
            RawHit::Candidates(ids) => {
                resolve_candidates(&mut acc, &ids, plan, store);
            }
            RawHit::Postings { field, term, ids } => {
                if !word_patterns.contains_key(&term) {
                    match word_pattern(&term, plan.case_sensitive) {
                        Ok(re) => {
                            word_patterns.insert(term.clone(), re);
                        }
                        Err(err) => {
                            tracing::warn!(
                                term = %term,
                                error = %err,
                                "word-boundary pattern failed; returning no results"
                            );
                            return Vec::new();
                        }
                    }
                }
                resolve_postings(&mut acc, field, &term, &ids, &word_patterns[&term], store);
            }
            RawHit::Fuzzy(hit) => {
                resolve_fuzzy(&mut acc, &hit, plan, store);
            }
        }
    }

    finish(acc, plan, store, default_limit)
}

/// Verifies trigram candidates against stored field text and scores the
/// survivors. A candidate with no verified field is a false positive
/// of the trigram superset and contributes nothing.
fn resolve_candidates(
    acc: &mut Accumulator,
    ids: &RoaringBitmap,
    plan: &QueryPlan,
    store: &DocStore,
) {
    for raw_id in ids.iter() {
        let id = DocId::new(raw_id);
        let Some(doc) = store.get(id) else { continue };

        let mut verified: Vec<(Field, Vec<MatchRecord>)> = Vec::new();
        for &field in plan.fields {
            let records = snippet::extract_field_matches(
                field,
                doc.field_text(field),
                &plan.literal,
                plan.case_sensitive,
            );
            if !records.is_empty() {
                verified.push((field, records));
            }
        }
        if verified.is_empty() {
            continue;
        }

        let builder = acc.entry(id);
        for (field, records) in verified {
            builder.merge_score(field.boost() * records.len() as f64);
            builder.add_term(field, &plan.literal);
            builder.records.extend(records);
        }
    }
}

/// Resolves exact whole-word postings. The word-boundary pattern both
/// locates occurrences for match records and acts as the whole-word
/// post-filter: a posting whose field text yields no boundary match is
/// discarded.
fn resolve_postings(
    acc: &mut Accumulator,
    field: Field,
    term: &str,
    ids: &RoaringBitmap,
    pattern: &Regex,
    store: &DocStore,
) {
    for raw_id in ids.iter() {
        let id = DocId::new(raw_id);
        let Some(doc) = store.get(id) else { continue };

        let text = doc.field_text(field);
        let records: Vec<MatchRecord> = pattern
            .find_iter(text)
            .map(|m| MatchRecord {
                field,
                position: m.start(),
                length: m.end() - m.start(),
                context: snippet::extract_context(text, m.start(), m.end()),
            })
            .collect();
        if records.is_empty() {
            continue;
        }

        let builder = acc.entry(id);
        builder.merge_score(field.boost() * records.len() as f64);
        builder.add_term(field, term);
        builder.records.extend(records);
    }
}

/// Resolves one fuzzy hit: scores by edit distance and locates the
/// matched dictionary term for context. Position falls back to 0 when
/// the term cannot be located (the index reported no offset).
fn resolve_fuzzy(acc: &mut Accumulator, hit: &FuzzyHit, plan: &QueryPlan, store: &DocStore) {
    let Some(doc) = store.get(hit.id) else { return };
    let text = doc.field_text(hit.field);

    let mut records =
        snippet::extract_field_matches(hit.field, text, &hit.term, plan.case_sensitive);
    if records.is_empty() {
        records.push(MatchRecord {
            field: hit.field,
            position: 0,
            length: hit.term.len(),
            context: snippet::extract_context(text, 0, 0),
        });
    }

    let weight = 1.0 / (1.0 + hit.edits as f64);
    let builder = acc.entry(hit.id);
    builder.merge_score(hit.field.boost() * weight);
    builder.add_term(hit.field, &hit.term);
    builder.records.extend(records);
}

/// Applies post-filters, sorts, truncates and normalizes scores.
fn finish(
    acc: Accumulator,
    plan: &QueryPlan,
    store: &DocStore,
    default_limit: usize,
) -> Vec<SearchResult> {
    let mut builders = acc.order;

    // Case-sensitive post-filter: the literal query (or, for token
    // modes, one of its terms) must appear with exact case in the
    // title, file name, or a match context. Guards against backends
    // that tokenize case-sensitively but report false positives under
    // multi-byte normalization.
    if plan.case_sensitive {
        let mut needles: Vec<&str> = vec![plan.raw.as_str()];
        needles.extend(plan.terms.iter().map(String::as_str));

        builders.retain(|b| {
            let Some(doc) = store.get(b.doc_id) else {
                return false;
            };
            needles.iter().any(|needle| {
                doc.title.contains(needle)
                    || doc.file_name.contains(needle)
                    || b.records.iter().any(|r| r.context.contains(needle))
            })
        });
    }

    // Stable sort keeps first-encounter order on ties.
    builders.sort_by(|a, b| {
        b.raw_score
            .partial_cmp(&a.raw_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let max_raw = builders
        .first()
        .map(|b| b.raw_score)
        .filter(|s| *s > 0.0)
        .unwrap_or(1.0);

    let limit = plan.limit.unwrap_or(default_limit);
    builders.truncate(limit);

    builders
        .into_iter()
        .filter_map(|builder| {
            let doc = store.get(builder.doc_id)?;
            let snippet =
                snippet::best_snippet(&builder.records, &plan.literal, plan.case_sensitive);
            Some(SearchResult {
                id: doc.id.clone(),
                file_name: doc.file_name.clone(),
                title: doc.title.clone(),
                score: Score::new(builder.raw_score / max_raw),
                matches: builder.matches,
                records: builder.records,
                snippet,
            })
        })
        .collect()
}

/// Builds the word-boundary pattern used for whole-word verification.
fn word_pattern(term: &str, case_sensitive: bool) -> Result<Regex, regex::Error> {
    let flags = if case_sensitive { "" } else { "(?i)" };
    Regex::new(&format!(r"{flags}\b{}\b", regex::escape(term)))
}
