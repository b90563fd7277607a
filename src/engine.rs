//! The search engine facade.
//!
//! Wires the document cache, index set, query planner, result
//! normalizer and snippet extractor behind the handful of operations
//! callers use: `index`, `upsert_document`, `remove_document`,
//! `search`, `autocomplete`, `matches`, `clear_cache`.
//!
//! All operations take `&mut self`: lazy index construction mutates
//! the configuration map, and the design assumes a single logical
//! owner issuing one mutation or query at a time (an editor-style
//! event loop), not a concurrent-safe structure.

use crate::cache::DocumentCache;
use crate::document::Document;
use crate::error::Result;
use crate::index::{IndexConfig, IndexSet, MatchMode};
use crate::query::{QueryPlan, SearchCriteria};
use crate::results::{self, RawHit, SearchResult, Suggestion};
use serde::Serialize;

/// Engine tuning knobs with documented defaults.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Result cap applied when criteria carry no limit.
    pub default_limit: usize,
    /// Autocomplete suggestion cap.
    pub max_suggestions: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_limit: 50,
            max_suggestions: 5,
        }
    }
}

/// Engine statistics for diagnostics and the CLI `stats` command.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    pub documents: usize,
    pub built_indexes: Vec<String>,
    pub cache_entries: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

/// In-memory full-text search engine over a note collection.
pub struct SearchEngine {
    index: IndexSet,
    cache: DocumentCache,
    config: EngineConfig,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            index: IndexSet::new(),
            cache: DocumentCache::new(),
            config,
        }
    }

    /// Full rebuild from an already-normalized document set.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Index` if the document set cannot be
    /// registered; a partially built index set is never left visible.
    pub fn index(&mut self, documents: Vec<Document>) -> Result<()> {
        self.index.build(documents)?;
        Ok(())
    }

    /// Inserts or replaces one document.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Index` if the document cannot be indexed.
    pub fn upsert_document(&mut self, document: Document) -> Result<()> {
        self.index.upsert(document)?;
        Ok(())
    }

    /// Normalizes raw note content (through the parsed-document cache)
    /// and upserts the result.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Index` if the document cannot be indexed.
    pub fn upsert_raw(&mut self, path: &str, raw: &str) -> Result<()> {
        let document = self.cache.get_or_normalize(path, raw);
        self.upsert_document(document)
    }

    /// Removes a document by id. No-op if the id was never indexed.
    pub fn remove_document(&mut self, id: &str) {
        self.index.remove(id);
        self.cache.evict(id);
    }

    /// Runs a full search. Inactive criteria and empty queries yield
    /// an empty list by contract.
    pub fn search(&mut self, criteria: &SearchCriteria) -> Vec<SearchResult> {
        self.search_with_cap(criteria, None)
    }

    fn search_with_cap(
        &mut self,
        criteria: &SearchCriteria,
        cap_override: Option<usize>,
    ) -> Vec<SearchResult> {
        let Some(plan) = QueryPlan::plan(criteria) else {
            return Vec::new();
        };

        let raw = self.lookup(&plan);
        let limit = cap_override.unwrap_or(self.config.default_limit);
        results::normalize(raw, &plan, self.index.store(), limit)
    }

    /// Dispatches the planned lookup to the configured backend and
    /// collects its raw hits.
    fn lookup(&mut self, plan: &QueryPlan) -> Vec<RawHit> {
        self.index.ensure(plan.config);
        let Some(index) = self.index.get(plan.config) else {
            return Vec::new();
        };

        match plan.config.mode {
            MatchMode::Substring => {
                let Some(trigram) = index.as_trigram() else {
                    return Vec::new();
                };
                let candidates = match trigram.search(&plan.raw, plan.fields) {
                    Some(ids) => ids,
                    // Query too short for trigrams: scan stored text
                    None => self
                        .index
                        .scan_substring(&plan.raw, plan.fields, plan.case_sensitive),
                };
                vec![RawHit::Candidates(candidates)]
            }
            MatchMode::WholeWord => {
                let Some(token) = index.as_token() else {
                    return Vec::new();
                };
                let mut hits = Vec::new();
                for term in &plan.terms {
                    for (field, ids) in token.lookup_word(term, plan.fields) {
                        hits.push(RawHit::Postings {
                            field,
                            term: term.clone(),
                            ids,
                        });
                    }
                }
                hits
            }
            MatchMode::Fuzzy => {
                let Some(token) = index.as_token() else {
                    return Vec::new();
                };
                let mut hits = Vec::new();
                for term in &plan.terms {
                    for hit in token.lookup_fuzzy(term, plan.fields) {
                        hits.push(RawHit::Fuzzy(hit));
                    }
                }
                hits
            }
        }
    }

    /// Prefix-based autocomplete over the token dictionary, capped at
    /// `max_suggestions`. Completes the last term of the query.
    pub fn autocomplete(&mut self, criteria: &SearchCriteria) -> Vec<Suggestion> {
        let Some(plan) = QueryPlan::plan(criteria) else {
            return Vec::new();
        };
        let Some(prefix) = plan.terms.last() else {
            return Vec::new();
        };

        // Suggestions come from the whole-word dictionary of the
        // matching case sensitivity; fuzzy/substring flags do not
        // change what a prefix can complete to.
        let config = IndexConfig::select(plan.case_sensitive, true, false);
        self.index.ensure(config);
        let Some(token) = self.index.get(config).and_then(|i| i.as_token()) else {
            return Vec::new();
        };

        token
            .suggest(prefix, plan.fields, self.config.max_suggestions)
            .into_iter()
            .map(|(term, doc_count)| Suggestion { term, doc_count })
            .collect()
    }

    /// Single-document membership test: does this document's id appear
    /// in a full (uncapped) search for the criteria?
    pub fn matches(&mut self, document: &Document, criteria: &SearchCriteria) -> bool {
        self.search_with_cap(criteria, Some(usize::MAX))
            .iter()
            .any(|r| r.id == document.id)
    }

    /// Resets the parsed-document cache and every built index. The
    /// next operation observes a full, consistent lazy rebuild,
    /// never stale partial state.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.index.invalidate();
        tracing::debug!("caches cleared");
    }

    #[must_use]
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            documents: self.index.store().len(),
            built_indexes: self
                .index
                .built_configs()
                .iter()
                .map(ToString::to_string)
                .collect(),
            cache_entries: self.cache.len(),
            cache_hits: self.cache.hits(),
            cache_misses: self.cache.misses(),
        }
    }

    /// Number of indexed documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.store().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.store().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Scope;

    fn engine_with(notes: &[(&str, &str)]) -> SearchEngine {
        let mut engine = SearchEngine::new();
        let documents = notes
            .iter()
            .map(|(path, raw)| Document::normalize(path, raw))
            .collect();
        engine.index(documents).unwrap();
        engine
    }

    #[test]
    fn test_search_empty_engine() {
        let mut engine = SearchEngine::new();
        engine.index(Vec::new()).unwrap();
        assert!(engine.search(&SearchCriteria::query("anything")).is_empty());
    }

    #[test]
    fn test_substring_search_across_fields() {
        let mut engine = engine_with(&[
            ("/js.md", "---\ntitle: JavaScript Basics\n---\nScripting for the web."),
            ("/py.md", "---\ntitle: Python Guide\n---\nNo scripts here."),
        ]);

        let results = engine.search(&SearchCriteria::query("script"));
        assert_eq!(results.len(), 2);
        // Title match ("JavaScript") outranks the content-only match
        assert_eq!(results[0].id, "/js.md");
    }

    #[test]
    fn test_short_query_uses_scan_fallback() {
        let mut engine = engine_with(&[("/go.md", "---\ntitle: Go Notes\n---\nGo is small.")]);

        let results = engine.search(&SearchCriteria::query("Go"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "/go.md");
    }

    #[test]
    fn test_whole_word_search() {
        let mut engine = engine_with(&[
            ("/a.md", "---\ntitle: Rust notes\n---\n"),
            ("/b.md", "---\ntitle: Crustacean life\n---\n"),
        ]);

        let substring = engine.search(&SearchCriteria::query("rust"));
        assert_eq!(substring.len(), 2);

        let whole = engine.search(&SearchCriteria::query("rust").whole_word(true));
        assert_eq!(whole.len(), 1);
        assert_eq!(whole[0].id, "/a.md");
    }

    #[test]
    fn test_fuzzy_overrides_whole_word() {
        let mut engine = engine_with(&[("/a.md", "---\ntitle: JavaScript Basics\n---\n")]);

        // Typo with both flags set: fuzzy wins, the typo still matches
        let criteria = SearchCriteria::query("javascrapt")
            .whole_word(true)
            .fuzzy(true);
        let results = engine.search(&criteria);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_autocomplete_caps_suggestions() {
        let mut engine = engine_with(&[(
            "/a.md",
            "---\ntitle: prog\n---\nprogram programs programming programmer progress proguard",
        )]);

        let suggestions = engine.autocomplete(&SearchCriteria::query("prog"));
        assert_eq!(suggestions.len(), 5);
    }

    #[test]
    fn test_autocomplete_completes_last_term() {
        let mut engine = engine_with(&[("/a.md", "searchable notes about programming")]);

        let suggestions = engine.autocomplete(&SearchCriteria::query("notes prog"));
        assert!(suggestions.iter().any(|s| s.term == "programming"));
    }

    #[test]
    fn test_matches_membership() {
        let mut engine = SearchEngine::new();
        let doc = Document::normalize("/a.md", "---\ntitle: Unique Phrase\n---\n");
        engine.upsert_document(doc.clone()).unwrap();

        assert!(engine.matches(&doc, &SearchCriteria::query("unique")));
        assert!(!engine.matches(&doc, &SearchCriteria::query("absent")));
    }

    #[test]
    fn test_clear_cache_preserves_documents() {
        let mut engine = engine_with(&[("/a.md", "---\ntitle: Persistent\n---\n")]);
        assert_eq!(engine.search(&SearchCriteria::query("persistent")).len(), 1);

        engine.clear_cache();
        assert_eq!(engine.len(), 1);
        // Indexes rebuild lazily and answer identically
        assert_eq!(engine.search(&SearchCriteria::query("persistent")).len(), 1);
    }

    #[test]
    fn test_stats_reports_built_configs() {
        let mut engine = engine_with(&[("/a.md", "note")]);
        assert!(engine.stats().built_indexes.is_empty());

        engine.search(&SearchCriteria::query("note"));
        let stats = engine.stats();
        assert_eq!(stats.documents, 1);
        assert_eq!(stats.built_indexes, vec!["ci-substring".to_string()]);
    }

    #[test]
    fn test_scope_restriction() {
        let mut engine = engine_with(&[
            ("/title.md", "---\ntitle: Programming Patterns\n---\nNothing else."),
            ("/body.md", "---\ntitle: Other Things\n---\nProgramming all day."),
        ]);

        let titles = engine
            .search(&SearchCriteria::query("Programming").with_scope(Scope::Titles));
        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0].id, "/title.md");

        let content = engine
            .search(&SearchCriteria::query("Programming").with_scope(Scope::Content));
        assert_eq!(content.len(), 1);
        assert_eq!(content[0].id, "/body.md");

        let all = engine.search(&SearchCriteria::query("Programming"));
        assert_eq!(all.len(), 2);
    }
}
