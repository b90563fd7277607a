//! Index set management: one index per matching configuration.
//!
//! Case folding, tokenizer strictness and fuzzy tolerance are structural
//! properties of an inverted index, baked in at construction time. The
//! set therefore keeps up to six parallel indexes, keyed by
//! (case sensitivity, match mode), each covering the entire document
//! set, built lazily on first use and torn down together on
//! invalidation.
//!
//! The configuration map doubles as the index cache: rebuilding one
//! configuration never touches the others.

mod token;
mod trigram;

pub use token::{fuzzy_budget, levenshtein_within, tokenize, FuzzyHit, TokenIndex};
pub use trigram::TrigramIndex;

use crate::document::Document;
use crate::error::{IndexError, IndexResult};
use crate::types::{DocId, Field};
use ahash::AHashMap;
use roaring::RoaringBitmap;

/// How an index matches query terms against indexed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Trigram-backed substring containment.
    Substring,
    /// Exact token equality at word boundaries.
    WholeWord,
    /// Edit-distance-tolerant token matching (implies substring-style
    /// matching: a fuzzy query never requires word boundaries).
    Fuzzy,
}

/// Structural configuration of one index instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct IndexConfig {
    pub case_sensitive: bool,
    pub mode: MatchMode,
}

impl IndexConfig {
    /// Deterministic selection from query flags.
    ///
    /// The fuzzy flag takes precedence over whole-word; case sensitivity
    /// is independent of both. This precedence must not change: fuzzy
    /// matching subsumes substring matching, and a whole-word constraint
    /// would contradict edit tolerance.
    #[must_use]
    pub fn select(case_sensitive: bool, whole_word: bool, fuzzy: bool) -> Self {
        let mode = if fuzzy {
            MatchMode::Fuzzy
        } else if whole_word {
            MatchMode::WholeWord
        } else {
            MatchMode::Substring
        };
        Self {
            case_sensitive,
            mode,
        }
    }
}

impl std::fmt::Display for IndexConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let case = if self.case_sensitive { "cs" } else { "ci" };
        let mode = match self.mode {
            MatchMode::Substring => "substring",
            MatchMode::WholeWord => "whole_word",
            MatchMode::Fuzzy => "fuzzy",
        };
        write!(f, "{case}-{mode}")
    }
}

/// One built index instance.
///
/// Substring configurations are trigram-backed; whole-word and fuzzy
/// configurations share the token index structure but are cached under
/// separate keys so each configuration invalidates independently.
pub enum ConfigIndex {
    Token(TokenIndex),
    Trigram(TrigramIndex),
}

impl ConfigIndex {
    fn build(config: IndexConfig, store: &DocStore) -> Self {
        let fold = !config.case_sensitive;
        match config.mode {
            MatchMode::Substring => {
                let mut index = TrigramIndex::new(fold);
                for (id, doc) in store.iter() {
                    index.add_document(id, doc);
                }
                Self::Trigram(index)
            }
            MatchMode::WholeWord | MatchMode::Fuzzy => {
                let mut index = TokenIndex::new(fold);
                for (id, doc) in store.iter() {
                    index.add_document(id, doc);
                }
                Self::Token(index)
            }
        }
    }

    fn add_document(&mut self, id: DocId, doc: &Document) {
        match self {
            Self::Token(index) => index.add_document(id, doc),
            Self::Trigram(index) => index.add_document(id, doc),
        }
    }

    fn remove_document(&mut self, id: DocId) {
        match self {
            Self::Token(index) => index.remove_document(id),
            Self::Trigram(index) => index.remove_document(id),
        }
    }

    /// The token index behind this configuration, if it has one.
    #[must_use]
    pub fn as_token(&self) -> Option<&TokenIndex> {
        match self {
            Self::Token(index) => Some(index),
            Self::Trigram(_) => None,
        }
    }

    /// The trigram index behind this configuration, if it has one.
    #[must_use]
    pub fn as_trigram(&self) -> Option<&TrigramIndex> {
        match self {
            Self::Trigram(index) => Some(index),
            Self::Token(_) => None,
        }
    }
}

/// Owned document set with interned ids.
///
/// `DocId`s are assigned monotonically and never reused, so posting
/// bitmaps from a stale index can never alias a newer document.
#[derive(Default)]
pub struct DocStore {
    docs: AHashMap<DocId, Document>,
    by_path: AHashMap<String, DocId>,
    next_id: u32,
}

impl DocStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, doc: Document) -> IndexResult<DocId> {
        if self.next_id == u32::MAX {
            return Err(IndexError::IdSpaceExhausted);
        }
        let id = DocId::new(self.next_id);
        self.next_id += 1;
        self.by_path.insert(doc.id.clone(), id);
        self.docs.insert(id, doc);
        Ok(id)
    }

    fn remove(&mut self, path: &str) -> Option<DocId> {
        let id = self.by_path.remove(path)?;
        self.docs.remove(&id);
        Some(id)
    }

    #[must_use]
    pub fn get(&self, id: DocId) -> Option<&Document> {
        self.docs.get(&id)
    }

    #[must_use]
    pub fn id_of(&self, path: &str) -> Option<DocId> {
        self.by_path.get(path).copied()
    }

    /// Iterates documents in ascending `DocId` order (insertion order),
    /// so index builds and scans are deterministic.
    pub fn iter(&self) -> impl Iterator<Item = (DocId, &Document)> {
        let mut ids: Vec<DocId> = self.docs.keys().copied().collect();
        ids.sort_by_key(|id| id.as_u32());
        ids.into_iter().map(|id| (id, &self.docs[&id]))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

/// The index set manager: document store plus lazily built indexes.
pub struct IndexSet {
    store: DocStore,
    indexes: AHashMap<IndexConfig, ConfigIndex>,
}

impl Default for IndexSet {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexSet {
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: DocStore::new(),
            indexes: AHashMap::new(),
        }
    }

    /// Wholesale rebuild: replaces the document set and discards every
    /// built index. Later documents win when ids repeat. Succeeds on an
    /// empty set; empty indexes answer with empty results, not errors.
    pub fn build(&mut self, documents: Vec<Document>) -> IndexResult<()> {
        let count = documents.len();

        // Build into a fresh store and swap only on success: a failed
        // rebuild leaves the prior index set visible, never a partial one.
        let mut store = DocStore::new();
        for doc in documents {
            // Upsert semantics within one batch: drop the older copy
            store.remove(&doc.id);
            store.insert(doc)?;
        }

        self.store = store;
        self.indexes.clear();
        tracing::debug!(documents = count, "index set rebuilt");
        Ok(())
    }

    /// Inserts or replaces one document in the store and every built
    /// index. Removing before re-adding is what prevents duplicate
    /// postings from accumulating under repeated edits.
    pub fn upsert(&mut self, doc: Document) -> IndexResult<()> {
        if let Some(old_id) = self.store.remove(&doc.id) {
            for index in self.indexes.values_mut() {
                index.remove_document(old_id);
            }
        }

        let id = self.store.insert(doc)?;
        let doc = &self.store.docs[&id];
        for index in self.indexes.values_mut() {
            index.add_document(id, doc);
        }
        Ok(())
    }

    /// Removes a document from the store and every built index.
    /// No-op when the id was never indexed.
    pub fn remove(&mut self, path: &str) {
        let Some(id) = self.store.remove(path) else {
            return;
        };
        for index in self.indexes.values_mut() {
            index.remove_document(id);
        }
    }

    /// Returns the index for `config`, building it from the store on
    /// first use.
    pub fn ensure(&mut self, config: IndexConfig) -> &ConfigIndex {
        self.indexes.entry(config).or_insert_with(|| {
            tracing::debug!(%config, "building index configuration");
            ConfigIndex::build(config, &self.store)
        })
    }

    /// Returns the index for `config` if it has been built.
    #[must_use]
    pub fn get(&self, config: IndexConfig) -> Option<&ConfigIndex> {
        self.indexes.get(&config)
    }

    /// Discards every built index; the store is kept. The next lookup
    /// of each configuration rebuilds it lazily.
    pub fn invalidate(&mut self) {
        self.indexes.clear();
    }

    #[must_use]
    pub fn store(&self) -> &DocStore {
        &self.store
    }

    /// Built configurations, sorted for deterministic reporting.
    #[must_use]
    pub fn built_configs(&self) -> Vec<IndexConfig> {
        let mut configs: Vec<IndexConfig> = self.indexes.keys().copied().collect();
        configs.sort_by_key(|c| (c.case_sensitive, c.mode as u8));
        configs
    }

    /// Scans stored field text for a substring, bypassing indexes.
    ///
    /// Fallback for queries too short to carry trigrams. Notes are
    /// short, so a linear pass over the corpus is acceptable there.
    #[must_use]
    pub fn scan_substring(
        &self,
        query: &str,
        fields: &[Field],
        case_sensitive: bool,
    ) -> RoaringBitmap {
        let folded;
        let needle = if case_sensitive {
            query
        } else {
            folded = query.to_lowercase();
            &folded
        };

        let mut out = RoaringBitmap::new();
        for (id, doc) in self.store.iter() {
            let hit = fields.iter().any(|&field| {
                let text = doc.field_text(field);
                if case_sensitive {
                    text.contains(needle)
                } else {
                    text.to_lowercase().contains(needle)
                }
            });
            if hit {
                out.insert(id.as_u32());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(path: &str, title: &str, content: &str) -> Document {
        Document {
            id: path.to_string(),
            file_name: path.trim_start_matches('/').to_string(),
            title: title.to_string(),
            description: String::new(),
            tags_text: String::new(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_select_precedence() {
        // Fuzzy wins over whole-word
        let config = IndexConfig::select(false, true, true);
        assert_eq!(config.mode, MatchMode::Fuzzy);

        let config = IndexConfig::select(true, true, false);
        assert_eq!(config.mode, MatchMode::WholeWord);
        assert!(config.case_sensitive);

        let config = IndexConfig::select(false, false, false);
        assert_eq!(config.mode, MatchMode::Substring);
        assert!(!config.case_sensitive);
    }

    #[test]
    fn test_build_empty_set() {
        let mut set = IndexSet::new();
        set.build(Vec::new()).unwrap();

        let index = set.ensure(IndexConfig::select(false, false, false));
        let candidates = index
            .as_trigram()
            .unwrap()
            .search("anything", &[Field::Title])
            .unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_lazy_build_and_invalidate() {
        let mut set = IndexSet::new();
        set.build(vec![doc("/a.md", "Alpha", "")]).unwrap();
        assert!(set.built_configs().is_empty());

        set.ensure(IndexConfig::select(false, false, false));
        assert_eq!(set.built_configs().len(), 1);

        // Building a second configuration leaves the first in place
        set.ensure(IndexConfig::select(false, true, false));
        assert_eq!(set.built_configs().len(), 2);

        set.invalidate();
        assert!(set.built_configs().is_empty());
        assert_eq!(set.store().len(), 1);
    }

    #[test]
    fn test_upsert_replaces_in_built_indexes() {
        let mut set = IndexSet::new();
        set.build(vec![doc("/a.md", "Original title", "")]).unwrap();

        let config = IndexConfig::select(false, true, false);
        set.ensure(config);

        set.upsert(doc("/a.md", "Replacement title", "")).unwrap();

        let index = set.ensure(config).as_token().unwrap();
        assert!(index.lookup_word("original", &[Field::Title]).is_empty());
        assert_eq!(index.lookup_word("replacement", &[Field::Title]).len(), 1);
        assert_eq!(set.store().len(), 1);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let mut set = IndexSet::new();
        let config = IndexConfig::select(false, true, false);
        set.ensure(config);

        set.upsert(doc("/a.md", "Stable", "")).unwrap();
        set.upsert(doc("/a.md", "Stable", "")).unwrap();

        let index = set.ensure(config).as_token().unwrap();
        let hits = index.lookup_word("stable", &[Field::Title]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1.len(), 1);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut set = IndexSet::new();
        set.remove("/never-indexed.md");
        assert!(set.store().is_empty());
    }

    #[test]
    fn test_remove_clears_postings() {
        let mut set = IndexSet::new();
        let config = IndexConfig::select(false, true, false);
        set.upsert(doc("/a.md", "Unique", "")).unwrap();
        set.ensure(config);

        set.remove("/a.md");

        let index = set.ensure(config).as_token().unwrap();
        assert!(index.lookup_word("unique", &[Field::Title]).is_empty());
    }

    #[test]
    fn test_build_dedupes_batch() {
        let mut set = IndexSet::new();
        set.build(vec![
            doc("/a.md", "First version", ""),
            doc("/a.md", "Second version", ""),
        ])
        .unwrap();
        assert_eq!(set.store().len(), 1);

        let id = set.store().id_of("/a.md").unwrap();
        assert_eq!(set.store().get(id).unwrap().title, "Second version");
    }

    #[test]
    fn test_scan_substring_fallback() {
        let mut set = IndexSet::new();
        set.build(vec![
            doc("/a.md", "Go notes", ""),
            doc("/b.md", "Rust notes", ""),
        ])
        .unwrap();

        // Two-byte query, below trigram length
        let hits = set.scan_substring("Go", &[Field::Title], true);
        assert_eq!(hits.len(), 1);

        let hits = set.scan_substring("go", &[Field::Title], false);
        assert_eq!(hits.len(), 1);

        let hits = set.scan_substring("go", &[Field::Title], true);
        assert!(hits.is_empty());
    }
}
