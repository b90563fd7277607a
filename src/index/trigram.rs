//! Per-field trigram index for substring search.
//!
//! Trigrams enable finding documents containing any substring, not just
//! word boundaries like a token index. Searching "script" finds notes
//! with "JavaScript", "scripting", etc.
//!
//! The candidate set (documents containing ALL query trigrams) is a
//! superset of the true matches; callers verify candidates against the
//! stored field text before scoring.

use crate::document::Document;
use crate::types::{DocId, Field, Trigram};
use ahash::AHashMap;
use roaring::RoaringBitmap;

/// In-memory trigram index using RoaringBitmaps, one posting map per field.
///
/// Case folding is baked in at construction: a case-insensitive index
/// lower-cases text before extracting trigrams, a case-sensitive one
/// indexes bytes as-is. This is why the index set keeps parallel
/// instances instead of one parameterized index.
pub struct TrigramIndex {
    fields: AHashMap<Field, AHashMap<Trigram, RoaringBitmap>>,
    fold_case: bool,
}

impl TrigramIndex {
    /// Creates an empty trigram index.
    ///
    /// `fold_case` controls whether text is lower-cased before trigram
    /// extraction.
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
            let folded;
            let text = if self.fold_case {
                folded = text.to_lowercase();
                &folded
            } else {
                text
            };

            let postings = self.fields.entry(field).or_default();
            for trigram in Trigram::extract(text) {
                postings.entry(trigram).or_default().insert(id.as_u32());
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

    /// Searches for documents whose `fields` contain the query substring.
    ///
    /// Returns the union over `fields` of documents containing ALL the
    /// query's trigrams in that field. For queries shorter than 3 bytes
    /// there are no trigrams to intersect; returns `None` and the caller
    /// falls back to scanning stored text.
    #[must_use]
    pub fn search(&self, query: &str, fields: &[Field]) -> Option<RoaringBitmap> {
        let folded;
        let query = if self.fold_case {
            folded = query.to_lowercase();
            &folded
        } else {
            query
        };

        let trigrams: Vec<_> = Trigram::extract(query).collect();
        if trigrams.is_empty() {
            return None; // Query too short for trigram filtering
        }

        let mut result = RoaringBitmap::new();
        for field in fields {
            if let Some(candidates) = self.search_field(*field, &trigrams) {
                result |= candidates;
            }
        }
        Some(result)
    }

    /// ANDs the trigram bitmaps of one field.
    fn search_field(&self, field: Field, trigrams: &[Trigram]) -> Option<RoaringBitmap> {
        let postings = self.fields.get(&field)?;

        let mut result = postings.get(&trigrams[0])?.clone();
        for trigram in &trigrams[1..] {
            let bitmap = postings.get(trigram)?;
            result &= bitmap;
            if result.is_empty() {
                return None;
            }
        }
        Some(result)
    }

    /// Returns the number of unique (field, trigram) keys indexed.
    #[must_use]
    pub fn trigram_count(&self) -> usize {
        self.fields.values().map(|m| m.len()).sum()
    }

    /// Returns total document references across all trigrams.
    #[must_use]
    pub fn total_refs(&self) -> u64 {
        self.fields
            .values()
            .flat_map(|m| m.values())
            .map(RoaringBitmap::len)
            .sum()
    }
}

impl std::fmt::Debug for TrigramIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrigramIndex")
            .field("fold_case", &self.fold_case)
            .field("trigram_count", &self.trigram_count())
            .field("total_refs", &self.total_refs())
            .finish()
    }
}
