//! Parsed-document cache keyed by content hash.
//!
//! Normalizing a note (front-matter parse, field derivation) is pure, so
//! its result can be memoized per path and revalidated with a SHA-256
//! hash of the raw content. Hashing the content, not comparing lengths,
//! is what makes same-length edits invalidate correctly.
//!
//! Invalidation is explicit (`clear`) or implicit on hash mismatch;
//! there is no TTL.

use crate::document::Document;
use ahash::AHashMap;
use sha2::{Digest, Sha256};

/// SHA-256 digest of raw note content.
pub type ContentHash = [u8; 32];

/// Computes the content hash used for cache validation.
#[must_use]
pub fn content_hash(raw: &str) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hasher.finalize().into()
}

#[derive(Debug, Clone)]
struct CacheEntry {
    hash: ContentHash,
    document: Document,
}

/// Memoizes `Document::normalize` per path, validated by content hash.
#[derive(Debug, Default)]
pub struct DocumentCache {
    entries: AHashMap<String, CacheEntry>,
    hits: u64,
    misses: u64,
}

impl DocumentCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached document for `path` when the stored hash matches
    /// the current content; otherwise normalizes, stores, and returns the
    /// fresh document.
    pub fn get_or_normalize(&mut self, path: &str, raw: &str) -> Document {
        let hash = content_hash(raw);

        if let Some(entry) = self.entries.get(path) {
            if entry.hash == hash {
                self.hits += 1;
                return entry.document.clone();
            }
        }

        self.misses += 1;
        let document = Document::normalize(path, raw);
        self.entries.insert(
            path.to_string(),
            CacheEntry {
                hash,
                document: document.clone(),
            },
        );
        document
    }

    /// Drops the entry for one path (document deleted).
    pub fn evict(&mut self, path: &str) {
        self.entries.remove(path);
    }

    /// Drops every entry. Hit/miss counters survive for diagnostics.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses
    }
}
