//! Type-safe newtypes for notedex.
//!
//! These newtypes provide compile-time safety and semantic clarity
//! for core domain concepts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Interned identifier for indexed documents.
///
/// Assigned monotonically as documents enter the store and never reused
/// within an engine's lifetime. Using u32 keeps posting lists compact
/// (roaring bitmaps are keyed by u32) and supports ~4 billion notes,
/// far beyond any realistic collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(pub u32);

impl DocId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.0;
        write!(f, "doc:{id}")
    }
}

impl From<u32> for DocId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<DocId> for u32 {
    fn from(id: DocId) -> Self {
        id.0
    }
}

/// Relevance score in range [0.0, 1.0].
///
/// Saturating constructor ensures scores never exceed bounds,
/// making score merging operations safe.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(f64);

impl Score {
    /// Zero relevance score.
    pub const ZERO: Self = Self(0.0);

    /// Maximum relevance score.
    pub const MAX: Self = Self(1.0);

    /// Creates a new score, saturating to [0.0, 1.0] bounds.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    #[must_use]
    pub const fn as_f64(self) -> f64 {
        self.0
    }

    /// Combines two scores with bounded addition.
    /// The result is clamped to [0.0, 1.0].
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self::new(self.0 + other.0)
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

/// A searchable document field.
///
/// Fields carry fixed relevance boosts: a title match is a stronger
/// signal than a body match. The boost ordering
/// `Title >= FileName >= Description >= Tags >= Content` is relied on
/// by scoring and by best-snippet selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    FileName,
    Description,
    Tags,
    Content,
}

impl Field {
    /// All fields, in descending boost order.
    pub const ALL: [Field; 5] = [
        Field::Title,
        Field::FileName,
        Field::Description,
        Field::Tags,
        Field::Content,
    ];

    /// Relevance weight applied to matches in this field.
    #[must_use]
    pub const fn boost(self) -> f64 {
        match self {
            Field::Title => 10.0,
            Field::FileName => 7.0,
            Field::Description => 5.0,
            Field::Tags => 3.0,
            Field::Content => 1.0,
        }
    }

    /// Priority rank for snippet selection (lower = preferred).
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Field::Title => 0,
            Field::FileName => 1,
            Field::Description => 2,
            Field::Tags => 3,
            Field::Content => 4,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::FileName => "file_name",
            Field::Description => "description",
            Field::Tags => "tags",
            Field::Content => "content",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three-byte trigram for substring indexing.
///
/// Trigrams enable fast substring search by decomposing strings
/// into overlapping 3-byte sequences. For example:
/// "rust" → ["rus", "ust"]
///
/// Finding documents containing "rust" means finding documents that
/// contain ALL of its trigrams; the candidate set is a superset and
/// is verified against stored text downstream.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Trigram(pub [u8; 3]);

impl Trigram {
    #[must_use]
    pub const fn new(bytes: [u8; 3]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 3] {
        &self.0
    }

    /// Extracts all trigrams from a string.
    ///
    /// Returns an iterator over trigrams. Short strings (< 3 bytes)
    /// yield no trigrams.
    pub fn extract(s: &str) -> impl Iterator<Item = Trigram> + '_ {
        let bytes = s.as_bytes();
        bytes.windows(3).map(|w| Trigram([w[0], w[1], w[2]]))
    }
}

impl fmt::Debug for Trigram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Try to display as UTF-8 string if valid
        if let Ok(s) = std::str::from_utf8(&self.0) {
            write!(f, "Trigram({s:?})")
        } else {
            let [a, b, c] = self.0;
            write!(f, "Trigram({a:02x}{b:02x}{c:02x})")
        }
    }
}

impl fmt::Display for Trigram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Ok(s) = std::str::from_utf8(&self.0) {
            write!(f, "{s}")
        } else {
            let [a, b, c] = self.0;
            write!(f, "{a:02x}{b:02x}{c:02x}")
        }
    }
}

// Compile-time assertions for thread safety.
// These ensure Send+Sync remain implemented and catch regressions.
#[cfg(test)]
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}

    // Core newtypes
    assert_send_sync::<DocId>();
    assert_send_sync::<Score>();
    assert_send_sync::<Field>();
    assert_send_sync::<Trigram>();
};
