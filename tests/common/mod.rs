//! Common test utilities for notedex integration tests.
//!
//! Provides corpus builders and assertion helpers shared across test
//! files.

#![allow(dead_code)] // Test utilities may not all be used in every test file

use notedex::{Document, SearchEngine, SearchResult};

/// Normalizes one raw note into a document.
pub fn note(path: &str, raw: &str) -> Document {
    Document::normalize(path, raw)
}

/// Builds an engine over the given (path, raw content) notes.
pub fn engine_from(notes: &[(&str, &str)]) -> SearchEngine {
    let mut engine = SearchEngine::new();
    let documents = notes
        .iter()
        .map(|(path, raw)| Document::normalize(path, raw))
        .collect();
    engine.index(documents).expect("failed to build index");
    engine
}

/// The two-language corpus from the front-matter scenario: one note
/// with well-formed YAML tags, one with a sloppy flow list.
pub fn two_language_corpus() -> SearchEngine {
    engine_from(&[
        (
            "/a.md",
            "---\ntitle: JavaScript Basics\ntags: [programming]\n---\nJavaScript is versatile.",
        ),
        (
            "/b.md",
            "---\ntitle: Python Guide\ntags:[programming]\n---\nPython is great.",
        ),
    ])
}

/// Asserts that results contain a document with the given id.
pub fn assert_results_contain(results: &[SearchResult], id: &str) {
    let found = results.iter().any(|r| r.id == id);
    assert!(
        found,
        "Expected results to contain {:?}, but got: {:?}",
        id,
        results.iter().map(|r| &r.id).collect::<Vec<_>>()
    );
}

/// Asserts that results do NOT contain a document with the given id.
pub fn assert_results_not_contain(results: &[SearchResult], id: &str) {
    let found = results.iter().any(|r| r.id == id);
    assert!(
        !found,
        "Expected results NOT to contain {:?}, but it was found",
        id
    );
}
