//! Matching-behavior tests: whole-word and fuzzy modes, flag
//! precedence, autocomplete, ranking determinism and snippets.

mod common;

use common::{assert_results_contain, assert_results_not_contain, engine_from};
use notedex::{Scope, SearchCriteria};

#[test]
fn whole_word_excludes_longer_tokens() {
    let mut engine = engine_from(&[
        ("/word.md", "---\ntitle: The art of rust\n---\n"),
        ("/token.md", "---\ntitle: Crustacean cooking\n---\n"),
    ]);

    let substring = engine.search(&SearchCriteria::query("rust"));
    assert_eq!(substring.len(), 2);

    let whole = engine.search(&SearchCriteria::query("rust").whole_word(true));
    assert_eq!(whole.len(), 1);
    assert_results_contain(&whole, "/word.md");
    assert_results_not_contain(&whole, "/token.md");
}

#[test]
fn whole_word_respects_case_sensitivity() {
    let mut engine = engine_from(&[("/a.md", "---\ntitle: Rust notes\n---\n")]);

    let hit = engine.search(
        &SearchCriteria::query("Rust")
            .whole_word(true)
            .case_sensitive(true),
    );
    assert_eq!(hit.len(), 1);

    let miss = engine.search(
        &SearchCriteria::query("rust")
            .whole_word(true)
            .case_sensitive(true),
    );
    assert!(miss.is_empty());
}

#[test]
fn fuzzy_tolerates_single_typo() {
    let mut engine = engine_from(&[("/js.md", "---\ntitle: JavaScript Basics\n---\n")]);

    assert!(engine.search(&SearchCriteria::query("javascrapt")).is_empty());

    let fuzzy = engine.search(&SearchCriteria::query("javascrapt").fuzzy(true));
    assert_eq!(fuzzy.len(), 1);
    assert_eq!(fuzzy[0].id, "/js.md");
}

#[test]
fn fuzzy_budget_scales_with_term_length() {
    let mut engine = engine_from(&[
        ("/cat.md", "---\ntitle: cat\n---\n"),
        ("/configuration.md", "---\ntitle: configuration\n---\n"),
    ]);

    // Short term: one edit allowed, two refused
    assert_eq!(
        engine.search(&SearchCriteria::query("cot").fuzzy(true)).len(),
        1
    );
    assert!(engine
        .search(&SearchCriteria::query("dog").fuzzy(true))
        .is_empty());

    // Long term: two edits allowed
    let results = engine.search(&SearchCriteria::query("confiquratian").fuzzy(true));
    assert_results_contain(&results, "/configuration.md");
}

#[test]
fn fuzzy_takes_precedence_over_whole_word() {
    let mut engine = engine_from(&[("/a.md", "---\ntitle: Programming\n---\n")]);

    // whole-word alone would reject the prefix; fuzzy must win
    let results = engine.search(
        &SearchCriteria::query("program")
            .whole_word(true)
            .fuzzy(true),
    );
    assert_eq!(results.len(), 1);
}

#[test]
fn exact_fuzzy_match_outranks_distant_one() {
    let mut engine = engine_from(&[
        ("/exact.md", "---\ntitle: testing\n---\n"),
        ("/near.md", "---\ntitle: texting\n---\n"),
    ]);

    let results = engine.search(&SearchCriteria::query("testing").fuzzy(true));
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "/exact.md");
    assert!(results[1].score < results[0].score);
}

#[test]
fn autocomplete_caps_and_orders_by_frequency() {
    let mut engine = engine_from(&[
        ("/a.md", "program programming"),
        ("/b.md", "programming progress"),
        ("/c.md", "programming proguard prose protocol"),
    ]);

    let suggestions = engine.autocomplete(&SearchCriteria::query("pro"));
    assert_eq!(suggestions.len(), 5); // capped at the default

    // "programming" appears in all three notes and must rank first
    assert_eq!(suggestions[0].term, "programming");
    assert_eq!(suggestions[0].doc_count, 3);
}

#[test]
fn autocomplete_respects_scope() {
    let mut engine = engine_from(&[(
        "/a.md",
        "---\ntitle: zephyr\n---\nzebra zealot",
    )]);

    let titles = engine.autocomplete(&SearchCriteria::query("ze").with_scope(Scope::Titles));
    let terms: Vec<&str> = titles.iter().map(|s| s.term.as_str()).collect();
    assert!(terms.contains(&"zephyr"));
    assert!(!terms.contains(&"zebra"));
}

#[test]
fn repeated_queries_are_deterministic() {
    let notes: Vec<(String, String)> = (0..20)
        .map(|i| {
            (
                format!("/n{i}.md"),
                format!("---\ntitle: shared topic {i}\n---\nshared body"),
            )
        })
        .collect();
    let borrowed: Vec<(&str, &str)> = notes
        .iter()
        .map(|(p, r)| (p.as_str(), r.as_str()))
        .collect();
    let mut engine = engine_from(&borrowed);

    let first: Vec<String> = engine
        .search(&SearchCriteria::query("shared"))
        .iter()
        .map(|r| r.id.clone())
        .collect();

    for _ in 0..5 {
        let again: Vec<String> = engine
            .search(&SearchCriteria::query("shared"))
            .iter()
            .map(|r| r.id.clone())
            .collect();
        assert_eq!(first, again);
    }
}

#[test]
fn limit_caps_results() {
    let notes: Vec<(String, String)> = (0..30)
        .map(|i| (format!("/n{i}.md"), "---\ntitle: popular\n---\n".to_string()))
        .collect();
    let borrowed: Vec<(&str, &str)> = notes
        .iter()
        .map(|(p, r)| (p.as_str(), r.as_str()))
        .collect();
    let mut engine = engine_from(&borrowed);

    let capped = engine.search(&SearchCriteria::query("popular").with_limit(7));
    assert_eq!(capped.len(), 7);

    // Default cap applies when criteria carry no limit
    let defaulted = engine.search(&SearchCriteria::query("popular"));
    assert_eq!(defaulted.len(), 30.min(50));
}

#[test]
fn snippet_surrounds_match_with_context() {
    let body = format!(
        "{} The needle sits in the middle of a long paragraph. {}",
        "Opening filler sentence repeated for padding. ".repeat(4),
        "Closing filler sentence repeated for padding. ".repeat(4)
    );
    let raw = format!("---\ntitle: Long Note\n---\n{body}");
    let mut engine = engine_from(&[("/long.md", raw.as_str())]);

    let results = engine.search(&SearchCriteria::query("needle"));
    assert_eq!(results.len(), 1);

    let snippet = &results[0].snippet;
    assert!(snippet.contains("needle"));
    // Truncated on both sides of a long body
    assert!(snippet.starts_with('…'));
    assert!(snippet.ends_with('…'));
}

#[test]
fn title_match_produces_title_snippet() {
    let mut engine = engine_from(&[(
        "/t.md",
        "---\ntitle: Snippet Target Here\n---\nbody without the query word",
    )]);

    let results = engine.search(&SearchCriteria::query("target"));
    assert_eq!(results.len(), 1);
    assert!(results[0].snippet.contains("Snippet Target Here"));
}

#[test]
fn scores_are_bounded_and_sorted() {
    let mut engine = engine_from(&[
        ("/best.md", "---\ntitle: ranking\n---\nranking ranking"),
        ("/mid.md", "---\ntitle: other\ndescription: ranking\n---\n"),
        ("/weak.md", "---\ntitle: other\n---\nranking"),
    ]);

    let results = engine.search(&SearchCriteria::query("ranking"));
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].id, "/best.md");
    assert!((results[0].score.as_f64() - 1.0).abs() < f64::EPSILON);

    for window in results.windows(2) {
        assert!(window[0].score >= window[1].score);
    }
    for result in &results {
        let s = result.score.as_f64();
        assert!((0.0..=1.0).contains(&s));
    }
}
