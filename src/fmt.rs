//! Human-friendly CLI output formatters.
//!
//! Each `fmt_*` function formats one command's output for terminal
//! display. When `color` is true, ANSI escape codes are emitted via
//! `owo_colors`.

use crate::engine::EngineStats;
use crate::results::{SearchResult, Suggestion};
use owo_colors::OwoColorize;
use std::io::{self, Write};

// ── search ──────────────────────────────────────────────────────────────────

pub fn fmt_search(w: &mut impl Write, results: &[SearchResult], color: bool) -> io::Result<()> {
    for result in results {
        let fields: Vec<&str> = result.matches.keys().map(|f| f.as_str()).collect();
        let fields = fields.join("+");

        if color {
            writeln!(
                w,
                "{}  {}  ({:.2} · {})",
                result.id.bold(),
                result.title,
                result.score.as_f64(),
                fields.dimmed()
            )?;
        } else {
            writeln!(
                w,
                "{}  {}  ({:.2} · {})",
                result.id,
                result.title,
                result.score.as_f64(),
                fields
            )?;
        }

        if !result.snippet.is_empty() {
            if color {
                writeln!(w, "  {}", result.snippet.dimmed())?;
            } else {
                writeln!(w, "  {}", result.snippet)?;
            }
        }
    }

    if results.is_empty() {
        writeln!(w, "no matches")?;
    }

    Ok(())
}

// ── suggest ─────────────────────────────────────────────────────────────────

pub fn fmt_suggest(w: &mut impl Write, suggestions: &[Suggestion], color: bool) -> io::Result<()> {
    for s in suggestions {
        if color {
            writeln!(w, "{}  {}", s.term.bold(), format_args!("({})", s.doc_count).dimmed())?;
        } else {
            writeln!(w, "{}  ({})", s.term, s.doc_count)?;
        }
    }

    if suggestions.is_empty() {
        writeln!(w, "no suggestions")?;
    }

    Ok(())
}

// ── stats ───────────────────────────────────────────────────────────────────

pub fn fmt_stats(w: &mut impl Write, stats: &EngineStats, color: bool) -> io::Result<()> {
    let built = if stats.built_indexes.is_empty() {
        "none".to_string()
    } else {
        stats.built_indexes.join(", ")
    };

    if color {
        writeln!(w, "{} {}", "documents:".bold(), stats.documents)?;
        writeln!(w, "{} {}", "indexes:".bold(), built)?;
        writeln!(
            w,
            "{} {} entries ({} hits, {} misses)",
            "cache:".bold(),
            stats.cache_entries,
            stats.cache_hits,
            stats.cache_misses
        )?;
    } else {
        writeln!(w, "documents: {}", stats.documents)?;
        writeln!(w, "indexes: {built}")?;
        writeln!(
            w,
            "cache: {} entries ({} hits, {} misses)",
            stats.cache_entries, stats.cache_hits, stats.cache_misses
        )?;
    }

    Ok(())
}
