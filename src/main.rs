//! notedex: field-weighted full-text search for note collections.
//!
//! Usage:
//!   notedex search <query> --root <dir>     # Ranked full-text search
//!   notedex suggest <prefix> --root <dir>   # Autocomplete suggestions
//!   notedex stats --root <dir>              # Corpus statistics
//!
//! The binary owns all file I/O: it walks the notes directory, reads
//! files (in parallel), and hands already-read strings to the engine.

use anyhow::Context;
use clap::{Parser, Subcommand};
use ignore::WalkBuilder;
use notedex::{fmt, Document, Scope, SearchCriteria, SearchEngine};
use rayon::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Note file extensions recognized by the walker.
const NOTE_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// Files above this size are skipped; notes are short by definition.
const MAX_NOTE_SIZE: u64 = 1024 * 1024;

#[derive(Parser)]
#[command(name = "notedex")]
#[command(about = "Field-weighted full-text search for note collections")]
#[command(version)]
struct Cli {
    /// Root directory containing notes
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Disable ANSI colors
    #[arg(long)]
    no_color: bool,

    /// Emit JSON instead of human-readable output
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search notes by query
    Search {
        /// Search query
        query: String,

        /// Maximum results
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Search scope: titles, content, or all
        #[arg(short, long, default_value = "all")]
        scope: String,

        /// Match exact case only
        #[arg(long)]
        case_sensitive: bool,

        /// Match whole words only
        #[arg(long)]
        whole_word: bool,

        /// Tolerate small typos
        #[arg(long)]
        fuzzy: bool,
    },

    /// Suggest term completions for a prefix
    Suggest {
        /// Term prefix
        prefix: String,
    },

    /// Show corpus statistics
    Stats,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Log to stderr only; stdout carries results
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("notedex=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let root = cli.root.canonicalize().unwrap_or(cli.root.clone());
    let engine = build_engine(&root)?;

    run(engine, cli)
}

fn run(mut engine: SearchEngine, cli: Cli) -> anyhow::Result<()> {
    let color = !cli.no_color;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Search {
            query,
            limit,
            scope,
            case_sensitive,
            whole_word,
            fuzzy,
        } => {
            let criteria = SearchCriteria::query(query)
                .with_scope(parse_scope(&scope)?)
                .case_sensitive(case_sensitive)
                .whole_word(whole_word)
                .fuzzy(fuzzy)
                .with_limit(limit);

            let results = engine.search(&criteria);
            if cli.json {
                serde_json::to_writer_pretty(&mut out, &results)?;
                writeln!(out)?;
            } else {
                fmt::fmt_search(&mut out, &results, color)?;
            }
        }

        Commands::Suggest { prefix } => {
            let suggestions = engine.autocomplete(&SearchCriteria::query(prefix));
            if cli.json {
                serde_json::to_writer_pretty(&mut out, &suggestions)?;
                writeln!(out)?;
            } else {
                fmt::fmt_suggest(&mut out, &suggestions, color)?;
            }
        }

        Commands::Stats => {
            let stats = engine.stats();
            if cli.json {
                serde_json::to_writer_pretty(&mut out, &stats)?;
                writeln!(out)?;
            } else {
                fmt::fmt_stats(&mut out, &stats, color)?;
            }
        }
    }

    Ok(())
}

/// Walks the notes directory, reads note files in parallel, and builds
/// an engine over the normalized documents.
fn build_engine(root: &Path) -> anyhow::Result<SearchEngine> {
    let paths = collect_notes(root)?;
    tracing::info!(notes = paths.len(), root = %root.display(), "indexing");

    let documents: Vec<Document> = paths
        .par_iter()
        .filter_map(|path| {
            // Skip unreadable or non-UTF-8 files rather than failing the run
            let raw = std::fs::read_to_string(path).ok()?;
            Some(Document::normalize(&path.to_string_lossy(), &raw))
        })
        .collect();

    let mut engine = SearchEngine::new();
    engine
        .index(documents)
        .context("failed to build search index")?;
    Ok(engine)
}

/// Collects note files under `root`, honoring gitignore rules.
fn collect_notes(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    let walker = WalkBuilder::new(root)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .build();

    for entry in walker.filter_map(Result::ok) {
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if !NOTE_EXTENSIONS.contains(&ext.as_str()) {
            continue;
        }

        if let Ok(metadata) = std::fs::metadata(path) {
            if metadata.len() > MAX_NOTE_SIZE {
                continue;
            }
        }

        paths.push(path.to_path_buf());
    }

    paths.sort();
    Ok(paths)
}

fn parse_scope(scope: &str) -> anyhow::Result<Scope> {
    match scope {
        "titles" => Ok(Scope::Titles),
        "content" => Ok(Scope::Content),
        "all" => Ok(Scope::All),
        other => anyhow::bail!("unknown scope {other:?} (expected titles, content, or all)"),
    }
}
