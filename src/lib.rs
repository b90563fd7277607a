//! notedex: field-weighted full-text search core for note collections.
//!
//! This library indexes a mutable set of short text documents (notes
//! and prompts with optional title, description, tags and body) and
//! answers interactive queries using:
//! - Per-field trigram indexing for substring search
//! - Per-field token indexing for whole-word and fuzzy search
//! - Deterministic field-weighted scoring with context snippets
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │             SearchEngine facade             │
//! │ index, upsert, remove, search, autocomplete │
//! └──────┬──────────────────────┬───────────────┘
//!        │                      │
//! ┌──────▼───────┐      ┌───────▼───────┐
//! │  Document    │      │ Query Planner │
//! │  Normalizer  │      │ scope/boosts/ │
//! │  + cache     │      │ term folding  │
//! └──────┬───────┘      └───────┬───────┘
//!        │                      │
//! ┌──────▼──────────────────────▼───────────────┐
//! │               Index Set Manager              │
//! │   (case × mode) → lazily built indexes       │
//! │  ┌─────────┐  ┌─────────┐  ┌──────────┐      │
//! │  │ Trigram │  │  Token  │  │  Store   │      │
//! │  │substring│  │word/fuzz│  │   scan   │      │
//! │  └────┬────┘  └────┬────┘  └────┬─────┘      │
//! └───────┼────────────┼────────────┼────────────┘
//!         │            │            │
//! ┌───────▼────────────▼────────────▼────────────┐
//! │   Result Normalizer + Snippet Extractor      │
//! │  dedupe, merge, post-filter, rank, excerpt   │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The core performs no I/O and no internal parallelism: callers hand
//! it already-read content strings and own all serialization of
//! mutations against queries.

pub mod cache;
pub mod document;
pub mod engine;
pub mod error;
pub mod fmt;
pub mod index;
pub mod query;
pub mod results;
pub mod snippet;

mod types;

pub use document::Document;
pub use engine::{EngineConfig, EngineStats, SearchEngine};
pub use error::{EngineError, Result};
pub use query::{Scope, SearchCriteria};
pub use results::{SearchResult, Suggestion};
pub use snippet::MatchRecord;
pub use types::{DocId, Field, Score, Trigram};
