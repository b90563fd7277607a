//! Query planning: from caller criteria to index lookup options.
//!
//! The planner is the only place that decides which fields a scope
//! covers, how query terms are processed, and which index configuration
//! serves a request. Everything downstream consumes the resulting
//! `QueryPlan` and never re-derives these decisions.

use crate::index::{tokenize, IndexConfig};
use crate::types::Field;
use serde::{Deserialize, Serialize};

/// Which subset of fields a query is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// File name and title only.
    Titles,
    /// Body, description and tags.
    Content,
    /// Every searchable field.
    #[default]
    All,
}

impl Scope {
    /// Fields covered by this scope, in descending boost order.
    ///
    /// Scope always takes precedence over any explicit field list a
    /// caller might construct.
    #[must_use]
    pub fn fields(self) -> &'static [Field] {
        match self {
            Scope::Titles => &[Field::Title, Field::FileName],
            Scope::Content => &[Field::Description, Field::Tags, Field::Content],
            Scope::All => &Field::ALL,
        }
    }
}

/// Caller-facing search parameters.
///
/// `is_active == false` and empty/whitespace-only queries yield empty
/// results by contract — some tokenizers misbehave on empty input, so
/// the planner refuses to produce a plan before any index is touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub query: String,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub whole_word: bool,
    #[serde(default)]
    pub fuzzy: bool,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl SearchCriteria {
    /// Criteria with default flags for a plain query string.
    #[must_use]
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            scope: Scope::All,
            case_sensitive: false,
            whole_word: false,
            fuzzy: false,
            limit: None,
            is_active: true,
        }
    }

    #[must_use]
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    #[must_use]
    pub fn case_sensitive(mut self, on: bool) -> Self {
        self.case_sensitive = on;
        self
    }

    #[must_use]
    pub fn whole_word(mut self, on: bool) -> Self {
        self.whole_word = on;
        self
    }

    #[must_use]
    pub fn fuzzy(mut self, on: bool) -> Self {
        self.fuzzy = on;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Planned lookup options for one search call.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    /// Index configuration serving this plan.
    pub config: IndexConfig,
    /// Fields to search, in descending boost order.
    pub fields: &'static [Field],
    /// The trimmed query exactly as the caller wrote it. The
    /// case-sensitive post-filter checks this literal, never a folded
    /// variant.
    pub raw: String,
    /// The query processed the way the selected index processes terms
    /// (lower-cased iff case-insensitive), used for substring matching
    /// and match extraction.
    pub literal: String,
    /// Individual query terms for token-based modes, processed like
    /// `literal`, in query order.
    pub terms: Vec<String>,
    /// Requested result cap, when the caller set one.
    pub limit: Option<usize>,
    pub case_sensitive: bool,
    pub whole_word: bool,
    pub fuzzy: bool,
}

impl QueryPlan {
    /// Builds a plan, or `None` when no search should run (inactive
    /// criteria or empty query).
    #[must_use]
    pub fn plan(criteria: &SearchCriteria) -> Option<Self> {
        if !criteria.is_active {
            return None;
        }
        let raw = criteria.query.trim();
        if raw.is_empty() {
            return None;
        }

        let config = IndexConfig::select(
            criteria.case_sensitive,
            criteria.whole_word,
            criteria.fuzzy,
        );

        // Case-insensitive plans fold the query; indexed terms were
        // folded at build time. Case-sensitive plans process neither.
        let literal = if criteria.case_sensitive {
            raw.to_string()
        } else {
            raw.to_lowercase()
        };

        let terms: Vec<String> = tokenize(raw, !criteria.case_sensitive).collect();
        if terms.is_empty() && literal.is_empty() {
            return None;
        }

        Some(Self {
            config,
            fields: criteria.scope.fields(),
            raw: raw.to_string(),
            literal,
            terms,
            limit: criteria.limit,
            case_sensitive: criteria.case_sensitive,
            whole_word: criteria.whole_word,
            fuzzy: criteria.fuzzy,
        })
    }
}
