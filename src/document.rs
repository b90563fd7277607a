//! Document normalization: raw note text → canonical searchable record.
//!
//! Notes carry optional YAML front matter (`---` fenced) with `title`,
//! `description` and `tags`. Normalization is a pure function of
//! (path, raw content), which is what makes content-hash caching sound.
//!
//! Malformed front matter never fails a document: fields degrade to a
//! filename-derived title and the raw body, so one broken note cannot
//! block searching the rest of the corpus.

use crate::types::Field;
use serde::{Deserialize, Serialize};

/// Canonical searchable record for one note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier: the note's path as given by the caller.
    pub id: String,
    /// Last path component, with searchable separators.
    pub file_name: String,
    pub title: String,
    pub description: String,
    /// Tag list flattened to one searchable string.
    pub tags_text: String,
    /// Body text with the front-matter block stripped.
    pub content: String,
}

impl Document {
    /// Normalizes raw note content into a `Document`.
    ///
    /// Front matter is recognized only when the text starts with a `---`
    /// fence. A note without front matter (or with a fence that never
    /// closes) is indexed whole, title derived from the filename.
    #[must_use]
    pub fn normalize(path: &str, raw: &str) -> Self {
        let file_name = file_name_of(path);

        let (meta, body) = match split_front_matter(raw) {
            Some((block, body)) => (parse_front_matter(block), body),
            None => (FrontMatter::default(), raw),
        };

        let title = match meta.title {
            Some(t) if !t.trim().is_empty() => t.trim().to_string(),
            _ => title_from_file_name(&file_name),
        };

        Self {
            id: path.to_string(),
            file_name,
            title,
            description: meta.description.unwrap_or_default(),
            tags_text: meta.tags.join(" "),
            content: body.trim_start_matches('\n').to_string(),
        }
    }

    /// Returns the text of one searchable field.
    #[must_use]
    pub fn field_text(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::FileName => &self.file_name,
            Field::Description => &self.description,
            Field::Tags => &self.tags_text,
            Field::Content => &self.content,
        }
    }
}

/// Parsed front-matter fields, all optional.
#[derive(Debug, Default)]
struct FrontMatter {
    title: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
}

/// Deserialization target for well-formed YAML front matter.
#[derive(Deserialize)]
struct RawFrontMatter {
    title: Option<String>,
    description: Option<String>,
    #[serde(default)]
    tags: RawTags,
}

/// `tags` may be a sequence or a single scalar.
#[derive(Deserialize, Default)]
#[serde(untagged)]
enum RawTags {
    #[default]
    None,
    One(String),
    Many(Vec<String>),
}

impl From<RawTags> for Vec<String> {
    fn from(tags: RawTags) -> Self {
        match tags {
            RawTags::None => Vec::new(),
            RawTags::One(t) => vec![t],
            RawTags::Many(ts) => ts,
        }
    }
}

/// Splits `raw` into (front-matter block, body) when a `---` fence opens
/// the note and a closing fence exists. The fences themselves are
/// excluded from both parts.
fn split_front_matter(raw: &str) -> Option<(&str, &str)> {
    let rest = raw.strip_prefix("---")?;
    let rest = rest.strip_prefix('\n').or_else(|| {
        rest.strip_prefix("\r\n")
    })?;

    for (offset, line) in line_spans(rest) {
        if line.trim_end() == "---" {
            let block = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((block, body));
        }
    }
    None
}

/// Iterates lines with their byte offsets, newline included in `line`.
fn line_spans(s: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0;
    std::iter::from_fn(move || {
        if offset >= s.len() {
            return None;
        }
        let rest = &s[offset..];
        let len = rest.find('\n').map_or(rest.len(), |i| i + 1);
        let span = (offset, &rest[..len]);
        offset += len;
        Some(span)
    })
}

/// Parses a front-matter block, best effort.
///
/// Strict YAML first; on failure a lenient line scan recovers `key: value`
/// pairs so that sloppy-but-obvious metadata (e.g. `tags:[a, b]` with no
/// space after the colon) still produces searchable fields.
fn parse_front_matter(block: &str) -> FrontMatter {
    if let Ok(raw) = serde_yaml::from_str::<RawFrontMatter>(block) {
        return FrontMatter {
            title: raw.title,
            description: raw.description,
            tags: raw.tags.into(),
        };
    }
    lenient_scan(block)
}

/// Line-based fallback for front matter that strict YAML rejects.
fn lenient_scan(block: &str) -> FrontMatter {
    let mut meta = FrontMatter::default();

    for line in block.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "title" => meta.title = non_empty(unquote(value)),
            "description" => meta.description = non_empty(unquote(value)),
            "tags" => meta.tags = scan_tags(value),
            _ => {}
        }
    }

    meta
}

/// Parses a lenient tag value: `[a, b]`, `a, b`, or a bare scalar.
fn scan_tags(value: &str) -> Vec<String> {
    let inner = value
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']');

    inner
        .split(',')
        .map(|t| unquote(t.trim()).to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| s.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(s)
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn file_name_of(path: &str) -> String {
    path.rsplit(['/', '\\'])
        .next()
        .unwrap_or(path)
        .to_string()
}

/// Derives a human-readable title from a file name:
/// extension stripped, separators replaced by spaces.
fn title_from_file_name(file_name: &str) -> String {
    let stem = file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _)| stem);
    stem.replace(['-', '_'], " ").trim().to_string()
}
