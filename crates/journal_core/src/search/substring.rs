//! Case-insensitive substring matching.
//!
//! # Invariants
//! - Blank (empty or whitespace-only) queries match nothing.
//! - Non-blank queries are matched verbatim after lowercasing; no trimming,
//!   no tokenization, so one- and two-character queries still match.
//! - Results keep the relative order of the input slice.

use crate::model::author::Author;
use crate::model::id::VolumeId;
use crate::model::paper::Paper;
use crate::model::volume::Volume;

/// Lowercased, non-blank query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Needle(String);

impl Needle {
    /// Returns `None` for blank queries.
    pub fn parse(query: &str) -> Option<Self> {
        if query.trim().is_empty() {
            return None;
        }
        Some(Self(query.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive containment check.
    pub fn found_in(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(self.0.as_str())
    }
}

/// Options for paper search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperSearchQuery {
    /// Raw query text as typed by the user.
    pub text: String,
    /// Restricts hits to one volume.
    pub volume_id: Option<VolumeId>,
    /// Caps the number of hits. `None` returns all.
    pub limit: Option<usize>,
}

impl PaperSearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            volume_id: None,
            limit: None,
        }
    }
}

/// Title, abstract, any author name, or any keyword.
pub fn paper_matches(paper: &Paper, needle: &Needle) -> bool {
    needle.found_in(&paper.title)
        || needle.found_in(&paper.abstract_text)
        || paper.authors.iter().any(|author| needle.found_in(&author.name))
        || paper.keywords.iter().any(|keyword| needle.found_in(keyword))
}

/// Title or description.
pub fn volume_matches(volume: &Volume, needle: &Needle) -> bool {
    needle.found_in(&volume.title) || needle.found_in(&volume.description)
}

/// Name or affiliation.
pub fn author_matches(author: &Author, needle: &Needle) -> bool {
    needle.found_in(&author.name) || needle.found_in(&author.affiliation)
}

/// Filters `papers` by `query`, preserving input order.
pub fn search_papers<'a>(papers: &'a [Paper], query: &PaperSearchQuery) -> Vec<&'a Paper> {
    let Some(needle) = Needle::parse(&query.text) else {
        return Vec::new();
    };
    if query.limit == Some(0) {
        return Vec::new();
    }

    let hits = papers
        .iter()
        .filter(|paper| {
            query
                .volume_id
                .as_ref()
                .map_or(true, |volume_id| paper.volume_id == *volume_id)
        })
        .filter(|paper| paper_matches(paper, &needle));

    match query.limit {
        Some(limit) => hits.take(limit).collect(),
        None => hits.collect(),
    }
}

/// Filters `volumes` by title/description, preserving input order.
pub fn search_volumes<'a>(volumes: &'a [Volume], query: &str) -> Vec<&'a Volume> {
    let Some(needle) = Needle::parse(query) else {
        return Vec::new();
    };
    volumes
        .iter()
        .filter(|volume| volume_matches(volume, &needle))
        .collect()
}
