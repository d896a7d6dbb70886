//! Paper domain model.
//!
//! # Responsibility
//! - Define the primary content record and its validation rules.
//! - Define [`PaperPatch`] for field-level merges.
//!
//! # Invariants
//! - `title` and `abstract` are non-blank.
//! - At least one author; author ids are unique within one paper.
//! - Keywords are non-blank and contain no exact duplicates.
//! - `publication_date` is an ISO 8601 calendar date (`YYYY-MM-DD`).
//! - `id` never changes once the paper exists.

use crate::model::author::{Author, AuthorValidationError};
use crate::model::id::{PaperId, VolumeId};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid iso date regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Published research article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    pub id: PaperId,
    pub title: String,
    /// Serialized as `abstract`, which is a reserved word in Rust.
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Credit order.
    pub authors: Vec<Author>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub publication_date: String,
    pub volume_id: VolumeId,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Paper validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaperValidationError {
    EmptyId,
    EmptyTitle,
    EmptyAbstract,
    MissingAuthors,
    InvalidAuthor(AuthorValidationError),
    DuplicateAuthor(String),
    EmptyKeyword,
    DuplicateKeyword(String),
    InvalidPublicationDate(String),
    EmptyVolumeId,
}

impl Display for PaperValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "paper id cannot be empty"),
            Self::EmptyTitle => write!(f, "paper title cannot be empty"),
            Self::EmptyAbstract => write!(f, "paper abstract cannot be empty"),
            Self::MissingAuthors => write!(f, "paper requires at least one author"),
            Self::InvalidAuthor(err) => write!(f, "{err}"),
            Self::DuplicateAuthor(id) => write!(f, "author `{id}` is credited twice"),
            Self::EmptyKeyword => write!(f, "keywords cannot be empty"),
            Self::DuplicateKeyword(keyword) => write!(f, "duplicate keyword `{keyword}`"),
            Self::InvalidPublicationDate(value) => {
                write!(f, "publication date `{value}` is not a YYYY-MM-DD date")
            }
            Self::EmptyVolumeId => write!(f, "paper must belong to a volume"),
        }
    }
}

impl Error for PaperValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidAuthor(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AuthorValidationError> for PaperValidationError {
    fn from(value: AuthorValidationError) -> Self {
        Self::InvalidAuthor(value)
    }
}

/// Field-level update for a paper.
///
/// Outer `None` leaves a field untouched. For optional fields the inner
/// `Option` is the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperPatch {
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub authors: Option<Vec<Author>>,
    pub keywords: Option<Vec<String>>,
    pub publication_date: Option<String>,
    pub volume_id: Option<VolumeId>,
    pub references: Option<Vec<String>>,
    pub full_text: Option<Option<String>>,
    pub doi: Option<Option<String>>,
    pub image: Option<Option<String>>,
}

impl PaperPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Paper {
    /// Creates a paper with required scalar fields and empty sequences.
    ///
    /// The result is not valid until at least one author is attached.
    pub fn new(
        id: impl Into<PaperId>,
        title: impl Into<String>,
        abstract_text: impl Into<String>,
        volume_id: impl Into<VolumeId>,
        publication_date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            abstract_text: abstract_text.into(),
            authors: Vec::new(),
            keywords: Vec::new(),
            publication_date: publication_date.into(),
            volume_id: volume_id.into(),
            references: Vec::new(),
            full_text: None,
            doi: None,
            image: None,
        }
    }

    pub fn validate(&self) -> Result<(), PaperValidationError> {
        if self.id.trim().is_empty() {
            return Err(PaperValidationError::EmptyId);
        }
        if self.title.trim().is_empty() {
            return Err(PaperValidationError::EmptyTitle);
        }
        if self.abstract_text.trim().is_empty() {
            return Err(PaperValidationError::EmptyAbstract);
        }
        if self.authors.is_empty() {
            return Err(PaperValidationError::MissingAuthors);
        }

        let mut author_ids = HashSet::new();
        for author in &self.authors {
            author.validate()?;
            if !author_ids.insert(author.id.as_str()) {
                return Err(PaperValidationError::DuplicateAuthor(author.id.clone()));
            }
        }

        let mut keywords = HashSet::new();
        for keyword in &self.keywords {
            if keyword.trim().is_empty() {
                return Err(PaperValidationError::EmptyKeyword);
            }
            if !keywords.insert(keyword.as_str()) {
                return Err(PaperValidationError::DuplicateKeyword(keyword.clone()));
            }
        }

        if self.publication_date().is_none() {
            return Err(PaperValidationError::InvalidPublicationDate(
                self.publication_date.clone(),
            ));
        }
        if self.volume_id.trim().is_empty() {
            return Err(PaperValidationError::EmptyVolumeId);
        }

        Ok(())
    }

    /// Parsed publication date, or `None` when the stored text is malformed.
    pub fn publication_date(&self) -> Option<NaiveDate> {
        parse_publication_date(&self.publication_date)
    }

    /// Returns a copy with `patch` merged over this paper. `id` is preserved.
    pub fn merged(&self, patch: &PaperPatch) -> Paper {
        let mut next = self.clone();
        if let Some(title) = &patch.title {
            next.title.clone_from(title);
        }
        if let Some(abstract_text) = &patch.abstract_text {
            next.abstract_text.clone_from(abstract_text);
        }
        if let Some(authors) = &patch.authors {
            next.authors.clone_from(authors);
        }
        if let Some(keywords) = &patch.keywords {
            next.keywords.clone_from(keywords);
        }
        if let Some(publication_date) = &patch.publication_date {
            next.publication_date.clone_from(publication_date);
        }
        if let Some(volume_id) = &patch.volume_id {
            next.volume_id.clone_from(volume_id);
        }
        if let Some(references) = &patch.references {
            next.references.clone_from(references);
        }
        if let Some(full_text) = &patch.full_text {
            next.full_text.clone_from(full_text);
        }
        if let Some(doi) = &patch.doi {
            next.doi.clone_from(doi);
        }
        if let Some(image) = &patch.image {
            next.image.clone_from(image);
        }
        next
    }

    /// Appends a keyword unless an identical (normalized) one already exists.
    ///
    /// Returns `false` for blank input or duplicates.
    pub fn add_keyword(&mut self, keyword: &str) -> bool {
        let Some(keyword) = normalize_keyword(keyword) else {
            return false;
        };
        if self.keywords.iter().any(|existing| *existing == keyword) {
            return false;
        }
        self.keywords.push(keyword);
        true
    }

    /// Removes an exact keyword match. Returns whether it was present.
    pub fn remove_keyword(&mut self, keyword: &str) -> bool {
        let before = self.keywords.len();
        self.keywords.retain(|existing| existing != keyword);
        self.keywords.len() != before
    }

    pub fn credits_author(&self, author_id: &str) -> bool {
        self.authors.iter().any(|author| author.id == author_id)
    }
}

/// Trims and collapses inner whitespace; `None` for blank input.
pub fn normalize_keyword(raw: &str) -> Option<String> {
    let collapsed = WHITESPACE_RE.replace_all(raw.trim(), " ");
    if collapsed.is_empty() {
        return None;
    }
    Some(collapsed.into_owned())
}

/// Normalizes a keyword list: drops blanks, keeps first occurrence order.
pub fn normalize_keywords<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut keywords = Vec::new();
    for keyword in raw {
        let Some(keyword) = normalize_keyword(keyword.as_ref()) else {
            continue;
        };
        if seen.insert(keyword.clone()) {
            keywords.push(keyword);
        }
    }
    keywords
}

fn parse_publication_date(value: &str) -> Option<NaiveDate> {
    if !ISO_DATE_RE.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}
