//! Admin editing flows on top of the record store.
//!
//! # Responsibility
//! - Turn loosely filled admin forms into valid records before insertion.
//! - Generate ids for new papers, volumes and authors.
//! - Provide keyword/reference editing with dedup-at-insertion semantics.
//!
//! # Invariants
//! - Blank authors, keywords and references are dropped, never stored.
//! - A draft is inserted whole or not at all.

use crate::model::author::Author;
use crate::model::id::{generate_id, IdKind, PaperId};
use crate::model::paper::{normalize_keywords, Paper, PaperPatch};
use crate::model::volume::Volume;
use crate::repo::blob_repo::BlobRepository;
use crate::store::record_store::{RecordStore, StoreError};
use chrono::Local;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorialError {
    /// The draft does not name a volume.
    MissingVolume,
    /// Every author row of the draft was blank.
    NoAuthors,
    Store(StoreError),
}

impl Display for EditorialError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingVolume => write!(f, "please select a volume"),
            Self::NoAuthors => write!(f, "at least one author is required"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EditorialError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for EditorialError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// "New paper" form contents.
///
/// Author rows with a blank `id` get a generated one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPaperDraft {
    pub title: String,
    pub abstract_text: String,
    pub authors: Vec<Author>,
    pub keywords: Vec<String>,
    /// `YYYY-MM-DD`; today's local date when `None` or blank.
    pub publication_date: Option<String>,
    pub volume_id: String,
    pub references: Vec<String>,
    pub full_text: Option<String>,
    pub doi: Option<String>,
    pub image: Option<String>,
}

/// "New volume" form contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewVolumeDraft {
    pub title: String,
    pub description: String,
    /// Defaults to the current volume count plus one.
    pub issue_number: Option<u32>,
    pub year: i32,
    pub month: u8,
    pub image: Option<String>,
}

/// Admin editing facade over a mutable store borrow.
pub struct EditorialService<'store, R: BlobRepository> {
    store: &'store mut RecordStore<R>,
}

impl<'store, R: BlobRepository> EditorialService<'store, R> {
    pub fn new(store: &'store mut RecordStore<R>) -> Self {
        Self { store }
    }

    /// Normalizes `draft` and inserts it as a new paper.
    pub fn create_paper(&mut self, draft: NewPaperDraft) -> Result<Paper, EditorialError> {
        if draft.volume_id.trim().is_empty() {
            return Err(EditorialError::MissingVolume);
        }

        let authors = draft
            .authors
            .into_iter()
            .filter(|author| !author.name.trim().is_empty())
            .map(|mut author| {
                author.name = author.name.trim().to_string();
                if author.id.trim().is_empty() {
                    author.id = generate_id(IdKind::Author);
                }
                author
            })
            .collect::<Vec<_>>();
        if authors.is_empty() {
            return Err(EditorialError::NoAuthors);
        }

        let publication_date = non_blank(draft.publication_date)
            .unwrap_or_else(|| Local::now().date_naive().format("%Y-%m-%d").to_string());

        let mut paper = Paper::new(
            generate_id(IdKind::Paper),
            draft.title,
            draft.abstract_text,
            draft.volume_id,
            publication_date,
        );
        paper.authors = authors;
        paper.keywords = normalize_keywords(&draft.keywords);
        paper.references = draft
            .references
            .iter()
            .map(|reference| reference.trim())
            .filter(|reference| !reference.is_empty())
            .map(str::to_string)
            .collect();
        paper.full_text = non_blank(draft.full_text);
        paper.doi = non_blank(draft.doi);
        paper.image = non_blank(draft.image);

        self.store.add_paper(paper.clone())?;
        info!(
            "event=paper_create module=editorial status=ok paper_id={} authors={} keywords={}",
            paper.id,
            paper.authors.len(),
            paper.keywords.len()
        );
        Ok(paper)
    }

    /// Inserts a new volume with a generated id.
    pub fn create_volume(&mut self, draft: NewVolumeDraft) -> Result<Volume, EditorialError> {
        let issue_number = draft
            .issue_number
            .unwrap_or_else(|| next_issue_number(self.store.volumes().len()));

        let mut volume = Volume::new(
            generate_id(IdKind::Volume),
            draft.title,
            issue_number,
            draft.year,
            draft.month,
            draft.description,
        );
        volume.image = non_blank(draft.image);

        self.store.add_volume(volume.clone())?;
        info!(
            "event=volume_create module=editorial status=ok volume_id={} issue={}",
            volume.id, volume.issue_number
        );
        Ok(volume)
    }

    /// Adds a keyword unless it is blank or already present.
    ///
    /// Returns `Ok(false)` when nothing changed, including unknown papers.
    pub fn add_keyword(&mut self, paper_id: &str, keyword: &str) -> Result<bool, EditorialError> {
        let Some(mut paper) = self.store.get_paper(paper_id).cloned() else {
            return Ok(false);
        };
        if !paper.add_keyword(keyword) {
            return Ok(false);
        }
        self.replace_keywords(&paper.id, paper.keywords)
    }

    /// Removes an exact keyword match.
    pub fn remove_keyword(
        &mut self,
        paper_id: &str,
        keyword: &str,
    ) -> Result<bool, EditorialError> {
        let Some(mut paper) = self.store.get_paper(paper_id).cloned() else {
            return Ok(false);
        };
        if !paper.remove_keyword(keyword) {
            return Ok(false);
        }
        self.replace_keywords(&paper.id, paper.keywords)
    }

    /// Appends a trimmed reference unless it is blank or already cited.
    pub fn add_reference(
        &mut self,
        paper_id: &str,
        reference: &str,
    ) -> Result<bool, EditorialError> {
        let reference = reference.trim();
        let Some(paper) = self.store.get_paper(paper_id) else {
            return Ok(false);
        };
        if reference.is_empty() || paper.references.iter().any(|existing| existing == reference) {
            return Ok(false);
        }

        let mut references = paper.references.clone();
        references.push(reference.to_string());
        let patch = PaperPatch {
            references: Some(references),
            ..PaperPatch::default()
        };
        Ok(self.store.update_paper(paper_id, &patch)?)
    }

    fn replace_keywords(
        &mut self,
        paper_id: &PaperId,
        keywords: Vec<String>,
    ) -> Result<bool, EditorialError> {
        let patch = PaperPatch {
            keywords: Some(keywords),
            ..PaperPatch::default()
        };
        Ok(self.store.update_paper(paper_id, &patch)?)
    }
}

fn next_issue_number(volume_count: usize) -> u32 {
    u32::try_from(volume_count)
        .unwrap_or(u32::MAX - 1)
        .saturating_add(1)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
