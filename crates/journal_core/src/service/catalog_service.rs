//! Read-only catalog views over the record store.
//!
//! # Responsibility
//! - Derive the sorted/filtered views the public pages and admin screens show.
//! - Never mutate the store; every view is a fresh copy.
//!
//! # Invariants
//! - Archive order is newest first by `(year, month, issue_number)`.
//! - Recent-paper order is newest publication date first; ties keep
//!   insertion order.
//! - Unique authors are keyed by author id; the first copy encountered wins.

use crate::model::author::Author;
use crate::model::paper::Paper;
use crate::model::volume::Volume;
use crate::repo::blob_repo::BlobRepository;
use crate::search::substring::{author_matches, search_volumes, Needle};
use crate::store::record_store::RecordStore;
use std::collections::{BTreeSet, HashSet};

/// One volume with the number of papers it currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub volume: Volume,
    pub paper_count: usize,
}

/// One distinct author with the number of papers crediting them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorEntry {
    pub author: Author,
    pub paper_count: usize,
}

/// Admin dashboard counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub volumes: usize,
    pub papers: usize,
    pub authors: usize,
}

/// Read-only catalog facade borrowing a store.
pub struct CatalogService<'store, R: BlobRepository> {
    store: &'store RecordStore<R>,
}

impl<'store, R: BlobRepository> CatalogService<'store, R> {
    pub fn new(store: &'store RecordStore<R>) -> Self {
        Self { store }
    }

    /// Distinct volume years, newest first.
    pub fn archive_years(&self) -> Vec<i32> {
        self.store
            .volumes()
            .iter()
            .map(|volume| volume.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .rev()
            .collect()
    }

    /// Volumes (optionally of one year), newest first, with paper counts.
    pub fn archive_volumes(&self, year: Option<i32>) -> Vec<ArchiveEntry> {
        let mut volumes = self
            .store
            .volumes()
            .iter()
            .filter(|volume| year.map_or(true, |year| volume.year == year))
            .collect::<Vec<_>>();
        volumes.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));

        volumes
            .into_iter()
            .map(|volume| ArchiveEntry {
                volume: volume.clone(),
                paper_count: self.paper_count(&volume.id),
            })
            .collect()
    }

    /// The newest volume by `(year, month, issue_number)`.
    pub fn latest_volume(&self) -> Option<Volume> {
        self.store
            .volumes()
            .iter()
            .max_by_key(|volume| volume.sort_key())
            .cloned()
    }

    /// Up to `limit` papers, newest publication date first.
    pub fn recent_papers(&self, limit: usize) -> Vec<Paper> {
        let mut papers = self.store.papers().iter().collect::<Vec<_>>();
        papers.sort_by(|a, b| b.publication_date().cmp(&a.publication_date()));
        papers.into_iter().take(limit).cloned().collect()
    }

    /// Volumes whose title or description contains `query`.
    pub fn search_volumes(&self, query: &str) -> Vec<Volume> {
        search_volumes(self.store.volumes(), query)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Distinct authors matching `filter` by name or affiliation.
    ///
    /// A blank filter lists every author.
    pub fn author_directory(&self, filter: &str) -> Vec<AuthorEntry> {
        let needle = Needle::parse(filter);
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for author in self.store.papers().iter().flat_map(|paper| &paper.authors) {
            if !seen.insert(author.id.as_str()) {
                continue;
            }
            if needle
                .as_ref()
                .is_some_and(|needle| !author_matches(author, needle))
            {
                continue;
            }
            entries.push(AuthorEntry {
                author: author.clone(),
                paper_count: self
                    .store
                    .papers()
                    .iter()
                    .filter(|paper| paper.credits_author(&author.id))
                    .count(),
            });
        }

        entries
    }

    pub fn dashboard_stats(&self) -> DashboardStats {
        let authors = self
            .store
            .papers()
            .iter()
            .flat_map(|paper| paper.authors.iter().map(|author| author.id.as_str()))
            .collect::<HashSet<_>>()
            .len();

        DashboardStats {
            volumes: self.store.volumes().len(),
            papers: self.store.papers().len(),
            authors,
        }
    }

    /// Admin paper list filter: title or any author name. Blank lists all.
    pub fn filter_admin_papers(&self, term: &str) -> Vec<Paper> {
        let Some(needle) = Needle::parse(term) else {
            return self.store.papers().to_vec();
        };
        self.store
            .papers()
            .iter()
            .filter(|paper| {
                needle.found_in(&paper.title)
                    || paper
                        .authors
                        .iter()
                        .any(|author| needle.found_in(&author.name))
            })
            .cloned()
            .collect()
    }

    /// Admin volume list filter: title, or the year's digits. Blank lists all.
    pub fn filter_admin_volumes(&self, term: &str) -> Vec<Volume> {
        let Some(needle) = Needle::parse(term) else {
            return self.store.volumes().to_vec();
        };
        self.store
            .volumes()
            .iter()
            .filter(|volume| {
                needle.found_in(&volume.title) || volume.year.to_string().contains(term)
            })
            .cloned()
            .collect()
    }

    fn paper_count(&self, volume_id: &str) -> usize {
        self.store
            .papers()
            .iter()
            .filter(|paper| paper.volume_id == volume_id)
            .count()
    }
}
