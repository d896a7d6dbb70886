//! Record store over papers and volumes.
//!
//! # Responsibility
//! - Provide CRUD, cascade delete and substring search over both collections.
//! - Load the initial state from blobs, or from the seed dataset when the
//!   blobs are missing or unparsable.
//! - Re-serialize an affected collection after every successful mutation.
//!
//! # Invariants
//! - Ids are unique within each collection; `add_*` rejects collisions.
//! - Every record added or updated through the store passes its
//!   `validate()`. Loaded records are kept even when they do not.
//! - A paper can only be added (or moved) into an existing volume.
//! - `delete_volume` removes the volume's papers and the volume before
//!   returning, and writes both blobs in one `put_many` call.
//! - Update/delete of an unknown id is a no-op reported as `false`.

use crate::config::StoreOptions;
use crate::model::author::{AuthorPatch, AuthorValidationError};
use crate::model::id::{IdKind, VolumeId};
use crate::model::paper::{Paper, PaperPatch, PaperValidationError};
use crate::model::volume::{Volume, VolumePatch, VolumeValidationError};
use crate::repo::blob_repo::BlobRepository;
use crate::search::substring::{search_papers, PaperSearchQuery};
use crate::store::seed::{seed_papers, seed_volumes};
use crate::store::snapshot::{
    encode_papers, encode_volumes, load_snapshot, SnapshotDocument, PAPERS_KEY, VOLUMES_KEY,
};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Rejected store mutation. The in-memory state is unchanged when returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    InvalidPaper(PaperValidationError),
    InvalidVolume(VolumeValidationError),
    InvalidAuthor(AuthorValidationError),
    DuplicateId { kind: IdKind, id: String },
    /// A paper names a volume that does not exist.
    UnknownVolume(VolumeId),
    /// Only raised with `enforce_unique_issue_numbers`.
    DuplicateIssueNumber(u32),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPaper(err) => write!(f, "{err}"),
            Self::InvalidVolume(err) => write!(f, "{err}"),
            Self::InvalidAuthor(err) => write!(f, "{err}"),
            Self::DuplicateId { kind, id } => {
                let kind = match kind {
                    IdKind::Paper => "paper",
                    IdKind::Volume => "volume",
                    IdKind::Author => "author",
                };
                write!(f, "{kind} id `{id}` already exists")
            }
            Self::UnknownVolume(id) => write!(f, "volume not found: {id}"),
            Self::DuplicateIssueNumber(issue) => {
                write!(f, "issue number {issue} is already used by another volume")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidPaper(err) => Some(err),
            Self::InvalidVolume(err) => Some(err),
            Self::InvalidAuthor(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PaperValidationError> for StoreError {
    fn from(value: PaperValidationError) -> Self {
        Self::InvalidPaper(value)
    }
}

impl From<VolumeValidationError> for StoreError {
    fn from(value: VolumeValidationError) -> Self {
        Self::InvalidVolume(value)
    }
}

impl From<AuthorValidationError> for StoreError {
    fn from(value: AuthorValidationError) -> Self {
        Self::InvalidAuthor(value)
    }
}

/// Where the current collections came from when the store was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Persisted,
    Seed,
    Empty,
}

/// Outcome of a cascading volume delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VolumeDeletion {
    pub volume_removed: bool,
    pub papers_removed: usize,
}

#[derive(Debug, Clone, Copy)]
enum Collections {
    Papers,
    Volumes,
    Both,
}

/// Owner of the paper and volume collections for one session.
pub struct RecordStore<R: BlobRepository> {
    repo: R,
    options: StoreOptions,
    papers: Vec<Paper>,
    volumes: Vec<Volume>,
    load_source: LoadSource,
    /// Fallback state that has not replaced the stored blobs yet.
    unsaved_fallback: bool,
}

impl<R: BlobRepository> RecordStore<R> {
    /// Opens the store over `repo`.
    ///
    /// Loads both collections from blobs. When the snapshot is missing,
    /// incomplete or unparsable, both collections are replaced by the seed
    /// dataset (or left empty when `seed_when_empty` is off).
    ///
    /// A missing snapshot is written back at once. Stored blobs that exist
    /// but cannot be used stay untouched until the first mutation, which
    /// then writes both collections.
    pub fn open(repo: R, options: StoreOptions) -> Self {
        let mut store = Self {
            repo,
            options,
            papers: Vec::new(),
            volumes: Vec::new(),
            load_source: LoadSource::Empty,
            unsaved_fallback: false,
        };

        match load_snapshot(&store.repo) {
            Ok(Some((papers, volumes))) => {
                store.papers = papers;
                store.volumes = volumes;
                store.load_source = LoadSource::Persisted;
            }
            Ok(None) => {
                debug!("event=store_open module=store status=no_snapshot");
                store.reset_to_fallback();
                store.persist(Collections::Both);
            }
            Err(err) => {
                warn!(
                    "event=store_open module=store status=fallback error_code=snapshot_unusable persisted=false error={}",
                    err
                );
                store.reset_to_fallback();
                store.unsaved_fallback = true;
            }
        }

        info!(
            "event=store_open module=store status=ok source={:?} papers={} volumes={}",
            store.load_source,
            store.papers.len(),
            store.volumes.len()
        );
        store
    }

    fn reset_to_fallback(&mut self) {
        if self.options.seed_when_empty {
            self.papers = seed_papers();
            self.volumes = seed_volumes();
            self.load_source = LoadSource::Seed;
        } else {
            self.papers.clear();
            self.volumes.clear();
            self.load_source = LoadSource::Empty;
        }
    }

    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Consumes the store, returning the blob repository.
    pub fn into_repository(self) -> R {
        self.repo
    }

    /// Papers in insertion order.
    pub fn papers(&self) -> &[Paper] {
        &self.papers
    }

    /// Volumes in insertion order.
    pub fn volumes(&self) -> &[Volume] {
        &self.volumes
    }

    pub fn get_paper(&self, id: &str) -> Option<&Paper> {
        self.papers.iter().find(|paper| paper.id == id)
    }

    pub fn get_volume(&self, id: &str) -> Option<&Volume> {
        self.volumes.iter().find(|volume| volume.id == id)
    }

    /// Adds a new paper.
    ///
    /// # Errors
    /// - `InvalidPaper` when the record fails validation.
    /// - `DuplicateId` when a paper with the same id exists.
    /// - `UnknownVolume` when `volume_id` names no existing volume.
    pub fn add_paper(&mut self, paper: Paper) -> StoreResult<()> {
        paper.validate()?;
        if self.get_paper(&paper.id).is_some() {
            return Err(StoreError::DuplicateId {
                kind: IdKind::Paper,
                id: paper.id,
            });
        }
        if self.get_volume(&paper.volume_id).is_none() {
            return Err(StoreError::UnknownVolume(paper.volume_id));
        }

        info!(
            "event=paper_add module=store status=ok paper_id={} volume_id={}",
            paper.id, paper.volume_id
        );
        self.papers.push(paper);
        self.persist(Collections::Papers);
        Ok(())
    }

    /// Merges `patch` into the paper with `id`.
    ///
    /// Returns `Ok(false)` without touching storage when no paper matches.
    /// An empty patch reports the match and writes nothing.
    ///
    /// # Errors
    /// - `InvalidPaper` when the merged record fails validation.
    /// - `UnknownVolume` when the patch moves the paper to a missing volume.
    pub fn update_paper(&mut self, id: &str, patch: &PaperPatch) -> StoreResult<bool> {
        let Some(index) = self.papers.iter().position(|paper| paper.id == id) else {
            debug!("event=paper_update module=store status=not_found paper_id={id}");
            return Ok(false);
        };
        if patch.is_empty() {
            debug!("event=paper_update module=store status=unchanged paper_id={id}");
            return Ok(true);
        }

        let merged = self.papers[index].merged(patch);
        merged.validate()?;
        if merged.volume_id != self.papers[index].volume_id
            && self.get_volume(&merged.volume_id).is_none()
        {
            return Err(StoreError::UnknownVolume(merged.volume_id));
        }

        self.papers[index] = merged;
        info!("event=paper_update module=store status=ok paper_id={id}");
        self.persist(Collections::Papers);
        Ok(true)
    }

    /// Removes the paper with `id`. Returns whether one was removed.
    pub fn delete_paper(&mut self, id: &str) -> bool {
        let before = self.papers.len();
        self.papers.retain(|paper| paper.id != id);
        if self.papers.len() == before {
            debug!("event=paper_delete module=store status=not_found paper_id={id}");
            return false;
        }

        info!("event=paper_delete module=store status=ok paper_id={id}");
        self.persist(Collections::Papers);
        true
    }

    /// Adds a new volume.
    ///
    /// # Errors
    /// - `InvalidVolume` when the record fails validation.
    /// - `DuplicateId` when a volume with the same id exists.
    /// - `DuplicateIssueNumber` when uniqueness is enforced and violated.
    pub fn add_volume(&mut self, volume: Volume) -> StoreResult<()> {
        volume.validate()?;
        if self.get_volume(&volume.id).is_some() {
            return Err(StoreError::DuplicateId {
                kind: IdKind::Volume,
                id: volume.id,
            });
        }
        self.ensure_issue_number_free(volume.issue_number, None)?;

        info!(
            "event=volume_add module=store status=ok volume_id={} issue={}",
            volume.id, volume.issue_number
        );
        self.volumes.push(volume);
        self.persist(Collections::Volumes);
        Ok(())
    }

    /// Merges `patch` into the volume with `id`.
    ///
    /// Returns `Ok(false)` without touching storage when no volume matches.
    /// An empty patch reports the match and writes nothing.
    pub fn update_volume(&mut self, id: &str, patch: &VolumePatch) -> StoreResult<bool> {
        let Some(index) = self.volumes.iter().position(|volume| volume.id == id) else {
            debug!("event=volume_update module=store status=not_found volume_id={id}");
            return Ok(false);
        };
        if patch.is_empty() {
            debug!("event=volume_update module=store status=unchanged volume_id={id}");
            return Ok(true);
        }

        let merged = self.volumes[index].merged(patch);
        merged.validate()?;
        self.ensure_issue_number_free(merged.issue_number, Some(id))?;

        self.volumes[index] = merged;
        info!("event=volume_update module=store status=ok volume_id={id}");
        self.persist(Collections::Volumes);
        Ok(true)
    }

    /// Deletes the volume with `id` together with every paper it contains.
    ///
    /// Papers referencing `id` are removed even when the volume itself is
    /// already gone.
    pub fn delete_volume(&mut self, id: &str) -> VolumeDeletion {
        let papers_before = self.papers.len();
        self.papers.retain(|paper| paper.volume_id != id);
        let papers_removed = papers_before - self.papers.len();

        let volumes_before = self.volumes.len();
        self.volumes.retain(|volume| volume.id != id);
        let volume_removed = self.volumes.len() != volumes_before;

        let deletion = VolumeDeletion {
            volume_removed,
            papers_removed,
        };
        if !volume_removed && papers_removed == 0 {
            debug!("event=volume_delete module=store status=not_found volume_id={id}");
            return deletion;
        }

        info!(
            "event=volume_delete module=store status=ok volume_id={id} volume_removed={volume_removed} papers_removed={papers_removed}"
        );
        self.persist(Collections::Both);
        deletion
    }

    /// Papers of one volume, in insertion order.
    pub fn get_papers_by_volume(&self, volume_id: &str) -> Vec<Paper> {
        self.papers
            .iter()
            .filter(|paper| paper.volume_id == volume_id)
            .cloned()
            .collect()
    }

    /// Case-insensitive substring search over title, abstract, author names
    /// and keywords. Blank queries return nothing.
    pub fn search_papers(&self, query: &str) -> Vec<Paper> {
        self.search(&PaperSearchQuery::new(query))
    }

    /// Search with optional volume scope and result cap.
    pub fn search(&self, query: &PaperSearchQuery) -> Vec<Paper> {
        let hits = search_papers(&self.papers, query)
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();
        debug!(
            "event=paper_search module=store status=ok query_len={} scoped={} hits={}",
            query.text.chars().count(),
            query.volume_id.is_some(),
            hits.len()
        );
        hits
    }

    /// Applies `patch` to every embedded copy of the author with `author_id`.
    ///
    /// Returns the number of papers whose copy actually changed.
    ///
    /// # Errors
    /// - `InvalidAuthor` when the patch would blank the author's name.
    pub fn propagate_author_edit(
        &mut self,
        author_id: &str,
        patch: &AuthorPatch,
    ) -> StoreResult<usize> {
        if patch.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(StoreError::InvalidAuthor(AuthorValidationError::EmptyName {
                author_id: author_id.to_string(),
            }));
        }
        if patch.is_empty() {
            return Ok(0);
        }

        let mut changed_papers = 0;
        for paper in &mut self.papers {
            let mut changed = false;
            for author in paper.authors.iter_mut().filter(|author| author.id == author_id) {
                changed |= author.apply_patch(patch);
            }
            if changed {
                changed_papers += 1;
            }
        }

        if changed_papers > 0 {
            info!(
                "event=author_propagate module=store status=ok author_id={author_id} papers={changed_papers}"
            );
            self.persist(Collections::Papers);
        }
        Ok(changed_papers)
    }

    /// Both collections as one pretty-printed JSON document.
    pub fn export_snapshot(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&SnapshotDocument {
            papers: &self.papers,
            volumes: &self.volumes,
        })
    }

    /// Removes every paper and volume.
    pub fn clear(&mut self) {
        info!(
            "event=store_clear module=store status=ok papers={} volumes={}",
            self.papers.len(),
            self.volumes.len()
        );
        self.papers.clear();
        self.volumes.clear();
        self.persist(Collections::Both);
    }

    fn ensure_issue_number_free(
        &self,
        issue_number: u32,
        except_id: Option<&str>,
    ) -> StoreResult<()> {
        if !self.options.enforce_unique_issue_numbers {
            return Ok(());
        }
        let taken = self.volumes.iter().any(|volume| {
            volume.issue_number == issue_number && Some(volume.id.as_str()) != except_id
        });
        if taken {
            return Err(StoreError::DuplicateIssueNumber(issue_number));
        }
        Ok(())
    }

    fn persist(&mut self, collections: Collections) {
        let collections = if self.unsaved_fallback {
            Collections::Both
        } else {
            collections
        };
        let result = match collections {
            Collections::Papers => encode_papers(&self.papers)
                .map_err(|err| err.to_string())
                .and_then(|raw| {
                    self.repo
                        .put(PAPERS_KEY, &raw)
                        .map_err(|err| err.to_string())
                }),
            Collections::Volumes => encode_volumes(&self.volumes)
                .map_err(|err| err.to_string())
                .and_then(|raw| {
                    self.repo
                        .put(VOLUMES_KEY, &raw)
                        .map_err(|err| err.to_string())
                }),
            Collections::Both => encode_papers(&self.papers)
                .and_then(|papers| Ok((papers, encode_volumes(&self.volumes)?)))
                .map_err(|err| err.to_string())
                .and_then(|(papers, volumes)| {
                    self.repo
                        .put_many(&[
                            (PAPERS_KEY, papers.as_str()),
                            (VOLUMES_KEY, volumes.as_str()),
                        ])
                        .map_err(|err| err.to_string())
                }),
        };

        match result {
            Ok(()) => self.unsaved_fallback = false,
            Err(err) => warn!(
                "event=store_persist module=store status=error collections={:?} error_code=persist_failed error={}",
                collections, err
            ),
        }
    }
}
