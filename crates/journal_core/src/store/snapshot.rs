//! Persisted collection layout.
//!
//! Each collection is stored as a JSON array under its own key. Only a
//! missing or unparsable blob makes a snapshot unusable; records that parse
//! but break a model rule are kept, with keyword lists normalized and every
//! remaining violation reported as a warning.

use crate::model::paper::{normalize_keywords, Paper};
use crate::model::volume::Volume;
use crate::repo::blob_repo::{BlobRepository, RepoError};
use log::warn;
use serde::Serialize;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Blob key holding the paper collection.
pub const PAPERS_KEY: &str = "papers";
/// Blob key holding the volume collection.
pub const VOLUMES_KEY: &str = "volumes";

/// Reasons a persisted snapshot cannot be used.
#[derive(Debug)]
pub enum SnapshotError {
    Repo(RepoError),
    /// Only one of the two collections is present.
    Incomplete { missing: &'static str },
    Json { key: &'static str, source: serde_json::Error },
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Incomplete { missing } => write!(f, "snapshot is missing `{missing}`"),
            Self::Json { key, source } => write!(f, "blob `{key}` is not valid json: {source}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Json { source, .. } => Some(source),
            Self::Incomplete { .. } => None,
        }
    }
}

impl From<RepoError> for SnapshotError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Both collections as one exportable document.
#[derive(Debug, Serialize)]
pub struct SnapshotDocument<'a> {
    pub papers: &'a [Paper],
    pub volumes: &'a [Volume],
}

pub fn encode_papers(papers: &[Paper]) -> serde_json::Result<String> {
    serde_json::to_string(papers)
}

pub fn encode_volumes(volumes: &[Volume]) -> serde_json::Result<String> {
    serde_json::to_string(volumes)
}

/// Parses the paper blob.
///
/// Blank and repeated keywords are dropped. Other rule violations and
/// repeated ids are logged and the records are returned unchanged.
pub fn decode_papers(raw: &str) -> Result<Vec<Paper>, SnapshotError> {
    let mut papers: Vec<Paper> = serde_json::from_str(raw).map_err(|source| SnapshotError::Json {
        key: PAPERS_KEY,
        source,
    })?;

    for paper in &mut papers {
        let keywords = normalize_keywords(&paper.keywords);
        if keywords != paper.keywords {
            warn!(
                "event=snapshot_repair module=store status=ok key={PAPERS_KEY} record_id={} field=keywords before={} after={}",
                paper.id,
                paper.keywords.len(),
                keywords.len()
            );
            paper.keywords = keywords;
        }
    }

    let mut ids = HashSet::new();
    for paper in &papers {
        if paper.validate().is_err() {
            warn_kept_record(PAPERS_KEY, &paper.id, "invalid_record");
        }
        if !ids.insert(paper.id.as_str()) {
            warn_kept_record(PAPERS_KEY, &paper.id, "duplicate_id");
        }
    }
    Ok(papers)
}

/// Parses the volume blob. Rule violations are logged, never dropped.
pub fn decode_volumes(raw: &str) -> Result<Vec<Volume>, SnapshotError> {
    let volumes: Vec<Volume> = serde_json::from_str(raw).map_err(|source| SnapshotError::Json {
        key: VOLUMES_KEY,
        source,
    })?;

    let mut ids = HashSet::new();
    for volume in &volumes {
        if volume.validate().is_err() {
            warn_kept_record(VOLUMES_KEY, &volume.id, "invalid_record");
        }
        if !ids.insert(volume.id.as_str()) {
            warn_kept_record(VOLUMES_KEY, &volume.id, "duplicate_id");
        }
    }
    Ok(volumes)
}

fn warn_kept_record(key: &str, record_id: &str, error_code: &str) {
    warn!(
        "event=snapshot_validate module=store status=kept key={key} record_id={record_id} error_code={error_code}"
    );
}

/// Loads both collections.
///
/// Returns `Ok(None)` when neither blob exists. A snapshot with only one of
/// the two blobs is an error, never a partial load.
pub fn load_snapshot<R: BlobRepository>(
    repo: &R,
) -> Result<Option<(Vec<Paper>, Vec<Volume>)>, SnapshotError> {
    let papers_raw = repo.get(PAPERS_KEY)?;
    let volumes_raw = repo.get(VOLUMES_KEY)?;

    match (papers_raw, volumes_raw) {
        (None, None) => Ok(None),
        (Some(_), None) => Err(SnapshotError::Incomplete {
            missing: VOLUMES_KEY,
        }),
        (None, Some(_)) => Err(SnapshotError::Incomplete {
            missing: PAPERS_KEY,
        }),
        (Some(papers), Some(volumes)) => {
            Ok(Some((decode_papers(&papers)?, decode_volumes(&volumes)?)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_papers, decode_volumes, encode_papers, SnapshotError};
    use crate::store::seed::seed_papers;

    #[test]
    fn papers_use_camel_case_wire_names() {
        let raw = encode_papers(&seed_papers()).unwrap();
        assert!(raw.contains("\"publicationDate\""));
        assert!(raw.contains("\"volumeId\""));
        assert!(raw.contains("\"abstract\""));
        assert!(!raw.contains("\"fullText\""));
    }

    #[test]
    fn decode_normalizes_keywords_and_keeps_the_record() {
        let mut papers = seed_papers();
        papers[0].keywords = vec!["ai".to_string(), "ai".to_string(), " ".to_string()];
        let raw = encode_papers(&papers).unwrap();

        let decoded = decode_papers(&raw).unwrap();
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[0].keywords, vec!["ai"]);
        assert!(decoded[0].validate().is_ok());
    }

    #[test]
    fn decode_keeps_repeated_ids() {
        let mut papers = seed_papers();
        papers.push(papers[0].clone());
        let raw = encode_papers(&papers).unwrap();
        assert_eq!(decode_papers(&raw).unwrap().len(), 4);
    }

    #[test]
    fn decode_keeps_records_that_break_rules() {
        let raw = r#"[{"id":"v9","title":"","issueNumber":1,"year":2024,"month":1,"description":"d"}]"#;
        let volumes = decode_volumes(raw).unwrap();
        assert_eq!(volumes.len(), 1);
        assert!(volumes[0].validate().is_err());
    }

    #[test]
    fn decode_rejects_malformed_json() {
        let err = decode_volumes("[{").unwrap_err();
        assert!(matches!(err, SnapshotError::Json { key: "volumes", .. }));
    }
}
