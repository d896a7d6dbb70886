//! Core record store for the journal site.
//! This crate is the single source of truth for paper/volume invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod store;

pub use config::{ConfigError, JournalConfig, StoreOptions};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::author::{Author, AuthorPatch, AuthorValidationError};
pub use model::id::{generate_id, AuthorId, IdKind, PaperId, VolumeId};
pub use model::paper::{Paper, PaperPatch, PaperValidationError};
pub use model::volume::{Volume, VolumePatch, VolumeValidationError};
pub use repo::blob_repo::{
    BlobRepository, MemoryBlobRepository, RepoError, RepoResult, SqliteBlobRepository,
};
pub use search::substring::PaperSearchQuery;
pub use service::catalog_service::{ArchiveEntry, AuthorEntry, CatalogService, DashboardStats};
pub use service::editorial_service::{
    EditorialError, EditorialService, NewPaperDraft, NewVolumeDraft,
};
pub use store::record_store::{
    LoadSource, RecordStore, StoreError, StoreResult, VolumeDeletion,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
