//! The journal record store.
//!
//! # Responsibility
//! - Own the paper and volume collections for one session.
//! - Enforce id uniqueness, record validation and cascade delete.
//! - Mirror every successful mutation into the blob repository.
//!
//! # Invariants
//! - Callers never obtain mutable access to the internal collections.
//! - Deleting a volume never leaves papers that reference it.
//! - Persistence failures never fail or roll back an in-memory mutation.

pub mod record_store;
pub mod seed;
pub mod snapshot;
