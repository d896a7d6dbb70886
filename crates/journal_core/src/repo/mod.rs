//! Key-value blob persistence behind the record store.
//!
//! # Responsibility
//! - Define the storage contract the store mirrors its collections into.
//! - Keep SQLite details out of the store and service layers.
//!
//! # Invariants
//! - A blob is an opaque UTF-8 string under a string key.
//! - `put_many` is all-or-nothing for implementations that can fail midway.

pub mod blob_repo;
