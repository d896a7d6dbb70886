//! Journal domain model: papers, volumes and embedded authors.
//!
//! # Responsibility
//! - Define the canonical records owned by the record store.
//! - Provide per-record validation and patch (partial update) types.
//!
//! # Invariants
//! - Every record is identified by an opaque, stable string id.
//! - Authors are embedded copies inside papers, not references.
//! - Serialized field names are camelCase to match the persisted layout.

pub mod author;
pub mod id;
pub mod paper;
pub mod volume;
