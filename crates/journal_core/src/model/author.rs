//! Author value type.
//!
//! # Responsibility
//! - Describe one credited person as embedded inside a paper.
//! - Provide field-level patching used by author edit propagation.
//!
//! # Invariants
//! - `id` and `name` are non-blank for every author attached to a paper.
//! - The same person may appear as independent copies across papers; copies
//!   are matched by `id` only.

use crate::model::id::AuthorId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Embedded author record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    #[serde(default)]
    pub affiliation: String,
    #[serde(default)]
    pub bio: String,
    /// Photo URI, or empty when none is set.
    #[serde(default)]
    pub photo: String,
}

/// Author validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorValidationError {
    EmptyId,
    EmptyName { author_id: AuthorId },
}

impl Display for AuthorValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "author id cannot be empty"),
            Self::EmptyName { author_id } => {
                write!(f, "author `{author_id}` must have a non-empty name")
            }
        }
    }
}

impl Error for AuthorValidationError {}

/// Field-level update for one author copy. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorPatch {
    pub name: Option<String>,
    pub affiliation: Option<String>,
    pub bio: Option<String>,
    pub photo: Option<String>,
}

impl AuthorPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.affiliation.is_none()
            && self.bio.is_none()
            && self.photo.is_none()
    }
}

impl Author {
    /// Creates an author with only identity and name set.
    pub fn new(id: impl Into<AuthorId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            affiliation: String::new(),
            bio: String::new(),
            photo: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), AuthorValidationError> {
        if self.id.trim().is_empty() {
            return Err(AuthorValidationError::EmptyId);
        }
        if self.name.trim().is_empty() {
            return Err(AuthorValidationError::EmptyName {
                author_id: self.id.clone(),
            });
        }
        Ok(())
    }

    /// Applies `patch` in place and reports whether any field changed.
    pub fn apply_patch(&mut self, patch: &AuthorPatch) -> bool {
        let mut changed = false;
        changed |= assign_if_changed(&mut self.name, patch.name.as_ref());
        changed |= assign_if_changed(&mut self.affiliation, patch.affiliation.as_ref());
        changed |= assign_if_changed(&mut self.bio, patch.bio.as_ref());
        changed |= assign_if_changed(&mut self.photo, patch.photo.as_ref());
        changed
    }
}

fn assign_if_changed(field: &mut String, value: Option<&String>) -> bool {
    match value {
        Some(value) if field != value => {
            field.clone_from(value);
            true
        }
        _ => false,
    }
}
