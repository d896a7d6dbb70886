//! Identifier aliases and generation.
//!
//! Ids are opaque strings made of a one-letter type prefix followed by a
//! UUID v4 in simple (hyphen-less) form, e.g. `p3f2a...`.

use uuid::Uuid;

/// Stable identifier of a [`crate::Paper`].
pub type PaperId = String;
/// Stable identifier of a [`crate::Volume`].
pub type VolumeId = String;
/// Stable identifier of an embedded [`crate::Author`] copy.
pub type AuthorId = String;

/// Record family an id is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Paper,
    Volume,
    Author,
}

impl IdKind {
    /// One-letter prefix used for generated ids of this kind.
    pub fn prefix(self) -> char {
        match self {
            Self::Paper => 'p',
            Self::Volume => 'v',
            Self::Author => 'a',
        }
    }
}

/// Generates a fresh collision-resistant id for the given record kind.
pub fn generate_id(kind: IdKind) -> String {
    format!("{}{}", kind.prefix(), Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::{generate_id, IdKind};
    use std::collections::HashSet;

    #[test]
    fn generated_ids_carry_kind_prefix() {
        assert!(generate_id(IdKind::Paper).starts_with('p'));
        assert!(generate_id(IdKind::Volume).starts_with('v'));
        assert!(generate_id(IdKind::Author).starts_with('a'));
    }

    #[test]
    fn generated_ids_do_not_collide() {
        let ids = (0..500)
            .map(|_| generate_id(IdKind::Paper))
            .collect::<HashSet<_>>();
        assert_eq!(ids.len(), 500);
    }
}
