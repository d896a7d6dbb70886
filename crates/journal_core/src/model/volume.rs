//! Volume (journal issue) domain model.
//!
//! # Invariants
//! - `title` and `description` are non-blank.
//! - `issue_number >= 1`, `year` has four digits, `month` is within 1..=12.
//! - `(year, month, issue_number)` orders volumes; it is not a uniqueness key.

use crate::model::id::VolumeId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Journal issue grouping zero or more papers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub id: VolumeId,
    pub title: String,
    pub issue_number: u32,
    pub year: i32,
    pub month: u8,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeValidationError {
    EmptyId,
    EmptyTitle,
    EmptyDescription,
    InvalidIssueNumber(u32),
    InvalidYear(i32),
    InvalidMonth(u8),
}

impl Display for VolumeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "volume id cannot be empty"),
            Self::EmptyTitle => write!(f, "volume title cannot be empty"),
            Self::EmptyDescription => write!(f, "volume description cannot be empty"),
            Self::InvalidIssueNumber(value) => {
                write!(f, "issue number must be positive, got {value}")
            }
            Self::InvalidYear(value) => write!(f, "year must have four digits, got {value}"),
            Self::InvalidMonth(value) => write!(f, "month must be within 1..=12, got {value}"),
        }
    }
}

impl Error for VolumeValidationError {}

/// Field-level update for a volume. `image: Some(None)` clears the image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumePatch {
    pub title: Option<String>,
    pub issue_number: Option<u32>,
    pub year: Option<i32>,
    pub month: Option<u8>,
    pub description: Option<String>,
    pub image: Option<Option<String>>,
}

impl VolumePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Volume {
    pub fn new(
        id: impl Into<VolumeId>,
        title: impl Into<String>,
        issue_number: u32,
        year: i32,
        month: u8,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            issue_number,
            year,
            month,
            description: description.into(),
            image: None,
        }
    }

    pub fn validate(&self) -> Result<(), VolumeValidationError> {
        if self.id.trim().is_empty() {
            return Err(VolumeValidationError::EmptyId);
        }
        if self.title.trim().is_empty() {
            return Err(VolumeValidationError::EmptyTitle);
        }
        if self.description.trim().is_empty() {
            return Err(VolumeValidationError::EmptyDescription);
        }
        if self.issue_number == 0 {
            return Err(VolumeValidationError::InvalidIssueNumber(self.issue_number));
        }
        if !(1000..=9999).contains(&self.year) {
            return Err(VolumeValidationError::InvalidYear(self.year));
        }
        if !(1..=12).contains(&self.month) {
            return Err(VolumeValidationError::InvalidMonth(self.month));
        }
        Ok(())
    }

    /// Ordering key: newer issues compare greater.
    pub fn sort_key(&self) -> (i32, u8, u32) {
        (self.year, self.month, self.issue_number)
    }

    /// Returns a copy with `patch` merged over this volume. `id` is preserved.
    pub fn merged(&self, patch: &VolumePatch) -> Volume {
        let mut next = self.clone();
        if let Some(title) = &patch.title {
            next.title.clone_from(title);
        }
        if let Some(issue_number) = patch.issue_number {
            next.issue_number = issue_number;
        }
        if let Some(year) = patch.year {
            next.year = year;
        }
        if let Some(month) = patch.month {
            next.month = month;
        }
        if let Some(description) = &patch.description {
            next.description.clone_from(description);
        }
        if let Some(image) = &patch.image {
            next.image.clone_from(image);
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::{Volume, VolumePatch, VolumeValidationError};

    fn volume() -> Volume {
        Volume::new("v1", "Quantum", 1, 2023, 10, "Quantum issue")
    }

    #[test]
    fn month_and_year_bounds_are_enforced() {
        let mut bad_month = volume();
        bad_month.month = 13;
        assert_eq!(
            bad_month.validate(),
            Err(VolumeValidationError::InvalidMonth(13))
        );

        let mut bad_year = volume();
        bad_year.year = 923;
        assert_eq!(
            bad_year.validate(),
            Err(VolumeValidationError::InvalidYear(923))
        );
    }

    #[test]
    fn zero_issue_number_is_rejected() {
        let mut volume = volume();
        volume.issue_number = 0;
        assert_eq!(
            volume.validate(),
            Err(VolumeValidationError::InvalidIssueNumber(0))
        );
    }

    #[test]
    fn sort_key_orders_by_year_then_month_then_issue() {
        let older = Volume::new("v1", "A", 5, 2022, 12, "d");
        let newer = Volume::new("v2", "B", 1, 2023, 1, "d");
        assert!(newer.sort_key() > older.sort_key());
    }

    #[test]
    fn merged_keeps_identity() {
        let merged = volume().merged(&VolumePatch {
            title: Some("Renamed".to_string()),
            ..VolumePatch::default()
        });
        assert_eq!(merged.id, "v1");
        assert_eq!(merged.title, "Renamed");
        assert_eq!(merged.month, 10);
    }
}
