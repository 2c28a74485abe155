//! The subject/target/role relationship record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::role::TargetType;
use crate::key::SubjectTargetKey;

/// "Subject has role on target."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    /// The subject holding the role.
    pub subject_id: String,

    /// The target the role applies to.
    pub target_id: String,

    /// The kind of target.
    pub target_type: TargetType,

    /// Handle of the assigned role.
    pub role_handle: String,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl AccessControl {
    /// Creates a live record stamped with the current time.
    pub fn new<S, T, Y, R>(subject_id: S, target_id: T, target_type: Y, role_handle: R) -> Self
    where
        S: Into<String>,
        T: Into<String>,
        Y: Into<TargetType>,
        R: Into<String>,
    {
        let now = Utc::now();
        Self {
            subject_id: subject_id.into(),
            target_id: target_id.into(),
            target_type: target_type.into(),
            role_handle: role_handle.into(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Returns the composite key for this record.
    pub fn key(&self) -> SubjectTargetKey {
        SubjectTargetKey::new(self.subject_id.as_str(), self.target_id.as_str())
    }

    /// Whether the record has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
