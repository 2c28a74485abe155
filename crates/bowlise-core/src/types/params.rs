//! Request parameters for backend and facade operations.

use serde::{Deserialize, Serialize};

use super::role::TargetType;
use crate::key::SubjectTargetKey;

/// Identifies one subject and one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectTargetParams {
    /// Subject id.
    pub subject_id: String,
    /// Target id.
    pub target_id: String,
}

impl SubjectTargetParams {
    /// Creates params for a subject/target pair.
    pub fn new<S: Into<String>, T: Into<String>>(subject_id: S, target_id: T) -> Self {
        Self {
            subject_id: subject_id.into(),
            target_id: target_id.into(),
        }
    }

    /// Returns the composite key.
    pub fn key(&self) -> SubjectTargetKey {
        SubjectTargetKey::new(self.subject_id.as_str(), self.target_id.as_str())
    }
}

impl From<&SubjectTargetKey> for SubjectTargetParams {
    fn from(key: &SubjectTargetKey) -> Self {
        Self::new(key.subject_id(), key.target_id())
    }
}

/// Asks whether a subject holds a role on a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectHasRoleParams {
    /// Subject id.
    pub subject_id: String,
    /// Target id.
    pub target_id: String,
    /// Role handle to look for.
    pub role_handle: String,
}

impl SubjectHasRoleParams {
    /// Creates params for a role check.
    pub fn new<S, T, R>(subject_id: S, target_id: T, role_handle: R) -> Self
    where
        S: Into<String>,
        T: Into<String>,
        R: Into<String>,
    {
        Self {
            subject_id: subject_id.into(),
            target_id: target_id.into(),
            role_handle: role_handle.into(),
        }
    }

    /// Returns the composite key.
    pub fn key(&self) -> SubjectTargetKey {
        SubjectTargetKey::new(self.subject_id.as_str(), self.target_id.as_str())
    }
}

/// Asks whether a subject holds a permission on a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectHasPermissionParams {
    /// Subject id.
    pub subject_id: String,
    /// Target id.
    pub target_id: String,
    /// Permission handle to look for.
    pub permission_handle: String,
}

impl SubjectHasPermissionParams {
    /// Creates params for a permission check.
    pub fn new<S, T, P>(subject_id: S, target_id: T, permission_handle: P) -> Self
    where
        S: Into<String>,
        T: Into<String>,
        P: Into<String>,
    {
        Self {
            subject_id: subject_id.into(),
            target_id: target_id.into(),
            permission_handle: permission_handle.into(),
        }
    }

    /// Returns the composite key.
    pub fn key(&self) -> SubjectTargetKey {
        SubjectTargetKey::new(self.subject_id.as_str(), self.target_id.as_str())
    }
}

/// One subject, many targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkSubjectTargetParams {
    /// Subject id.
    pub subject_id: String,
    /// Target ids.
    pub target_ids: Vec<String>,
}

impl BulkSubjectTargetParams {
    /// Creates bulk params.
    pub fn new<S, I, T>(subject_id: S, target_ids: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            subject_id: subject_id.into(),
            target_ids: target_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the composite key for one of the targets.
    pub fn key_for(&self, target_id: &str) -> SubjectTargetKey {
        SubjectTargetKey::new(self.subject_id.as_str(), target_id)
    }
}

/// Role check across many targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkSubjectHasRoleParams {
    /// Subject id.
    pub subject_id: String,
    /// Target ids.
    pub target_ids: Vec<String>,
    /// Role handle to look for on each target.
    pub role_handle: String,
}

impl BulkSubjectHasRoleParams {
    /// Creates bulk role-check params.
    pub fn new<S, I, T, R>(subject_id: S, target_ids: I, role_handle: R) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = T>,
        T: Into<String>,
        R: Into<String>,
    {
        Self {
            subject_id: subject_id.into(),
            target_ids: target_ids.into_iter().map(Into::into).collect(),
            role_handle: role_handle.into(),
        }
    }

    /// The subject/targets part of the request.
    pub fn targets(&self) -> BulkSubjectTargetParams {
        BulkSubjectTargetParams {
            subject_id: self.subject_id.clone(),
            target_ids: self.target_ids.clone(),
        }
    }
}

/// Permission check across many targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkSubjectHasPermissionParams {
    /// Subject id.
    pub subject_id: String,
    /// Target ids.
    pub target_ids: Vec<String>,
    /// Permission handle to look for on each target.
    pub permission_handle: String,
}

impl BulkSubjectHasPermissionParams {
    /// Creates bulk permission-check params.
    pub fn new<S, I, T, P>(subject_id: S, target_ids: I, permission_handle: P) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = T>,
        T: Into<String>,
        P: Into<String>,
    {
        Self {
            subject_id: subject_id.into(),
            target_ids: target_ids.into_iter().map(Into::into).collect(),
            permission_handle: permission_handle.into(),
        }
    }

    /// The subject/targets part of the request.
    pub fn targets(&self) -> BulkSubjectTargetParams {
        BulkSubjectTargetParams {
            subject_id: self.subject_id.clone(),
            target_ids: self.target_ids.clone(),
        }
    }
}

/// Grants a role to a subject on a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAccessControlParams {
    /// Subject id.
    pub subject_id: String,
    /// Target id.
    pub target_id: String,
    /// The kind of target.
    pub target_type: TargetType,
    /// Role to assign.
    pub role_handle: String,
}

impl CreateAccessControlParams {
    /// Creates params for a new access control entry.
    pub fn new<S, T, Y, R>(subject_id: S, target_id: T, target_type: Y, role_handle: R) -> Self
    where
        S: Into<String>,
        T: Into<String>,
        Y: Into<TargetType>,
        R: Into<String>,
    {
        Self {
            subject_id: subject_id.into(),
            target_id: target_id.into(),
            target_type: target_type.into(),
            role_handle: role_handle.into(),
        }
    }

    /// Returns the composite key.
    pub fn key(&self) -> SubjectTargetKey {
        SubjectTargetKey::new(self.subject_id.as_str(), self.target_id.as_str())
    }
}

/// Replaces the role held by a subject on a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAccessControlParams {
    /// Subject id.
    pub subject_id: String,
    /// Target id.
    pub target_id: String,
    /// New role.
    pub role_handle: String,
}

impl UpdateAccessControlParams {
    /// Creates params for an update.
    pub fn new<S, T, R>(subject_id: S, target_id: T, role_handle: R) -> Self
    where
        S: Into<String>,
        T: Into<String>,
        R: Into<String>,
    {
        Self {
            subject_id: subject_id.into(),
            target_id: target_id.into(),
            role_handle: role_handle.into(),
        }
    }

    /// Returns the composite key.
    pub fn key(&self) -> SubjectTargetKey {
        SubjectTargetKey::new(self.subject_id.as_str(), self.target_id.as_str())
    }
}

/// Removes a subject's access to a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAccessControlParams {
    /// Subject id.
    pub subject_id: String,
    /// Target id.
    pub target_id: String,
    /// Mark the record deleted instead of removing it.
    #[serde(default)]
    pub soft_delete: bool,
}

impl DeleteAccessControlParams {
    /// Creates params for a hard delete.
    pub fn new<S: Into<String>, T: Into<String>>(subject_id: S, target_id: T) -> Self {
        Self {
            subject_id: subject_id.into(),
            target_id: target_id.into(),
            soft_delete: false,
        }
    }

    /// Requests a soft delete.
    pub fn soft(mut self) -> Self {
        self.soft_delete = true;
        self
    }

    /// Returns the composite key.
    pub fn key(&self) -> SubjectTargetKey {
        SubjectTargetKey::new(self.subject_id.as_str(), self.target_id.as_str())
    }
}
