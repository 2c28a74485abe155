//! Access-control backend trait.
//!
//! This module defines the `AccessControlBackend` trait that every store
//! (SQL adapter, in-memory store, remote service client) must satisfy. The
//! cache facade in the `bowlise` crate implements the same trait, so any
//! caller written against a backend can be pointed at the facade unchanged.
//!
//! # Example
//!
//! ```rust,ignore
//! use bowlise_core::{AccessControlBackend, SubjectHasRoleParams};
//!
//! let allowed = backend
//!     .subject_has_role(SubjectHasRoleParams::new("user-1", "doc-2", "editor"))
//!     .await?;
//! ```

use async_trait::async_trait;
use std::collections::HashMap;

use crate::types::{
    contains_handle, AccessControl, BulkSubjectHasPermissionParams, BulkSubjectHasRoleParams,
    BulkSubjectTargetParams, CreateAccessControlParams, DeleteAccessControlParams, HasHandle,
    Permission, Role, SubjectHasPermissionParams, SubjectHasRoleParams, SubjectTargetParams,
    UpdateAccessControlParams,
};
use crate::{Error, Result};

/// Per-target outcome of a bulk operation.
///
/// Maps each target id to its value or to the error raised for that target
/// alone. A failing target does not fail the whole request.
pub type BulkResult<T> = HashMap<String, Result<T>>;

/// Abstract access-control backend.
///
/// # Async
///
/// Every operation is async so implementations can perform I/O (database
/// queries, RPCs) without blocking. Implementations own their own connection
/// pooling, concurrency limits and retry policy.
#[async_trait]
pub trait AccessControlBackend: Send + Sync {
    /// Lists every role known to the backend.
    async fn list_all_roles(&self) -> Result<Vec<Role>>;

    /// Lists every permission known to the backend.
    async fn list_all_permissions(&self) -> Result<Vec<Permission>>;

    /// Grants a role to a subject on a target.
    async fn create_access_control(
        &self,
        params: CreateAccessControlParams,
    ) -> Result<AccessControl>;

    /// Replaces the role a subject holds on a target.
    async fn update_access_control(
        &self,
        params: UpdateAccessControlParams,
    ) -> Result<AccessControl>;

    /// Removes a subject's access to a target.
    ///
    /// Returns `false` if there was nothing to delete.
    async fn delete_access_control(&self, params: DeleteAccessControlParams) -> Result<bool>;

    /// Lists the roles a subject holds on a target.
    async fn list_roles_for_subject(&self, params: SubjectTargetParams) -> Result<Vec<Role>>;

    /// Lists the permissions a subject holds on a target.
    async fn list_permissions_for_subject(
        &self,
        params: SubjectTargetParams,
    ) -> Result<Vec<Permission>>;

    /// Checks whether a subject holds a role on a target.
    async fn subject_has_role(&self, params: SubjectHasRoleParams) -> Result<bool>;

    /// Checks whether a subject holds a permission on a target.
    async fn subject_has_permission(&self, params: SubjectHasPermissionParams) -> Result<bool>;

    /// Lists roles for one subject across many targets.
    ///
    /// The outer `Result` fails only if the request as a whole failed.
    async fn bulk_list_roles_for_subject(
        &self,
        params: BulkSubjectTargetParams,
    ) -> Result<BulkResult<Vec<Role>>>;

    /// Lists permissions for one subject across many targets.
    async fn bulk_list_permissions_for_subject(
        &self,
        params: BulkSubjectTargetParams,
    ) -> Result<BulkResult<Vec<Permission>>>;

    /// Checks a role for one subject across many targets.
    ///
    /// The default implementation derives the answer from
    /// [`bulk_list_roles_for_subject`](Self::bulk_list_roles_for_subject).
    async fn bulk_subject_has_role(
        &self,
        params: BulkSubjectHasRoleParams,
    ) -> Result<BulkResult<bool>> {
        let lists = self.bulk_list_roles_for_subject(params.targets()).await?;
        Ok(membership(&lists, &params.target_ids, &params.role_handle))
    }

    /// Checks a permission for one subject across many targets.
    ///
    /// The default implementation derives the answer from
    /// [`bulk_list_permissions_for_subject`](Self::bulk_list_permissions_for_subject).
    async fn bulk_subject_has_permission(
        &self,
        params: BulkSubjectHasPermissionParams,
    ) -> Result<BulkResult<bool>> {
        let lists = self
            .bulk_list_permissions_for_subject(params.targets())
            .await?;
        Ok(membership(
            &lists,
            &params.target_ids,
            &params.permission_handle,
        ))
    }

    /// Get the backend name for diagnostics.
    fn name(&self) -> &str;
}

/// Tests `handle` against each requested target's list.
///
/// A target whose list is an error keeps that error; a target absent from
/// `lists` yields [`Error::MissingBulkEntry`].
pub fn membership<T: HasHandle>(
    lists: &BulkResult<Vec<T>>,
    target_ids: &[String],
    handle: &str,
) -> BulkResult<bool> {
    target_ids
        .iter()
        .map(|target_id| {
            let answer = match lists.get(target_id) {
                Some(Ok(items)) => Ok(contains_handle(items, handle)),
                Some(Err(e)) => Err(e.clone()),
                None => Err(Error::missing_bulk_entry(target_id.as_str())),
            };
            (target_id.clone(), answer)
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
