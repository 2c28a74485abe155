//! Common test utilities for the bowlise cache facade.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bowlise::{
    AccessControl, AccessControlBackend, BulkResult, BulkSubjectTargetParams, CachedAccessControl,
    CacheConfig, CreateAccessControlParams, DeleteAccessControlParams, Error, Permission, Result,
    Role, SubjectHasPermissionParams, SubjectHasRoleParams, SubjectTargetKey, SubjectTargetParams,
    UpdateAccessControlParams,
};

/// Scripted backend that counts every call it receives.
///
/// Grants are stored as role lists per subject/target; permission lists are
/// derived from the granted roles' permissions.
#[derive(Default)]
pub struct CountingBackend {
    roles: Vec<Role>,
    permissions: Vec<Permission>,
    grants: Mutex<HashMap<SubjectTargetKey, Result<Vec<Role>>>>,
    omitted: HashSet<String>,
    fail_bulk: bool,
    fail_writes: bool,
    catalog_failures: Mutex<usize>,
    delay: Option<Duration>,
    calls: Mutex<HashMap<&'static str, usize>>,
    bulk_requests: Mutex<Vec<Vec<String>>>,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Global role catalogue.
    pub fn with_roles(mut self, roles: Vec<Role>) -> Self {
        self.roles = roles;
        self
    }

    /// Global permission catalogue.
    pub fn with_permissions(mut self, permissions: Vec<Permission>) -> Self {
        self.permissions = permissions;
        self
    }

    /// Grant roles to a subject on a target.
    pub fn with_grant(self, subject_id: &str, target_id: &str, roles: Vec<Role>) -> Self {
        self.grant(subject_id, target_id, roles);
        self
    }

    /// Make lookups for a subject/target fail.
    pub fn with_failure(self, subject_id: &str, target_id: &str, error: Error) -> Self {
        self.grants
            .lock()
            .unwrap()
            .insert(SubjectTargetKey::new(subject_id, target_id), Err(error));
        self
    }

    /// Leave a target out of every bulk reply.
    pub fn omitting(mut self, target_id: &str) -> Self {
        self.omitted.insert(target_id.to_string());
        self
    }

    /// Fail every bulk request as a whole.
    pub fn failing_bulk(mut self) -> Self {
        self.fail_bulk = true;
        self
    }

    /// Reject every update and delete.
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Fail the next `count` role catalogue fetches.
    pub fn failing_catalog(self, count: usize) -> Self {
        *self.catalog_failures.lock().unwrap() = count;
        self
    }

    /// Sleep before answering list lookups.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Change a grant behind the facade's back.
    pub fn grant(&self, subject_id: &str, target_id: &str, roles: Vec<Role>) {
        self.grants
            .lock()
            .unwrap()
            .insert(SubjectTargetKey::new(subject_id, target_id), Ok(roles));
    }

    /// Number of calls received for one operation.
    pub fn calls(&self, op: &str) -> usize {
        self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    /// Number of calls received across all operations.
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    /// Target ids of every bulk request, in arrival order.
    pub fn bulk_requests(&self) -> Vec<Vec<String>> {
        self.bulk_requests.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str) {
        *self.calls.lock().unwrap().entry(op).or_insert(0) += 1;
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn role(&self, handle: &str) -> Role {
        self.roles
            .iter()
            .find(|r| r.handle == handle)
            .cloned()
            .unwrap_or_else(|| Role::new(handle))
    }

    fn roles_for(&self, key: &SubjectTargetKey) -> Result<Vec<Role>> {
        self.grants
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn permissions_for(&self, key: &SubjectTargetKey) -> Result<Vec<Permission>> {
        Ok(self
            .roles_for(key)?
            .into_iter()
            .flat_map(|role| role.permissions)
            .collect())
    }

    fn bulk<T>(
        &self,
        params: &BulkSubjectTargetParams,
        lookup: impl Fn(&SubjectTargetKey) -> Result<Vec<T>>,
    ) -> Result<BulkResult<Vec<T>>> {
        self.bulk_requests
            .lock()
            .unwrap()
            .push(params.target_ids.clone());
        if self.fail_bulk {
            return Err(Error::backend("bulk lookup unavailable"));
        }
        Ok(params
            .target_ids
            .iter()
            .filter(|t| !self.omitted.contains(t.as_str()))
            .map(|t| (t.clone(), lookup(&params.key_for(t))))
            .collect())
    }
}

#[async_trait]
impl AccessControlBackend for CountingBackend {
    async fn list_all_roles(&self) -> Result<Vec<Role>> {
        self.record("list_all_roles");
        self.pause().await;
        {
            let mut failures = self.catalog_failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(Error::backend("transient"));
            }
        }
        Ok(self.roles.clone())
    }

    async fn list_all_permissions(&self) -> Result<Vec<Permission>> {
        self.record("list_all_permissions");
        Ok(self.permissions.clone())
    }

    async fn create_access_control(
        &self,
        params: CreateAccessControlParams,
    ) -> Result<AccessControl> {
        self.record("create_access_control");
        let role = self.role(&params.role_handle);
        self.grants.lock().unwrap().insert(params.key(), Ok(vec![role]));
        Ok(AccessControl::new(
            params.subject_id,
            params.target_id,
            params.target_type,
            params.role_handle,
        ))
    }

    async fn update_access_control(
        &self,
        params: UpdateAccessControlParams,
    ) -> Result<AccessControl> {
        self.record("update_access_control");
        if self.fail_writes {
            return Err(Error::backend("update rejected"));
        }
        let role = self.role(&params.role_handle);
        self.grants.lock().unwrap().insert(params.key(), Ok(vec![role]));
        Ok(AccessControl::new(
            params.subject_id,
            params.target_id,
            "document",
            params.role_handle,
        ))
    }

    async fn delete_access_control(&self, params: DeleteAccessControlParams) -> Result<bool> {
        self.record("delete_access_control");
        if self.fail_writes {
            return Err(Error::backend("delete rejected"));
        }
        Ok(self.grants.lock().unwrap().remove(&params.key()).is_some())
    }

    async fn list_roles_for_subject(&self, params: SubjectTargetParams) -> Result<Vec<Role>> {
        self.record("list_roles_for_subject");
        self.pause().await;
        self.roles_for(&params.key())
    }

    async fn list_permissions_for_subject(
        &self,
        params: SubjectTargetParams,
    ) -> Result<Vec<Permission>> {
        self.record("list_permissions_for_subject");
        self.pause().await;
        self.permissions_for(&params.key())
    }

    async fn subject_has_role(&self, params: SubjectHasRoleParams) -> Result<bool> {
        self.record("subject_has_role");
        Ok(self
            .roles_for(&params.key())?
            .iter()
            .any(|r| r.handle == params.role_handle))
    }

    async fn subject_has_permission(&self, params: SubjectHasPermissionParams) -> Result<bool> {
        self.record("subject_has_permission");
        Ok(self
            .permissions_for(&params.key())?
            .iter()
            .any(|p| p.handle == params.permission_handle))
    }

    async fn bulk_list_roles_for_subject(
        &self,
        params: BulkSubjectTargetParams,
    ) -> Result<BulkResult<Vec<Role>>> {
        self.record("bulk_list_roles_for_subject");
        self.pause().await;
        self.bulk(&params, |key| self.roles_for(key))
    }

    async fn bulk_list_permissions_for_subject(
        &self,
        params: BulkSubjectTargetParams,
    ) -> Result<BulkResult<Vec<Permission>>> {
        self.record("bulk_list_permissions_for_subject");
        self.pause().await;
        self.bulk(&params, |key| self.permissions_for(key))
    }

    fn name(&self) -> &str {
        "counting"
    }
}

/// A role carrying one permission with the same target type.
pub fn role_with_permission(handle: &str, permission: &str) -> Role {
    Role::new(handle).with_permission(Permission::new(permission, "document"))
}

/// Wrap a backend with the default configuration.
pub fn cached(backend: CountingBackend) -> (Arc<CountingBackend>, CachedAccessControl<CountingBackend>) {
    cached_with(backend, CacheConfig::default())
}

/// Wrap a backend with an explicit configuration.
pub fn cached_with(
    backend: CountingBackend,
    config: CacheConfig,
) -> (Arc<CountingBackend>, CachedAccessControl<CountingBackend>) {
    let backend = Arc::new(backend);
    let acl = CachedAccessControl::with_config(Arc::clone(&backend), config);
    (backend, acl)
}
