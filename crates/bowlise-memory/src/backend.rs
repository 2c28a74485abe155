//! In-memory implementation of the access-control backend contract.
//!
//! # Semantics
//!
//! - A subject holds at most one live record per target, so the roles for a
//!   subject/target pair are either empty or the single role that record
//!   names.
//! - Creating a record for a pair that already has a live one is a
//!   [`Error::Conflict`]; a soft-deleted record is replaced.
//! - A record naming a role that is missing from the catalog yields
//!   [`Error::NotFound`]. Bulk lookups report it for that target alone.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bowlise_core::{
    contains_handle, AccessControl, AccessControlBackend, BulkResult, BulkSubjectTargetParams,
    CreateAccessControlParams, DeleteAccessControlParams, Error, Permission, Result, Role,
    SubjectHasPermissionParams, SubjectHasRoleParams, SubjectTargetKey, SubjectTargetParams,
    UpdateAccessControlParams,
};

#[derive(Default)]
struct State {
    roles: Vec<Role>,
    permissions: Vec<Permission>,
    records: HashMap<SubjectTargetKey, AccessControl>,
}

impl State {
    fn role(&self, handle: &str) -> Option<&Role> {
        self.roles.iter().find(|role| role.handle == handle)
    }

    fn live_record(&self, key: &SubjectTargetKey) -> Option<&AccessControl> {
        self.records.get(key).filter(|record| !record.is_deleted())
    }

    fn roles_for(&self, key: &SubjectTargetKey) -> Result<Vec<Role>> {
        let Some(record) = self.live_record(key) else {
            return Ok(Vec::new());
        };
        self.role(&record.role_handle)
            .map(|role| vec![role.clone()])
            .ok_or_else(|| Error::not_found("role", record.role_handle.as_str()))
    }

    fn permissions_for(&self, key: &SubjectTargetKey) -> Result<Vec<Permission>> {
        Ok(self
            .roles_for(key)?
            .into_iter()
            .flat_map(|role| role.permissions)
            .collect())
    }
}

/// Access-control backend backed by process memory.
///
/// Cheap to share behind an `Arc`; all state sits behind one `RwLock`.
///
/// # Limitations
///
/// - Nothing is persisted
/// - Bulk lookups take the read lock once per request, not per target
#[derive(Default)]
pub struct MemoryBackend {
    state: RwLock<State>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the role catalog.
    pub fn with_roles(self, roles: Vec<Role>) -> Self {
        self.write().roles = roles;
        self
    }

    /// Seed the permission catalog.
    pub fn with_permissions(self, permissions: Vec<Permission>) -> Self {
        self.write().permissions = permissions;
        self
    }

    /// Add or replace a role in the catalog.
    pub fn upsert_role(&self, role: Role) {
        let mut state = self.write();
        match state.roles.iter_mut().find(|r| r.handle == role.handle) {
            Some(existing) => *existing = role,
            None => state.roles.push(role),
        }
    }

    /// Number of stored records, soft-deleted ones included.
    pub fn record_count(&self) -> usize {
        self.read().records.len()
    }

    /// Fetch the stored record for a pair, soft-deleted or not.
    pub fn record(&self, key: &SubjectTargetKey) -> Option<AccessControl> {
        self.read().records.get(key).cloned()
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl AccessControlBackend for MemoryBackend {
    async fn list_all_roles(&self) -> Result<Vec<Role>> {
        Ok(self.read().roles.clone())
    }

    async fn list_all_permissions(&self) -> Result<Vec<Permission>> {
        Ok(self.read().permissions.clone())
    }

    async fn create_access_control(
        &self,
        params: CreateAccessControlParams,
    ) -> Result<AccessControl> {
        let key = params.key();
        let mut state = self.write();

        if state.live_record(&key).is_some() {
            return Err(Error::conflict(format!(
                "access control already exists for {key}"
            )));
        }
        if state.role(&params.role_handle).is_none() {
            return Err(Error::not_found("role", params.role_handle));
        }

        let record = AccessControl::new(
            params.subject_id,
            params.target_id,
            params.target_type,
            params.role_handle,
        );
        log::debug!("Created access control {key} ({})", record.role_handle);
        state.records.insert(key, record.clone());
        Ok(record)
    }

    async fn update_access_control(
        &self,
        params: UpdateAccessControlParams,
    ) -> Result<AccessControl> {
        let key = params.key();
        let mut state = self.write();

        if state.role(&params.role_handle).is_none() {
            return Err(Error::not_found("role", params.role_handle));
        }

        let record = state
            .records
            .get_mut(&key)
            .filter(|record| !record.is_deleted())
            .ok_or_else(|| Error::not_found("access control", key.to_string()))?;
        record.role_handle = params.role_handle;
        record.updated_at = Utc::now();

        log::debug!("Updated access control {key} ({})", record.role_handle);
        Ok(record.clone())
    }

    async fn delete_access_control(&self, params: DeleteAccessControlParams) -> Result<bool> {
        let key = params.key();
        let mut state = self.write();

        let deleted = if params.soft_delete {
            match state.records.get_mut(&key) {
                Some(record) if !record.is_deleted() => {
                    let now = Utc::now();
                    record.deleted_at = Some(now);
                    record.updated_at = now;
                    true
                }
                _ => false,
            }
        } else {
            state.records.remove(&key).is_some()
        };

        log::debug!(
            "Delete access control {key} (soft: {}): {deleted}",
            params.soft_delete
        );
        Ok(deleted)
    }

    async fn list_roles_for_subject(&self, params: SubjectTargetParams) -> Result<Vec<Role>> {
        self.read().roles_for(&params.key())
    }

    async fn list_permissions_for_subject(
        &self,
        params: SubjectTargetParams,
    ) -> Result<Vec<Permission>> {
        self.read().permissions_for(&params.key())
    }

    async fn subject_has_role(&self, params: SubjectHasRoleParams) -> Result<bool> {
        let roles = self.read().roles_for(&params.key())?;
        Ok(contains_handle(&roles, &params.role_handle))
    }

    async fn subject_has_permission(&self, params: SubjectHasPermissionParams) -> Result<bool> {
        let permissions = self.read().permissions_for(&params.key())?;
        Ok(contains_handle(&permissions, &params.permission_handle))
    }

    async fn bulk_list_roles_for_subject(
        &self,
        params: BulkSubjectTargetParams,
    ) -> Result<BulkResult<Vec<Role>>> {
        let state = self.read();
        Ok(params
            .target_ids
            .iter()
            .map(|target_id| {
                let roles = state.roles_for(&params.key_for(target_id));
                (target_id.clone(), roles)
            })
            .collect())
    }

    async fn bulk_list_permissions_for_subject(
        &self,
        params: BulkSubjectTargetParams,
    ) -> Result<BulkResult<Vec<Permission>>> {
        let state = self.read();
        Ok(params
            .target_ids
            .iter()
            .map(|target_id| {
                let permissions = state.permissions_for(&params.key_for(target_id));
                (target_id.clone(), permissions)
            })
            .collect())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("MemoryBackend")
            .field("roles", &state.roles.len())
            .field("permissions", &state.permissions.len())
            .field("records", &state.records.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
