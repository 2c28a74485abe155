//! The caching facade.
//!
//! [`CachedAccessControl`] wraps any [`AccessControlBackend`] and implements
//! the same trait, answering from its cache where it can:
//!
//! | Operation | Cache behaviour |
//! |-----------|-----------------|
//! | `list_all_roles` / `list_all_permissions` | Fetched once, served until [`clear`](CachedAccessControl::clear) |
//! | `create_access_control` | First writer per subject/target wins; repeats are served from cache |
//! | `update_access_control` / `delete_access_control` | Invalidate the subject/target before and after the backend call |
//! | `list_*_for_subject` | Cached per subject/target, failures included |
//! | `subject_has_*` | Answered from a cached list if present, otherwise delegated uncached |
//! | `bulk_*` | One backend call for the uncached targets only |
//!
//! # Limitations
//!
//! - Global role/permission lists go stale if the backend changes them;
//!   recreate the facade or call `clear()`.
//! - Without `coalesce_in_flight`, concurrent misses on the same key each
//!   call the backend.

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use bowlise_core::{
    contains_handle, membership, AccessControl, AccessControlBackend, BulkResult,
    BulkSubjectHasPermissionParams, BulkSubjectHasRoleParams, BulkSubjectTargetParams,
    CreateAccessControlParams, DeleteAccessControlParams, Error, HasHandle, Permission, Result,
    Role, SubjectHasPermissionParams, SubjectHasRoleParams, SubjectTargetKey, SubjectTargetParams,
    UpdateAccessControlParams,
};

use crate::config::CacheConfig;
use crate::stats::{CacheStats, CacheStatsSnapshot};
use crate::store::{index_by_handle, lock, Catalog, KeyedLists, Pending, Stamp};

/// Caching access-control facade.
///
/// All cache state is owned by the instance and lives exactly as long as it
/// does. Locks are never held across an `.await`.
pub struct CachedAccessControl<B: ?Sized> {
    backend: Arc<B>,
    config: CacheConfig,
    name: String,
    stats: CacheStats,
    roles: Mutex<Catalog<Role>>,
    permissions: Mutex<Catalog<Permission>>,
    access_controls: Mutex<HashMap<SubjectTargetKey, AccessControl>>,
    subject_roles: Mutex<KeyedLists<Role>>,
    subject_permissions: Mutex<KeyedLists<Permission>>,
}

impl<B> CachedAccessControl<B>
where
    B: AccessControlBackend + ?Sized + 'static,
{
    /// Wrap a backend with the default configuration.
    pub fn new(backend: Arc<B>) -> Self {
        Self::with_config(backend, CacheConfig::default())
    }

    /// Wrap a backend with an explicit configuration.
    pub fn with_config(backend: Arc<B>, config: CacheConfig) -> Self {
        let name = format!("cached({})", backend.name());
        log::info!("Created access-control cache over '{}'", backend.name());
        Self {
            backend,
            config,
            name,
            stats: CacheStats::default(),
            roles: Mutex::default(),
            permissions: Mutex::default(),
            access_controls: Mutex::default(),
            subject_roles: Mutex::default(),
            subject_permissions: Mutex::default(),
        }
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// The active configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Current hit/miss counters.
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    /// Number of subject/target pairs with a cached role or permission list.
    pub fn cached_keys(&self) -> usize {
        let mut keys: HashSet<SubjectTargetKey> =
            lock(&self.subject_roles).entries.keys().cloned().collect();
        keys.extend(lock(&self.subject_permissions).entries.keys().cloned());
        keys.len()
    }

    /// Whether anything is cached for a subject/target pair.
    pub fn is_cached(&self, key: &SubjectTargetKey) -> bool {
        let has_record = lock(&self.access_controls).contains_key(key);
        let has_roles = lock(&self.subject_roles).entries.contains_key(key);
        let has_permissions = lock(&self.subject_permissions).entries.contains_key(key);
        has_record || has_roles || has_permissions
    }

    /// The cached access-control record for a pair, if any.
    pub fn cached_access_control(&self, key: &SubjectTargetKey) -> Option<AccessControl> {
        lock(&self.access_controls).get(key).cloned()
    }

    /// Drop everything cached for a subject/target pair.
    pub fn invalidate(&self, key: &SubjectTargetKey) {
        self.stats.record_invalidation();
        self.forget(key);
        log::info!("Invalidated cache entries for {key}");
    }

    /// Drop all cached state, global lists included.
    pub fn clear(&self) {
        lock(&self.roles).clear();
        lock(&self.permissions).clear();
        lock(&self.access_controls).clear();
        lock(&self.subject_roles).clear();
        lock(&self.subject_permissions).clear();
        self.stats.record_invalidation();
        log::info!("Cleared access-control cache");
    }

    fn forget(&self, key: &SubjectTargetKey) {
        lock(&self.access_controls).remove(key);
        self.forget_lists(key);
    }

    fn forget_lists(&self, key: &SubjectTargetKey) {
        lock(&self.subject_roles).remove(key);
        lock(&self.subject_permissions).remove(key);
    }

    fn keep<T>(&self, result: &Result<T>) -> bool {
        result.is_ok() || self.config.cache_errors
    }

    /// Serve a global list from its catalog, fetching it on first use.
    async fn cached_catalog<T, F>(
        &self,
        catalog: &Mutex<Catalog<T>>,
        what: &str,
        fetch: F,
    ) -> Result<Vec<T>>
    where
        T: HasHandle + Clone + Send + Sync + 'static,
        F: FnOnce(Arc<B>) -> BoxFuture<'static, Result<Vec<T>>> + Send,
    {
        if !self.config.enabled {
            self.stats.record_backend_call();
            return fetch(Arc::clone(&self.backend)).await;
        }

        let (pending, generation) = {
            let mut catalog = lock(catalog);
            if !catalog.items.is_empty() {
                self.stats.record_hit();
                log::debug!("Cache hit: all {what}");
                return Ok(catalog.items.clone());
            }
            self.stats.record_miss();
            log::debug!("Cache miss: all {what}");

            let generation = catalog.generation;
            match &catalog.pending {
                Some(pending) if self.config.coalesce_in_flight => {
                    self.stats.record_coalesced();
                    (pending.clone(), generation)
                }
                _ => {
                    self.stats.record_backend_call();
                    let pending = fetch(Arc::clone(&self.backend)).shared();
                    if self.config.coalesce_in_flight {
                        catalog.pending = Some(pending.clone());
                    }
                    (pending, generation)
                }
            }
        };

        let result = pending.clone().await;

        let mut catalog = lock(catalog);
        if catalog
            .pending
            .as_ref()
            .is_some_and(|current| current.ptr_eq(&pending))
        {
            catalog.pending = None;
        }
        let items = result?;
        if catalog.generation != generation {
            // Cleared while the fetch was in flight; answer without caching.
            return Ok(index_by_handle(items));
        }
        if catalog.items.is_empty() {
            catalog.fill(items);
        }
        Ok(catalog.items.clone())
    }

    /// Serve one subject/target list, fetching and caching it on a miss.
    async fn cached_list<T, F>(
        &self,
        lists: &Mutex<KeyedLists<T>>,
        key: SubjectTargetKey,
        fetch: F,
    ) -> Result<Vec<T>>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce(Arc<B>) -> BoxFuture<'static, Result<Vec<T>>> + Send,
    {
        if !self.config.enabled {
            self.stats.record_backend_call();
            return fetch(Arc::clone(&self.backend)).await;
        }

        let (pending, stamp): (Pending<Vec<T>>, Stamp) = {
            let mut lists = lock(lists);
            if let Some(entry) = lists.entries.get(&key) {
                self.stats.record_hit();
                log::debug!("Cache hit: {key}");
                return entry.clone();
            }
            self.stats.record_miss();
            log::debug!("Cache miss: {key}");

            let stamp = lists.stamp(&key);
            match lists.pending.get(&key) {
                Some(pending) if self.config.coalesce_in_flight => {
                    self.stats.record_coalesced();
                    (pending.clone(), stamp)
                }
                _ => {
                    self.stats.record_backend_call();
                    let pending = fetch(Arc::clone(&self.backend)).shared();
                    if self.config.coalesce_in_flight {
                        lists.pending.insert(key.clone(), pending.clone());
                    }
                    (pending, stamp)
                }
            }
        };

        let result = pending.clone().await;

        let mut lists = lock(lists);
        if lists
            .pending
            .get(&key)
            .is_some_and(|current| current.ptr_eq(&pending))
        {
            lists.pending.remove(&key);
        }
        if self.keep(&result) {
            lists.store(key, stamp, &result);
        }
        result
    }

    /// Answer a membership check from a cached list, if one is present.
    fn cached_membership<T: HasHandle>(
        &self,
        lists: &Mutex<KeyedLists<T>>,
        key: &SubjectTargetKey,
        handle: &str,
    ) -> Option<Result<bool>> {
        if !self.config.enabled {
            return None;
        }

        let lists = lock(lists);
        let answer = lists.entries.get(key).map(|entry| match entry {
            Ok(items) => Ok(contains_handle(items, handle)),
            Err(e) => Err(e.clone()),
        });
        match answer {
            Some(_) => {
                self.stats.record_hit();
                log::debug!("Cache hit: {key} has '{handle}'");
            }
            None => self.stats.record_miss(),
        }
        answer
    }

    /// Serve a bulk list request, calling the backend once for every
    /// uncached target.
    async fn cached_bulk<T, F>(
        &self,
        lists: &Mutex<KeyedLists<T>>,
        params: BulkSubjectTargetParams,
        fetch: F,
    ) -> Result<BulkResult<Vec<T>>>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce(Arc<B>, BulkSubjectTargetParams) -> BoxFuture<'static, Result<BulkResult<Vec<T>>>>
            + Send,
    {
        if !self.config.enabled {
            self.stats.record_backend_call();
            return fetch(Arc::clone(&self.backend), params).await;
        }

        // Partition into a snapshot of cached entries and the missing ids.
        let mut answers: BulkResult<Vec<T>> = HashMap::with_capacity(params.target_ids.len());
        let mut missing: Vec<(String, Stamp)> = Vec::new();
        {
            let lists = lock(lists);
            let mut seen = HashSet::new();
            for target_id in &params.target_ids {
                if !seen.insert(target_id.as_str()) {
                    continue;
                }
                let key = params.key_for(target_id);
                match lists.entries.get(&key) {
                    Some(entry) => {
                        answers.insert(target_id.clone(), entry.clone());
                    }
                    None => missing.push((target_id.clone(), lists.stamp(&key))),
                }
            }
        }
        self.stats.record_hits(answers.len() as u64);
        self.stats.record_misses(missing.len() as u64);

        if missing.is_empty() {
            log::debug!(
                "Bulk cache hit: {} targets for subject {}",
                answers.len(),
                params.subject_id
            );
            return Ok(answers);
        }

        log::debug!(
            "Bulk cache miss: fetching {} of {} targets for subject {}",
            missing.len(),
            params.target_ids.len(),
            params.subject_id
        );
        self.stats.record_backend_call();
        let request = BulkSubjectTargetParams {
            subject_id: params.subject_id.clone(),
            target_ids: missing.iter().map(|(id, _)| id.clone()).collect(),
        };
        let mut fetched = fetch(Arc::clone(&self.backend), request).await?;

        let mut lists = lock(lists);
        for (target_id, stamp) in missing {
            let key = params.key_for(&target_id);
            let answer = match fetched.remove(&target_id) {
                Some(result) => {
                    if let Err(e) = &result {
                        log::warn!("Backend failed for {key}: {e}");
                    }
                    if self.keep(&result) {
                        lists.store(key, stamp, &result);
                    }
                    result
                }
                None => {
                    log::warn!("Backend reply has no entry for {key}");
                    Err(Error::missing_bulk_entry(target_id.as_str()))
                }
            };
            answers.insert(target_id, answer);
        }

        Ok(answers)
    }
}

#[async_trait]
impl<B> AccessControlBackend for CachedAccessControl<B>
where
    B: AccessControlBackend + ?Sized + 'static,
{
    async fn list_all_roles(&self) -> Result<Vec<Role>> {
        self.cached_catalog(&self.roles, "roles", |backend| {
            async move { backend.list_all_roles().await }.boxed()
        })
        .await
    }

    async fn list_all_permissions(&self) -> Result<Vec<Permission>> {
        self.cached_catalog(&self.permissions, "permissions", |backend| {
            async move { backend.list_all_permissions().await }.boxed()
        })
        .await
    }

    async fn create_access_control(
        &self,
        params: CreateAccessControlParams,
    ) -> Result<AccessControl> {
        let key = params.key();
        if !self.config.enabled {
            self.stats.record_backend_call();
            return self.backend.create_access_control(params).await;
        }

        let existing = lock(&self.access_controls).get(&key).cloned();
        if let Some(existing) = existing {
            self.stats.record_hit();
            log::debug!("Cache hit: access control {key}");
            return Ok(existing);
        }
        self.stats.record_miss();

        self.stats.record_backend_call();
        let created = self.backend.create_access_control(params).await?;

        // Lists cached before the grant no longer match the backend.
        self.forget_lists(&key);
        self.stats.record_invalidation();
        let cached = lock(&self.access_controls)
            .entry(key)
            .or_insert(created)
            .clone();
        Ok(cached)
    }

    async fn update_access_control(
        &self,
        params: UpdateAccessControlParams,
    ) -> Result<AccessControl> {
        let key = params.key();
        if !self.config.enabled {
            self.stats.record_backend_call();
            return self.backend.update_access_control(params).await;
        }

        self.stats.record_invalidation();
        self.forget(&key);
        log::info!("Invalidated {key} for update");

        self.stats.record_backend_call();
        let updated = self.backend.update_access_control(params).await;
        // A read that started during the call may have cached pre-update lists.
        self.forget_lists(&key);
        let updated = updated?;

        lock(&self.access_controls).insert(key, updated.clone());
        Ok(updated)
    }

    async fn delete_access_control(&self, params: DeleteAccessControlParams) -> Result<bool> {
        let key = params.key();
        if !self.config.enabled {
            self.stats.record_backend_call();
            return self.backend.delete_access_control(params).await;
        }

        self.stats.record_invalidation();
        self.forget(&key);
        log::info!("Invalidated {key} for delete");

        self.stats.record_backend_call();
        let deleted = self.backend.delete_access_control(params).await;
        self.forget(&key);
        deleted
    }

    async fn list_roles_for_subject(&self, params: SubjectTargetParams) -> Result<Vec<Role>> {
        self.cached_list(&self.subject_roles, params.key(), move |backend| {
            async move { backend.list_roles_for_subject(params).await }.boxed()
        })
        .await
    }

    async fn list_permissions_for_subject(
        &self,
        params: SubjectTargetParams,
    ) -> Result<Vec<Permission>> {
        self.cached_list(&self.subject_permissions, params.key(), move |backend| {
            async move { backend.list_permissions_for_subject(params).await }.boxed()
        })
        .await
    }

    async fn subject_has_role(&self, params: SubjectHasRoleParams) -> Result<bool> {
        if let Some(answer) =
            self.cached_membership(&self.subject_roles, &params.key(), &params.role_handle)
        {
            return answer;
        }
        self.stats.record_backend_call();
        self.backend.subject_has_role(params).await
    }

    async fn subject_has_permission(&self, params: SubjectHasPermissionParams) -> Result<bool> {
        if let Some(answer) = self.cached_membership(
            &self.subject_permissions,
            &params.key(),
            &params.permission_handle,
        ) {
            return answer;
        }
        self.stats.record_backend_call();
        self.backend.subject_has_permission(params).await
    }

    async fn bulk_list_roles_for_subject(
        &self,
        params: BulkSubjectTargetParams,
    ) -> Result<BulkResult<Vec<Role>>> {
        self.cached_bulk(&self.subject_roles, params, |backend, request| {
            async move { backend.bulk_list_roles_for_subject(request).await }.boxed()
        })
        .await
    }

    async fn bulk_list_permissions_for_subject(
        &self,
        params: BulkSubjectTargetParams,
    ) -> Result<BulkResult<Vec<Permission>>> {
        self.cached_bulk(&self.subject_permissions, params, |backend, request| {
            async move { backend.bulk_list_permissions_for_subject(request).await }.boxed()
        })
        .await
    }

    async fn bulk_subject_has_role(
        &self,
        params: BulkSubjectHasRoleParams,
    ) -> Result<BulkResult<bool>> {
        if !self.config.enabled {
            self.stats.record_backend_call();
            return self.backend.bulk_subject_has_role(params).await;
        }
        let lists = self.bulk_list_roles_for_subject(params.targets()).await?;
        Ok(membership(&lists, &params.target_ids, &params.role_handle))
    }

    async fn bulk_subject_has_permission(
        &self,
        params: BulkSubjectHasPermissionParams,
    ) -> Result<BulkResult<bool>> {
        if !self.config.enabled {
            self.stats.record_backend_call();
            return self.backend.bulk_subject_has_permission(params).await;
        }
        let lists = self
            .bulk_list_permissions_for_subject(params.targets())
            .await?;
        Ok(membership(
            &lists,
            &params.target_ids,
            &params.permission_handle,
        ))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<B: ?Sized> std::fmt::Debug for CachedAccessControl<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedAccessControl")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}
