//! Per subject/target role and permission lists, and membership checks.

use bowlise::{
    AccessControlBackend, CacheConfig, Error, Role, SubjectHasPermissionParams,
    SubjectHasRoleParams, SubjectTargetKey, SubjectTargetParams,
};

use crate::common::{cached, cached_with, role_with_permission, CountingBackend};

fn editor_on_doc() -> CountingBackend {
    CountingBackend::new().with_grant("user-1", "doc-1", vec![role_with_permission("editor", "write")])
}

#[tokio::test]
async fn test_list_roles_cached_per_key() {
    let (backend, acl) = cached(editor_on_doc());
    let params = SubjectTargetParams::new("user-1", "doc-1");

    let first = acl.list_roles_for_subject(params.clone()).await.unwrap();
    let second = acl.list_roles_for_subject(params).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first[0].handle, "editor");
    assert_eq!(backend.calls("list_roles_for_subject"), 1);
    assert!(acl.is_cached(&SubjectTargetKey::new("user-1", "doc-1")));
}

#[tokio::test]
async fn test_distinct_keys_fetch_separately() {
    let (backend, acl) = cached(editor_on_doc());

    acl.list_roles_for_subject(SubjectTargetParams::new("user-1", "doc-1"))
        .await
        .unwrap();
    acl.list_roles_for_subject(SubjectTargetParams::new("user-1", "doc-2"))
        .await
        .unwrap();
    acl.list_roles_for_subject(SubjectTargetParams::new("user-2", "doc-1"))
        .await
        .unwrap();

    assert_eq!(backend.calls("list_roles_for_subject"), 3);
    assert_eq!(acl.cached_keys(), 3);
}

#[tokio::test]
async fn test_keys_do_not_collide_on_separator() {
    let (backend, acl) = cached(
        CountingBackend::new()
            .with_grant("a:b", "c", vec![Role::new("owner")])
            .with_grant("a", "b:c", vec![Role::new("viewer")]),
    );

    let left = acl
        .list_roles_for_subject(SubjectTargetParams::new("a:b", "c"))
        .await
        .unwrap();
    let right = acl
        .list_roles_for_subject(SubjectTargetParams::new("a", "b:c"))
        .await
        .unwrap();

    assert_eq!(left[0].handle, "owner");
    assert_eq!(right[0].handle, "viewer");
    assert_eq!(backend.calls("list_roles_for_subject"), 2);
}

#[tokio::test]
async fn test_failure_is_cached() {
    let (backend, acl) = cached(CountingBackend::new().with_failure(
        "user-1",
        "doc-1",
        Error::backend("connection reset"),
    ));
    let params = SubjectTargetParams::new("user-1", "doc-1");

    let first = acl.list_roles_for_subject(params.clone()).await.unwrap_err();
    let second = acl.list_roles_for_subject(params).await.unwrap_err();

    assert_eq!(first.to_string(), second.to_string());
    assert!(first.to_string().contains("connection reset"));
    assert_eq!(backend.calls("list_roles_for_subject"), 1);
}

#[tokio::test]
async fn test_failure_not_cached_when_disabled() {
    let (backend, acl) = cached_with(
        CountingBackend::new().with_failure("user-1", "doc-1", Error::backend("timeout")),
        CacheConfig {
            cache_errors: false,
            ..Default::default()
        },
    );
    let params = SubjectTargetParams::new("user-1", "doc-1");

    assert!(acl.list_roles_for_subject(params.clone()).await.is_err());
    assert!(acl.list_roles_for_subject(params).await.is_err());

    assert_eq!(backend.calls("list_roles_for_subject"), 2);
    assert_eq!(acl.cached_keys(), 0);
}

#[tokio::test]
async fn test_list_permissions_cached_per_key() {
    let (backend, acl) = cached(editor_on_doc());
    let params = SubjectTargetParams::new("user-1", "doc-1");

    let permissions = acl.list_permissions_for_subject(params.clone()).await.unwrap();
    acl.list_permissions_for_subject(params).await.unwrap();

    assert_eq!(permissions.len(), 1);
    assert_eq!(permissions[0].handle, "write");
    assert_eq!(backend.calls("list_permissions_for_subject"), 1);
}

#[tokio::test]
async fn test_role_and_permission_lists_cached_separately() {
    let (backend, acl) = cached(editor_on_doc());
    let params = SubjectTargetParams::new("user-1", "doc-1");

    acl.list_roles_for_subject(params.clone()).await.unwrap();
    acl.list_permissions_for_subject(params).await.unwrap();

    assert_eq!(backend.calls("list_roles_for_subject"), 1);
    assert_eq!(backend.calls("list_permissions_for_subject"), 1);
    assert_eq!(acl.cached_keys(), 1);
}

#[tokio::test]
async fn test_has_role_answered_from_cached_list() {
    let (backend, acl) = cached(editor_on_doc());
    acl.list_roles_for_subject(SubjectTargetParams::new("user-1", "doc-1"))
        .await
        .unwrap();

    let has_editor = acl
        .subject_has_role(SubjectHasRoleParams::new("user-1", "doc-1", "editor"))
        .await
        .unwrap();
    let has_owner = acl
        .subject_has_role(SubjectHasRoleParams::new("user-1", "doc-1", "owner"))
        .await
        .unwrap();

    assert!(has_editor);
    assert!(!has_owner);
    assert_eq!(backend.calls("subject_has_role"), 0);
}

#[tokio::test]
async fn test_has_role_delegates_without_cached_list() {
    let (backend, acl) = cached(editor_on_doc());
    let params = SubjectHasRoleParams::new("user-1", "doc-1", "editor");

    assert!(acl.subject_has_role(params.clone()).await.unwrap());
    assert!(acl.subject_has_role(params).await.unwrap());

    // Membership answers are not cached on their own.
    assert_eq!(backend.calls("subject_has_role"), 2);
    assert_eq!(backend.calls("list_roles_for_subject"), 0);
    assert_eq!(acl.cached_keys(), 0);
}

#[tokio::test]
async fn test_has_role_returns_cached_failure() {
    let (backend, acl) = cached(CountingBackend::new().with_failure(
        "user-1",
        "doc-1",
        Error::backend("connection reset"),
    ));
    acl.list_roles_for_subject(SubjectTargetParams::new("user-1", "doc-1"))
        .await
        .unwrap_err();

    let err = acl
        .subject_has_role(SubjectHasRoleParams::new("user-1", "doc-1", "editor"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Backend { .. }));
    assert_eq!(backend.calls("subject_has_role"), 0);
}

#[tokio::test]
async fn test_has_permission_answered_from_cached_list() {
    let (backend, acl) = cached(editor_on_doc());
    acl.list_permissions_for_subject(SubjectTargetParams::new("user-1", "doc-1"))
        .await
        .unwrap();

    let can_write = acl
        .subject_has_permission(SubjectHasPermissionParams::new("user-1", "doc-1", "write"))
        .await
        .unwrap();
    let can_delete = acl
        .subject_has_permission(SubjectHasPermissionParams::new("user-1", "doc-1", "delete"))
        .await
        .unwrap();

    assert!(can_write);
    assert!(!can_delete);
    assert_eq!(backend.calls("subject_has_permission"), 0);
}

#[tokio::test]
async fn test_has_permission_ignores_cached_role_list() {
    let (backend, acl) = cached(editor_on_doc());
    acl.list_roles_for_subject(SubjectTargetParams::new("user-1", "doc-1"))
        .await
        .unwrap();

    let can_write = acl
        .subject_has_permission(SubjectHasPermissionParams::new("user-1", "doc-1", "write"))
        .await
        .unwrap();

    assert!(can_write);
    assert_eq!(backend.calls("subject_has_permission"), 1);
}
