//! Bowlise Core: the access-control data model, backend contract, and errors.
//!
//! This crate provides the foundational types used across all Bowlise crates.
//! It has no internal Bowlise dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`backend`]: The [`AccessControlBackend`] trait every store implements
//! - [`error`]: Error types and Result alias
//! - [`key`]: The composite [`SubjectTargetKey`]
//! - [`types`]: Roles, permissions, access-control records, request params

pub mod backend;
pub mod error;
pub mod key;
pub mod types;

// Re-export key types at crate root for convenience
pub use backend::{membership, AccessControlBackend, BulkResult};
pub use error::{Error, ErrorSource, Result};
pub use key::SubjectTargetKey;
pub use types::{
    contains_handle, AccessControl, BulkSubjectHasPermissionParams, BulkSubjectHasRoleParams,
    BulkSubjectTargetParams, CreateAccessControlParams, DeleteAccessControlParams, HasHandle,
    Permission, Role, SubjectHasPermissionParams, SubjectHasRoleParams, SubjectTargetParams,
    TargetType, UpdateAccessControlParams,
};
