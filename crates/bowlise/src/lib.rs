//! # bowlise
//!
//! Caching facade for access-control backends.
//!
//! [`CachedAccessControl`] wraps any [`AccessControlBackend`] and implements
//! the same trait, so callers can swap it in without code changes. It keeps
//! the global role and permission lists, created access-control records, and
//! per subject/target role and permission lists in memory, and invalidates a
//! subject/target pair whenever it is written through the facade.
//!
//! ```no_run
//! use std::sync::Arc;
//! use bowlise::{AccessControlBackend, CachedAccessControl, SubjectHasRoleParams};
//!
//! # async fn demo<B: AccessControlBackend + 'static>(backend: Arc<B>) -> bowlise::Result<()> {
//! let acl = CachedAccessControl::new(backend);
//! let allowed = acl
//!     .subject_has_role(SubjectHasRoleParams::new("user-1", "doc-7", "editor"))
//!     .await?;
//! # let _ = allowed;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod config;
pub mod facade;
pub mod stats;

mod store;

pub use config::CacheConfig;
pub use facade::CachedAccessControl;
pub use stats::{CacheStats, CacheStatsSnapshot};

pub use bowlise_core::{
    AccessControl, AccessControlBackend, BulkResult, BulkSubjectHasPermissionParams,
    BulkSubjectHasRoleParams, BulkSubjectTargetParams, CreateAccessControlParams,
    DeleteAccessControlParams, Error, Permission, Result, Role, SubjectHasPermissionParams,
    SubjectHasRoleParams, SubjectTargetKey, SubjectTargetParams, TargetType,
    UpdateAccessControlParams,
};
