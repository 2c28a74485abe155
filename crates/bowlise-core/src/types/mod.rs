//! Access-control data model.

pub mod access_control;
pub mod params;
pub mod role;

pub use access_control::AccessControl;
pub use params::{
    BulkSubjectHasPermissionParams, BulkSubjectHasRoleParams, BulkSubjectTargetParams,
    CreateAccessControlParams, DeleteAccessControlParams, SubjectHasPermissionParams,
    SubjectHasRoleParams, SubjectTargetParams, UpdateAccessControlParams,
};
pub use role::{contains_handle, HasHandle, Permission, Role, TargetType};
