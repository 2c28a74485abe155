//! Roles, permissions and target types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classifies the kind of target a permission applies to ("document",
/// "project", "subject", ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetType(String);

impl TargetType {
    /// Creates a target type tag.
    pub fn new<S: Into<String>>(tag: S) -> Self {
        Self(tag.into())
    }

    /// Returns the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TargetType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TargetType {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Anything identified by a unique handle.
///
/// Membership checks and handle indexing in the cache are written against
/// this trait so roles and permissions share one code path.
pub trait HasHandle {
    /// Returns the unique handle.
    fn handle(&self) -> &str;
}

/// Returns `true` if any item in `items` carries `handle`.
pub fn contains_handle<T: HasHandle>(items: &[T], handle: &str) -> bool {
    items.iter().any(|item| item.handle() == handle)
}

/// A specific action that can be performed on a kind of target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Unique identifier.
    pub handle: String,

    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether the permission is enabled.
    pub enabled: bool,

    /// The kind of target this permission applies to.
    pub target_type: TargetType,
}

impl Permission {
    /// Creates an enabled permission with no name or description.
    pub fn new<H, T>(handle: H, target_type: T) -> Self
    where
        H: Into<String>,
        T: Into<TargetType>,
    {
        Self {
            handle: handle.into(),
            name: None,
            description: None,
            enabled: true,
            target_type: target_type.into(),
        }
    }

    /// Sets the display name.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the description.
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl HasHandle for Permission {
    fn handle(&self) -> &str {
        &self.handle
    }
}

/// A named set of permissions that can be assigned to a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Unique identifier.
    pub handle: String,

    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether the role is enabled.
    pub enabled: bool,

    /// Permissions granted by this role, in order.
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl Role {
    /// Creates an enabled role with no permissions.
    pub fn new<H: Into<String>>(handle: H) -> Self {
        Self {
            handle: handle.into(),
            name: None,
            description: None,
            enabled: true,
            permissions: Vec::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the description.
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Appends a permission.
    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }
}

impl HasHandle for Role {
    fn handle(&self) -> &str {
        &self.handle
    }
}
