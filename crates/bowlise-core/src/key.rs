//! Composite subject/target key.
//!
//! Every per-subject-per-target cache is indexed by [`SubjectTargetKey`].
//! Keeping the two ids as separate fields (instead of joining them into one
//! string) means ids may contain any character, including `:`, without two
//! distinct pairs ever mapping to the same key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the relationship between one subject and one target.
///
/// # Examples
///
/// ```
/// use bowlise_core::SubjectTargetKey;
///
/// let a = SubjectTargetKey::new("a:b", "c");
/// let b = SubjectTargetKey::new("a", "b:c");
/// assert_ne!(a, b);
/// assert_eq!(a.subject_id(), "a:b");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubjectTargetKey {
    subject_id: String,
    target_id: String,
}

impl SubjectTargetKey {
    /// Creates a key from a subject id and a target id.
    pub fn new<S, T>(subject_id: S, target_id: T) -> Self
    where
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            subject_id: subject_id.into(),
            target_id: target_id.into(),
        }
    }

    /// Returns the subject id.
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// Returns the target id.
    pub fn target_id(&self) -> &str {
        &self.target_id
    }
}

/// Renders `subject:target`. For logs only; never parsed back.
impl fmt::Display for SubjectTargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.subject_id, self.target_id)
    }
}

impl<S, T> From<(S, T)> for SubjectTargetKey
where
    S: Into<String>,
    T: Into<String>,
{
    fn from((subject_id, target_id): (S, T)) -> Self {
        Self::new(subject_id, target_id)
    }
}
