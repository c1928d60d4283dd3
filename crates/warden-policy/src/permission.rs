// permission.rs — Permission tokens and the collection a policy entry owns.
//
// Warden treats a permission as an opaque token with an `implies` relation.
// The embedding system may bring its own permission types; `ResourcePermission`
// and `AllPermission` are the reference implementations used by the tests and
// by embedders that don't need anything richer.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;
use crate::pattern::TargetPattern;

/// Action marker meaning "every action".
pub const ALL_ACTIONS: &str = "*";

/// A requestable capability.
///
/// `implies` answers "does holding `self` also give you `other`?".
pub trait Permission: fmt::Display + Send + Sync {
    fn implies(&self, other: &dyn Permission) -> bool;

    /// Permission family, e.g. `"file"` or `"socket"`.
    fn kind(&self) -> &str;

    /// What the permission is about, e.g. a path or host.
    fn target(&self) -> &str;

    /// Comma-separated action list, e.g. `"read,write"`.
    fn actions(&self) -> &str;
}

/// An aggregate of permissions supporting the implication test.
pub trait PermissionCollection {
    fn implies(&self, permission: &dyn Permission) -> bool;

    /// Members in insertion order, for diagnostics.
    fn elements(&self) -> Box<dyn Iterator<Item = &dyn Permission> + '_>;
}

/// Heterogeneous, insertion-ordered permission collection.
///
/// Implies a permission when any member does. Duplicates are kept.
#[derive(Clone, Default)]
pub struct Permissions {
    members: Vec<Arc<dyn Permission>>,
}

impl Permissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, permission: Arc<dyn Permission>) {
        self.members.push(permission);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl PermissionCollection for Permissions {
    fn implies(&self, permission: &dyn Permission) -> bool {
        self.members.iter().any(|member| member.implies(permission))
    }

    fn elements(&self) -> Box<dyn Iterator<Item = &dyn Permission> + '_> {
        Box::new(self.members.iter().map(|member| member.as_ref()))
    }
}

impl fmt::Debug for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.members.iter().map(|m| m.to_string()))
            .finish()
    }
}

/// A permission over a resource family, a target glob, and a set of actions.
///
/// `ResourcePermission::new("file", "/srv/data/**", "read")` implies
/// `("file", "/srv/data/a.txt", "read")` but not the same target with
/// `"read,write"`, and not a request that names no actions.
///
/// The target is compiled as a glob when the permission is built; see
/// [`TargetPattern`] for the matching rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePermission {
    pub kind: String,
    pub target: TargetPattern,
    #[serde(default)]
    pub actions: String,
}

impl ResourcePermission {
    pub fn new(
        kind: impl Into<String>,
        target: &str,
        actions: impl Into<String>,
    ) -> Result<Self, PolicyError> {
        Ok(Self {
            kind: kind.into(),
            target: TargetPattern::new(target)?,
            actions: actions.into(),
        })
    }
}

impl Permission for ResourcePermission {
    fn implies(&self, other: &dyn Permission) -> bool {
        self.kind == other.kind()
            && self.target.matches(other.target())
            && actions_cover(&self.actions, other.actions())
    }

    fn kind(&self) -> &str {
        &self.kind
    }

    fn target(&self) -> &str {
        self.target.as_str()
    }

    fn actions(&self) -> &str {
        &self.actions
    }
}

impl fmt::Display for ResourcePermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.actions.is_empty() {
            write!(f, "({} \"{}\")", self.kind, self.target)
        } else {
            write!(f, "({} \"{}\" \"{}\")", self.kind, self.target, self.actions)
        }
    }
}

/// Implies every permission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllPermission;

impl Permission for AllPermission {
    fn implies(&self, _other: &dyn Permission) -> bool {
        true
    }

    fn kind(&self) -> &str {
        "all"
    }

    fn target(&self) -> &str {
        "<all permissions>"
    }

    fn actions(&self) -> &str {
        "<all actions>"
    }
}

impl fmt::Display for AllPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(all)")
    }
}

fn action_set(actions: &str) -> BTreeSet<&str> {
    actions
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .collect()
}

/// True when every action in `requested` is held.
///
/// A request naming no actions is only covered by `*`.
fn actions_cover(held: &str, requested: &str) -> bool {
    let held = action_set(held);
    if held.contains(ALL_ACTIONS) {
        return true;
    }
    let requested = action_set(requested);
    !requested.is_empty() && requested.is_subset(&held)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perm(kind: &str, target: &str, actions: &str) -> ResourcePermission {
        ResourcePermission::new(kind, target, actions).unwrap()
    }

    #[test]
    fn exact_permission_implies_itself() {
        let read = perm("file", "file.txt", "read");
        assert!(read.implies(&perm("file", "file.txt", "read")));
        assert!(!read.implies(&perm("file", "file.txt", "write")));
    }

    #[test]
    fn kinds_are_separate() {
        let read = perm("file", "**", "read");
        assert!(!read.implies(&perm("socket", "localhost", "read")));
    }

    #[test]
    fn glob_target_matching() {
        let data = perm("file", "/srv/data/**", "read");
        assert!(data.implies(&perm("file", "/srv/data/reports/q1.csv", "read")));
        assert!(!data.implies(&perm("file", "/etc/passwd", "read")));
    }

    #[test]
    fn invalid_glob_is_rejected_when_built() {
        assert!(matches!(
            ResourcePermission::new("file", "/srv/[data", "read"),
            Err(PolicyError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn traversal_cannot_escape_granted_directory() {
        let data = perm("file", "/srv/data/**", "read");
        assert!(!data.implies(&perm("file", "/srv/data/../../etc/shadow", "read")));
        assert!(!data.implies(&perm("file", "/srv/data/%2e%2e/secrets/key.pem", "read")));
        assert!(data.implies(&perm("file", "/srv/data/notes..txt", "read")));
    }

    #[test]
    fn single_star_does_not_cross_directories() {
        let top = perm("file", "/srv/*", "read");
        assert!(top.implies(&perm("file", "/srv/index.html", "read")));
        assert!(!top.implies(&perm("file", "/srv/data/index.html", "read")));
    }

    #[test]
    fn request_without_actions_is_not_implied() {
        let read = perm("file", "/srv/data/**", "read");
        assert!(!read.implies(&perm("file", "/srv/data/x", "")));
        assert!(!read.implies(&perm("file", "/srv/data/x", " , ")));

        let any = perm("file", "/srv/data/**", "*");
        assert!(any.implies(&perm("file", "/srv/data/x", "")));
    }

    #[test]
    fn actions_must_be_a_subset() {
        let rw = perm("file", "file.txt", "read, write");
        assert!(rw.implies(&perm("file", "file.txt", "write")));
        assert!(rw.implies(&perm("file", "file.txt", "read,write")));
        assert!(!rw.implies(&perm("file", "file.txt", "read,delete")));

        let any = perm("file", "file.txt", "*");
        assert!(any.implies(&perm("file", "file.txt", "delete")));
    }

    #[test]
    fn all_permission_implies_everything() {
        assert!(AllPermission.implies(&perm("socket", "example.com:443", "connect")));
    }

    #[test]
    fn collection_implies_when_any_member_does() {
        let mut permissions = Permissions::new();
        assert!(!permissions.implies(&perm("file", "file.txt", "read")));

        permissions.add(Arc::new(perm("file", "file.txt", "read")));
        permissions.add(Arc::new(perm("socket", "localhost:*", "connect")));
        permissions.add(Arc::new(perm("file", "file.txt", "read")));

        assert_eq!(permissions.len(), 3);
        assert!(permissions.implies(&perm("socket", "localhost:8080", "connect")));
        assert!(!permissions.implies(&perm("file", "file.txt", "write")));
    }

    #[test]
    fn elements_keep_insertion_order() {
        let mut permissions = Permissions::new();
        permissions.add(Arc::new(perm("file", "b", "read")));
        permissions.add(Arc::new(AllPermission));
        let rendered: Vec<String> = permissions.elements().map(|p| p.to_string()).collect();
        assert_eq!(rendered, vec!["(file \"b\" \"read\")", "(all)"]);
    }
}
