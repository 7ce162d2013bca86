//! In-memory server model
//!
//! [`MemoryBackend`] keeps users, groups and per-scope ACLs in memory and
//! behaves like the real server where the engine can tell the difference:
//! group names are matched case-insensitively and stored in the server's
//! spelling, unknown principals and scopes are rejected. It backs offline
//! planning and the tests.

use crate::context::{PermissionBackend, PrincipalDirectory};
use crate::permission::Permission;
use crate::scope::Scope;
use crate::types::{ObjectPermissions, Principal, PrincipalKind, PrincipalPermission};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Serializable server contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSnapshot {
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub groups: Vec<String>,
    /// ACL per existing scope
    #[serde(default)]
    pub permissions: BTreeMap<Scope, ObjectPermissions>,
}

impl RemoteSnapshot {
    pub fn new<U, G>(users: U, groups: G) -> Self
    where
        U: IntoIterator,
        U::Item: Into<String>,
        G: IntoIterator,
        G::Item: Into<String>,
    {
        Self {
            users: users.into_iter().map(Into::into).collect(),
            groups: groups.into_iter().map(Into::into).collect(),
            permissions: BTreeMap::new(),
        }
    }

    /// Register a scope with an empty ACL, keeping an existing one
    pub fn add_scope(&mut self, scope: Scope) {
        self.permissions.entry(scope).or_default();
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.add_scope(scope);
        self
    }

    fn canonical_user(&self, name: &str) -> Option<&str> {
        self.users
            .iter()
            .find(|u| u.as_str() == name)
            .map(String::as_str)
    }

    fn canonical_group(&self, name: &str) -> Option<&str> {
        let wanted = name.to_lowercase();
        self.groups
            .iter()
            .find(|g| g.to_lowercase() == wanted)
            .map(String::as_str)
    }
}

/// A permission call received by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub scope: Scope,
    pub kind: PrincipalKind,
    pub name: String,
    pub permission: Option<Permission>,
}

/// [`PermissionBackend`] and [`PrincipalDirectory`] over a [`RemoteSnapshot`]
#[derive(Debug, Default)]
pub struct MemoryBackend {
    snapshot: RefCell<RemoteSnapshot>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl MemoryBackend {
    pub fn new(snapshot: RemoteSnapshot) -> Self {
        Self {
            snapshot: RefCell::new(snapshot),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Copy of the current server contents
    pub fn snapshot(&self) -> RemoteSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn into_snapshot(self) -> RemoteSnapshot {
        self.snapshot.into_inner()
    }

    /// Every permission call received so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    fn set_permission(
        &self,
        scope: &Scope,
        kind: PrincipalKind,
        name: &str,
        permission: Option<Permission>,
    ) -> anyhow::Result<()> {
        self.calls.borrow_mut().push(RecordedCall {
            scope: scope.clone(),
            kind,
            name: name.to_string(),
            permission,
        });

        if let Some(permission) = permission
            && !scope.kind().allows(permission)
        {
            anyhow::bail!("{permission} cannot be granted on {scope}");
        }

        let mut snapshot = self.snapshot.borrow_mut();
        let canonical = match kind {
            PrincipalKind::User => snapshot.canonical_user(name),
            PrincipalKind::Group => snapshot.canonical_group(name),
        }
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("{kind} {name} does not exist"))?;

        let acl = snapshot
            .permissions
            .get_mut(scope)
            .ok_or_else(|| anyhow::anyhow!("{} {scope} does not exist", scope.kind()))?;
        let entries = match kind {
            PrincipalKind::User => &mut acl.users,
            PrincipalKind::Group => &mut acl.groups,
        };

        entries.retain(|entry| entry.name != canonical);
        if let Some(permission) = permission {
            entries.push(PrincipalPermission::new(canonical, permission));
        }
        Ok(())
    }
}

impl PrincipalDirectory for MemoryBackend {
    fn find_user(&self, name: &str) -> anyhow::Result<Option<Principal>> {
        Ok(self
            .snapshot
            .borrow()
            .canonical_user(name)
            .map(Principal::new))
    }

    fn find_group(&self, name: &str) -> anyhow::Result<Option<Principal>> {
        Ok(self
            .snapshot
            .borrow()
            .canonical_group(name)
            .map(Principal::new))
    }
}

impl PermissionBackend for MemoryBackend {
    fn set_user_permission(
        &self,
        scope: &Scope,
        user: &str,
        permission: Option<Permission>,
    ) -> anyhow::Result<()> {
        self.set_permission(scope, PrincipalKind::User, user, permission)
    }

    fn set_group_permission(
        &self,
        scope: &Scope,
        group: &str,
        permission: Option<Permission>,
    ) -> anyhow::Result<()> {
        self.set_permission(scope, PrincipalKind::Group, group, permission)
    }

    fn read_permissions(&self, scope: &Scope) -> anyhow::Result<ObjectPermissions> {
        self.snapshot
            .borrow()
            .permissions
            .get(scope)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("{} {scope} does not exist", scope.kind()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> MemoryBackend {
        MemoryBackend::new(
            RemoteSnapshot::new(["alice"], ["Developers"]).with_scope(Scope::project("PRJ")),
        )
    }

    #[test]
    fn test_group_lookup_returns_server_spelling() {
        let backend = backend();
        let found = backend.find_group("developers").unwrap().unwrap();
        assert_eq!(found.name, "Developers");
        assert!(backend.find_user("Alice").unwrap().is_none());
    }

    #[test]
    fn test_grant_replaces_previous_permission() {
        let backend = backend();
        let scope = Scope::project("PRJ");
        backend
            .set_user_permission(&scope, "alice", Some(Permission::ProjectRead))
            .unwrap();
        backend
            .set_user_permission(&scope, "alice", Some(Permission::ProjectAdmin))
            .unwrap();

        let acl = backend.read_permissions(&scope).unwrap();
        assert_eq!(
            acl.users,
            vec![PrincipalPermission::new("alice", Permission::ProjectAdmin)]
        );
    }

    #[test]
    fn test_revoke_group_case_insensitively() {
        let backend = backend();
        let scope = Scope::project("PRJ");
        backend
            .set_group_permission(&scope, "developers", Some(Permission::ProjectRead))
            .unwrap();
        backend.set_group_permission(&scope, "DEVELOPERS", None).unwrap();
        assert!(backend.read_permissions(&scope).unwrap().is_empty());
        assert_eq!(backend.calls().len(), 2);
    }

    #[test]
    fn test_rejects_unknown_principal_scope_and_foreign_permission() {
        let backend = backend();
        let project = Scope::project("PRJ");
        assert!(backend
            .set_user_permission(&project, "ghost", Some(Permission::ProjectRead))
            .is_err());
        assert!(backend
            .set_user_permission(&Scope::project("NOPE"), "alice", Some(Permission::ProjectRead))
            .is_err());
        assert!(backend
            .set_user_permission(&project, "alice", Some(Permission::RepoRead))
            .is_err());
        assert!(backend.read_permissions(&Scope::repository("PRJ", "x")).is_err());
    }

    #[test]
    fn test_snapshot_serializes_scope_keys() {
        let snapshot = backend().into_snapshot();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json["permissions"]["PRJ"].is_object());
        let back: RemoteSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
    }
}
