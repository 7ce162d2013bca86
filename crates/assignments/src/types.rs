//! Core types for permission assignment

use crate::error::{Error, Result};
use crate::permission::Permission;
use crate::scope::ScopeKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A prioritized grant of one permission to a set of users and groups
///
/// Several rules may name the same principal; the one with the highest
/// priority decides that principal's permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRule {
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub groups: Vec<String>,
    pub permission: Permission,
    pub priority: i64,
}

impl AssignmentRule {
    /// Create a rule with no principals
    pub fn new(permission: Permission, priority: i64) -> Self {
        Self {
            users: Vec::new(),
            groups: Vec::new(),
            permission,
            priority,
        }
    }

    /// Add users to the rule
    pub fn with_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users.extend(users.into_iter().map(Into::into));
        self
    }

    /// Add groups to the rule
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.extend(groups.into_iter().map(Into::into));
        self
    }

    /// Check the rule's permission against a scope's vocabulary
    pub fn validate(&self, kind: ScopeKind) -> Result<()> {
        if kind.allows(self.permission) {
            Ok(())
        } else {
            Err(Error::InvalidPermission {
                kind,
                permission: self.permission,
            })
        }
    }
}

/// Users and groups are resolved, granted and reported separately
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    User,
    Group,
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrincipalKind::User => write!(f, "user"),
            PrincipalKind::Group => write!(f, "group"),
        }
    }
}

/// A user or group as known to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Canonical name as the server spells it
    pub name: String,
}

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One entry of a server-side access-control list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalPermission {
    pub name: String,
    pub permission: Permission,
}

impl PrincipalPermission {
    pub fn new(name: impl Into<String>, permission: Permission) -> Self {
        Self {
            name: name.into(),
            permission,
        }
    }
}

/// Access-control list of one scope as read from the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectPermissions {
    #[serde(default)]
    pub users: Vec<PrincipalPermission>,
    #[serde(default)]
    pub groups: Vec<PrincipalPermission>,
}

impl ObjectPermissions {
    /// Entries of one principal kind
    pub fn entries(&self, kind: PrincipalKind) -> &[PrincipalPermission] {
        match kind {
            PrincipalKind::User => &self.users,
            PrincipalKind::Group => &self.groups,
        }
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.groups.is_empty()
    }
}

/// A principal confirmed to hold (or be granted) a permission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedAssignment {
    pub name: String,
    pub permission: Permission,
}

impl ComputedAssignment {
    pub fn new(name: impl Into<String>, permission: Permission) -> Self {
        Self {
            name: name.into(),
            permission,
        }
    }
}

impl From<&PrincipalPermission> for ComputedAssignment {
    fn from(entry: &PrincipalPermission) -> Self {
        Self::new(entry.name.clone(), entry.permission)
    }
}

/// What a mutation does to one principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum MutationAction {
    /// Set the permission; `previous` is the last applied value, if any
    Grant {
        permission: Permission,
        previous: Option<Permission>,
    },
    /// Remove every permission of the principal on the scope
    Revoke,
}

/// A grant or revoke issued (or, in a dry run, planned) against the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutation {
    pub kind: PrincipalKind,
    pub name: String,
    #[serde(flatten)]
    pub action: MutationAction,
}

impl Mutation {
    pub fn grant(
        kind: PrincipalKind,
        name: impl Into<String>,
        permission: Permission,
        previous: Option<Permission>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            action: MutationAction::Grant {
                permission,
                previous,
            },
        }
    }

    pub fn revoke(kind: PrincipalKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            action: MutationAction::Revoke,
        }
    }

    /// Check if this mutation removes access
    pub fn is_revoke(&self) -> bool {
        matches!(self.action, MutationAction::Revoke)
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            MutationAction::Grant {
                permission,
                previous: Some(previous),
            } => write!(f, "{} {}: {previous} -> {permission}", self.kind, self.name),
            MutationAction::Grant {
                permission,
                previous: None,
            } => write!(f, "{} {}: grant {permission}", self.kind, self.name),
            MutationAction::Revoke => write!(f, "{} {}: revoke", self.kind, self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_validation_follows_scope_vocabulary() {
        let rule = AssignmentRule::new(Permission::RepoWrite, 1).with_users(["alice"]);
        assert!(rule.validate(ScopeKind::Repository).is_ok());
        assert!(matches!(
            rule.validate(ScopeKind::Project),
            Err(Error::InvalidPermission {
                kind: ScopeKind::Project,
                permission: Permission::RepoWrite
            })
        ));
    }

    #[test]
    fn test_rule_deserializes_with_missing_principal_lists() {
        let rule: AssignmentRule =
            serde_json::from_str(r#"{"groups":["devs"],"permission":"PROJECT_READ","priority":3}"#)
                .unwrap();
        assert!(rule.users.is_empty());
        assert_eq!(rule.groups, vec!["devs".to_string()]);
        assert_eq!(rule.priority, 3);
    }

    #[test]
    fn test_mutation_display() {
        let changed = Mutation::grant(
            PrincipalKind::User,
            "alice",
            Permission::ProjectAdmin,
            Some(Permission::ProjectRead),
        );
        assert_eq!(changed.to_string(), "user alice: PROJECT_READ -> PROJECT_ADMIN");
        let revoke = Mutation::revoke(PrincipalKind::Group, "devs");
        assert_eq!(revoke.to_string(), "group devs: revoke");
        assert!(revoke.is_revoke());
    }
}
