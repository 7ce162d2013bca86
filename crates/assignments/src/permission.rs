//! Permission vocabulary shared by project and repository scopes

use crate::error::Error;
use crate::scope::ScopeKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A permission the server can attach to a user or group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Permission {
    ProjectRead,
    ProjectWrite,
    ProjectAdmin,
    /// Project-level right to create repositories
    RepoCreate,
    RepoRead,
    RepoWrite,
    RepoAdmin,
}

impl Permission {
    /// Every known permission, in wire-table order
    pub const ALL: [Self; 7] = [
        Self::ProjectRead,
        Self::ProjectWrite,
        Self::ProjectAdmin,
        Self::RepoCreate,
        Self::RepoRead,
        Self::RepoWrite,
        Self::RepoAdmin,
    ];

    /// Wire name used by the server API.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProjectRead => "PROJECT_READ",
            Self::ProjectWrite => "PROJECT_WRITE",
            Self::ProjectAdmin => "PROJECT_ADMIN",
            Self::RepoCreate => "REPO_CREATE",
            Self::RepoRead => "REPO_READ",
            Self::RepoWrite => "REPO_WRITE",
            Self::RepoAdmin => "REPO_ADMIN",
        }
    }

    /// Parse a wire name. Matching is exact; the server never lowercases these.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    /// Kind of scope this permission can be granted on
    pub fn scope_kind(self) -> ScopeKind {
        match self {
            Self::ProjectRead | Self::ProjectWrite | Self::ProjectAdmin | Self::RepoCreate => {
                ScopeKind::Project
            }
            Self::RepoRead | Self::RepoWrite | Self::RepoAdmin => ScopeKind::Repository,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| Error::UnknownPermission(s.to_string()))
    }
}

impl TryFrom<String> for Permission {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Permission> for String {
    fn from(permission: Permission) -> Self {
        permission.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_table() {
        for permission in Permission::ALL {
            assert_eq!(Permission::from_name(permission.as_str()), Some(permission));
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        assert!(Permission::from_name("project_read").is_none());
        let err = "SYS_ADMIN".parse::<Permission>().unwrap_err();
        assert!(matches!(err, Error::UnknownPermission(ref name) if name == "SYS_ADMIN"));
    }

    #[test]
    fn test_repo_create_is_a_project_permission() {
        assert_eq!(Permission::RepoCreate.scope_kind(), ScopeKind::Project);
        assert_eq!(Permission::RepoWrite.scope_kind(), ScopeKind::Repository);
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&Permission::ProjectAdmin).unwrap();
        assert_eq!(json, "\"PROJECT_ADMIN\"");
        let parsed: Permission = serde_json::from_str("\"REPO_READ\"").unwrap();
        assert_eq!(parsed, Permission::RepoRead);
        assert!(serde_json::from_str::<Permission>("\"READ\"").is_err());
    }
}
