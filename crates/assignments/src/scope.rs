//! Managed scopes: a project, or a repository inside a project
//!
//! One reconciliation implementation serves both kinds; backends receive the
//! [`Scope`] and decide which API endpoint it maps to.

use crate::error::Error;
use crate::permission::Permission;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a managed scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    Project,
    Repository,
}

impl ScopeKind {
    /// Permissions that may be assigned on this kind of scope
    pub fn permissions(self) -> Vec<Permission> {
        Permission::ALL
            .into_iter()
            .filter(|p| p.scope_kind() == self)
            .collect()
    }

    /// Check whether `permission` may be assigned on this kind of scope
    pub fn allows(self, permission: Permission) -> bool {
        permission.scope_kind() == self
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::Project => write!(f, "project"),
            ScopeKind::Repository => write!(f, "repository"),
        }
    }
}

/// The object whose access-control list is managed
///
/// Written as `KEY` for a project and `KEY/slug` for a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Scope {
    Project { key: String },
    Repository { project: String, slug: String },
}

impl Scope {
    /// Create a project scope
    pub fn project(key: impl Into<String>) -> Self {
        Self::Project { key: key.into() }
    }

    /// Create a repository scope
    pub fn repository(project: impl Into<String>, slug: impl Into<String>) -> Self {
        Self::Repository {
            project: project.into(),
            slug: slug.into(),
        }
    }

    pub fn kind(&self) -> ScopeKind {
        match self {
            Self::Project { .. } => ScopeKind::Project,
            Self::Repository { .. } => ScopeKind::Repository,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project { key } => write!(f, "{key}"),
            Self::Repository { project, slug } => write!(f, "{project}/{slug}"),
        }
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidScope(s.to_string());
        match s.split_once('/') {
            None if !s.is_empty() => Ok(Self::project(s)),
            None => Err(invalid()),
            Some((project, slug)) => {
                if project.is_empty() || slug.is_empty() || slug.contains('/') {
                    return Err(invalid());
                }
                Ok(Self::repository(project, slug))
            }
        }
    }
}

impl TryFrom<String> for Scope {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.to_string()
    }
}
