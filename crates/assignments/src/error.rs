//! Error types for assignment reconciliation

use crate::permission::Permission;
use crate::scope::{Scope, ScopeKind};
use crate::types::PrincipalKind;
use thiserror::Error;

/// Errors that can occur while reconciling permission assignments
///
/// Collaborator failures keep the collaborator's own error as `source`,
/// untouched, so callers can inspect exactly what the backend reported.
#[derive(Error, Debug)]
pub enum Error {
    /// Granting a permission to a user failed
    #[error("failed to update user permission for {name}")]
    UpdateUserPermission {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// Granting a permission to a group failed
    #[error("failed to update group permission for {name}")]
    UpdateGroupPermission {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// Revoking a user's permission failed
    #[error("failed to remove user permission for {name}")]
    RemoveUserPermission {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// Revoking a group's permission failed
    #[error("failed to remove group permission for {name}")]
    RemoveGroupPermission {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// The current ACL of a scope could not be read
    #[error("failed to read permissions of {scope}")]
    ReadPermissions {
        scope: Scope,
        #[source]
        source: anyhow::Error,
    },

    /// The cancellation flag was raised before the next mutation
    #[error("reconciliation cancelled")]
    Cancelled,

    /// Permission name outside the known vocabulary
    #[error("unknown permission: {0}")]
    UnknownPermission(String),

    /// Permission exists but does not apply to this kind of scope
    #[error("permission {permission} is not valid for a {kind} scope")]
    InvalidPermission {
        kind: ScopeKind,
        permission: Permission,
    },

    /// Scope string could not be parsed
    #[error("invalid scope: {0:?}")]
    InvalidScope(String),

    /// An update was asked to move assignments between scopes
    #[error("scope changed from {from} to {to}, the resource must be replaced")]
    ScopeChanged { from: Scope, to: Scope },
}

impl Error {
    /// Error for a failed grant of `kind`
    pub(crate) fn grant_failed(kind: PrincipalKind, name: &str, source: anyhow::Error) -> Self {
        let name = name.to_string();
        match kind {
            PrincipalKind::User => Self::UpdateUserPermission { name, source },
            PrincipalKind::Group => Self::UpdateGroupPermission { name, source },
        }
    }

    /// Error for a failed revoke of `kind`
    pub(crate) fn revoke_failed(kind: PrincipalKind, name: &str, source: anyhow::Error) -> Self {
        let name = name.to_string();
        match kind {
            PrincipalKind::User => Self::RemoveUserPermission { name, source },
            PrincipalKind::Group => Self::RemoveGroupPermission { name, source },
        }
    }
}

/// Result type for assignment operations
pub type Result<T> = std::result::Result<T, Error>;
