//! Collaborator traits and the apply context
//!
//! These traits keep the engine independent of any server client. The
//! engine only ever asks three things of the outside world: does a principal
//! exist, set (or clear) a principal's permission, and what does the ACL
//! currently look like.

use crate::error::{Error, Result};
use crate::permission::Permission;
use crate::scope::Scope;
use crate::types::{ObjectPermissions, Principal};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Existence check for users and groups
///
/// A lookup that returns `Ok(None)` means the principal is unknown upstream;
/// the engine then leaves it out of the grant set without failing.
pub trait PrincipalDirectory {
    /// Look up a user by name
    fn find_user(&self, name: &str) -> anyhow::Result<Option<Principal>>;

    /// Look up a group by name. The returned principal carries the server's
    /// spelling of the name.
    fn find_group(&self, name: &str) -> anyhow::Result<Option<Principal>>;
}

/// Side-effecting permission setter bound to one scope
///
/// `None` revokes every permission the principal holds on the scope.
pub trait Grantor {
    fn set_user_permission(
        &self,
        user: &str,
        permission: Option<Permission>,
    ) -> anyhow::Result<()>;

    fn set_group_permission(
        &self,
        group: &str,
        permission: Option<Permission>,
    ) -> anyhow::Result<()>;
}

/// Server operations for project and repository ACLs
///
/// Implement this trait to connect the engine to a server, or to an
/// in-memory model for testing.
pub trait PermissionBackend {
    /// Set or clear (`None`) a user's permission on a scope
    fn set_user_permission(
        &self,
        scope: &Scope,
        user: &str,
        permission: Option<Permission>,
    ) -> anyhow::Result<()>;

    /// Set or clear (`None`) a group's permission on a scope
    fn set_group_permission(
        &self,
        scope: &Scope,
        group: &str,
        permission: Option<Permission>,
    ) -> anyhow::Result<()>;

    /// Read the current ACL of a scope
    fn read_permissions(&self, scope: &Scope) -> anyhow::Result<ObjectPermissions>;
}

/// A [`PermissionBackend`] with its scope fixed, usable as a [`Grantor`]
pub struct ScopedGrantor<'a, B: PermissionBackend + ?Sized> {
    backend: &'a B,
    scope: &'a Scope,
}

impl<'a, B: PermissionBackend + ?Sized> ScopedGrantor<'a, B> {
    pub fn new(backend: &'a B, scope: &'a Scope) -> Self {
        Self { backend, scope }
    }
}

impl<B: PermissionBackend + ?Sized> Grantor for ScopedGrantor<'_, B> {
    fn set_user_permission(
        &self,
        user: &str,
        permission: Option<Permission>,
    ) -> anyhow::Result<()> {
        self.backend.set_user_permission(self.scope, user, permission)
    }

    fn set_group_permission(
        &self,
        group: &str,
        permission: Option<Permission>,
    ) -> anyhow::Result<()> {
        self.backend.set_group_permission(self.scope, group, permission)
    }
}

/// Context passed to every mutating operation
#[derive(Debug, Clone, Default)]
pub struct ApplyContext {
    /// Record mutations without calling the grantor
    pub dry_run: bool,
    cancel: Option<Arc<AtomicBool>>,
}

impl ApplyContext {
    /// Create a new apply context
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            cancel: None,
        }
    }

    /// Attach a cancellation flag shared with the caller
    ///
    /// Once the flag is set, no further mutation is issued.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Fail with [`Error::Cancelled`] if cancellation was requested
    pub fn check_cancelled(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}
