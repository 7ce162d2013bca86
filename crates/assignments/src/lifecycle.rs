//! Create / read / update / delete of one managed scope
//!
//! Binds the engine to a [`PermissionBackend`] for a given [`Scope`]. The
//! same functions serve project and repository scopes.

use crate::attestation::{AssignmentResult, PermissionAttestation};
use crate::context::{ApplyContext, PermissionBackend, PrincipalDirectory, ScopedGrantor};
use crate::engine::{self, Reconciliation};
use crate::error::{Error, Result};
use crate::order::AssignmentOrder;
use crate::scope::Scope;
use crate::types::{AssignmentRule, Mutation, ObjectPermissions};
use serde::{Deserialize, Serialize};

fn default_retain_on_delete() -> bool {
    true
}

/// Desired permissions of one scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionsSpec {
    pub scope: Scope,

    /// Opaque marker; changing it re-sends every grant on the next update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_version: Option<String>,

    /// Leave the server's ACL untouched when the scope is deleted
    #[serde(default = "default_retain_on_delete")]
    pub retain_on_delete: bool,

    #[serde(default)]
    pub assignments: Vec<AssignmentRule>,
}

impl PermissionsSpec {
    /// A spec with no assignments, as produced when importing an existing scope
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            assignment_version: None,
            retain_on_delete: default_retain_on_delete(),
            assignments: Vec::new(),
        }
    }

    pub fn with_assignments(mut self, assignments: Vec<AssignmentRule>) -> Self {
        self.assignments = assignments;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.assignment_version = Some(version.into());
        self
    }

    pub fn retain_on_delete(mut self, retain: bool) -> Self {
        self.retain_on_delete = retain;
        self
    }

    /// Resolve the assignments into one permission per principal
    pub fn order(&self) -> AssignmentOrder {
        AssignmentOrder::resolve(&self.assignments)
    }

    /// Check every rule against the scope's permission vocabulary
    pub fn validate(&self) -> Result<()> {
        let kind = self.scope.kind();
        self.assignments
            .iter()
            .try_for_each(|rule| rule.validate(kind))
    }

    /// Whether moving from `previous` must re-send unchanged grants
    pub fn requires_forced_update(&self, previous: &Self) -> bool {
        self.assignment_version != previous.assignment_version
    }
}

/// A scope's applied spec together with its last attested result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedPermissions {
    pub spec: PermissionsSpec,
    #[serde(default)]
    pub result: AssignmentResult,
}

/// Grant the spec's assignments on a fresh scope
pub fn create<B, D>(
    ctx: &ApplyContext,
    backend: &B,
    directory: &D,
    spec: &PermissionsSpec,
) -> Result<Reconciliation>
where
    B: PermissionBackend + ?Sized,
    D: PrincipalDirectory + ?Sized,
{
    log::debug!("creating assignments on {}", spec.scope);
    let grantor = ScopedGrantor::new(backend, &spec.scope);
    engine::apply(ctx, &spec.order(), directory, &grantor)
}

/// Read back what the server grants the spec's principals
pub fn read<B>(backend: &B, spec: &PermissionsSpec) -> Result<AssignmentResult>
where
    B: PermissionBackend + ?Sized,
{
    let current = read_remote(backend, &spec.scope)?;
    Ok(engine::compute(&current, &spec.order()))
}

/// Move a scope from its applied spec to a planned one
///
/// A changed `assignment_version` forces every grant to be re-sent.
pub fn update<B, D>(
    ctx: &ApplyContext,
    backend: &B,
    directory: &D,
    planned: &PermissionsSpec,
    in_state: &PermissionsSpec,
) -> Result<Reconciliation>
where
    B: PermissionBackend + ?Sized,
    D: PrincipalDirectory + ?Sized,
{
    if planned.scope != in_state.scope {
        return Err(Error::ScopeChanged {
            from: in_state.scope.clone(),
            to: planned.scope.clone(),
        });
    }

    let force_update = planned.requires_forced_update(in_state);
    if force_update {
        log::debug!(
            "assignment version of {} changed, re-sending all grants",
            planned.scope
        );
    }

    let grantor = ScopedGrantor::new(backend, &planned.scope);
    engine::update(
        ctx,
        &in_state.order(),
        &planned.order(),
        force_update,
        directory,
        &grantor,
    )
}

/// Revoke the spec's principals, unless the spec retains them on delete
pub fn delete<B>(ctx: &ApplyContext, backend: &B, spec: &PermissionsSpec) -> Result<Vec<Mutation>>
where
    B: PermissionBackend + ?Sized,
{
    if spec.retain_on_delete {
        log::info!("retaining permissions on {}", spec.scope);
        return Ok(Vec::new());
    }

    let current = read_remote(backend, &spec.scope)?;
    let grantor = ScopedGrantor::new(backend, &spec.scope);
    engine::remove(ctx, &current, &spec.order(), &grantor)
}

/// Group a scope's whole ACL by permission
pub fn attest<B>(backend: &B, scope: &Scope) -> Result<PermissionAttestation>
where
    B: PermissionBackend + ?Sized,
{
    let current = read_remote(backend, scope)?;
    Ok(PermissionAttestation::from_permissions(
        scope.kind(),
        &current,
    ))
}

fn read_remote<B>(backend: &B, scope: &Scope) -> Result<ObjectPermissions>
where
    B: PermissionBackend + ?Sized,
{
    backend
        .read_permissions(scope)
        .map_err(|source| Error::ReadPermissions {
            scope: scope.clone(),
            source,
        })
}
