//! Attestation of granted permissions
//!
//! Two reports are built here: the per-principal [`AssignmentResult`] a
//! managed scope persists after every cycle, and the grouped
//! [`PermissionAttestation`] describing a scope's whole ACL.

use crate::permission::Permission;
use crate::scope::ScopeKind;
use crate::types::{ComputedAssignment, ObjectPermissions, PrincipalPermission};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Principals confirmed to hold a managed permission, sorted by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentResult {
    #[serde(default)]
    pub computed_users: Vec<ComputedAssignment>,
    #[serde(default)]
    pub computed_groups: Vec<ComputedAssignment>,
}

impl AssignmentResult {
    /// Build a result, sorting both lists by principal name
    ///
    /// Names are expected to be unique already; nothing is deduplicated.
    pub fn build(mut users: Vec<ComputedAssignment>, mut groups: Vec<ComputedAssignment>) -> Self {
        users.sort_by(|a, b| a.name.cmp(&b.name));
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            computed_users: users,
            computed_groups: groups,
        }
    }

    /// Check if nothing was attested
    pub fn is_empty(&self) -> bool {
        self.computed_users.is_empty() && self.computed_groups.is_empty()
    }
}

/// Whole ACL of a scope grouped by permission
///
/// Every permission of the scope's vocabulary has an entry, empty when
/// nobody holds it, so the report keeps a stable shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionAttestation {
    pub users: BTreeMap<Permission, Vec<String>>,
    pub groups: BTreeMap<Permission, Vec<String>>,
}

impl PermissionAttestation {
    /// Group an ACL by permission, names sorted within each permission
    pub fn from_permissions(kind: ScopeKind, acl: &ObjectPermissions) -> Self {
        Self {
            users: group_by_permission(kind, &acl.users),
            groups: group_by_permission(kind, &acl.groups),
        }
    }
}

fn group_by_permission(
    kind: ScopeKind,
    entries: &[PrincipalPermission],
) -> BTreeMap<Permission, Vec<String>> {
    let mut grouped: BTreeMap<Permission, Vec<String>> = kind
        .permissions()
        .into_iter()
        .map(|p| (p, Vec::new()))
        .collect();
    for entry in entries {
        grouped
            .entry(entry.permission)
            .or_default()
            .push(entry.name.clone());
    }
    for names in grouped.values_mut() {
        names.sort();
    }
    grouped
}
