//! # Assignments
//!
//! Permission assignment engine for Bitbucket-style projects and repositories.
//!
//! A managed scope declares rules granting a permission to users and groups.
//! The engine resolves those rules into one permission per principal, checks
//! principals against a directory, issues the grant and revoke calls needed to
//! converge the server, and attests what the server actually grants.
//!
//! ## Core Concepts
//!
//! - **AssignmentRule**: a permission, a priority and the principals it targets
//! - **AssignmentOrder**: the resolved, single-valued user and group maps
//! - **PrincipalDirectory**: existence lookups returning the server's spelling
//! - **Grantor / PermissionBackend**: the calls that change and read an ACL
//! - **AssignmentResult**: principals confirmed to hold a managed permission
//!
//! ## Example
//!
//! ```ignore
//! use assignments::{lifecycle, ApplyContext, AssignmentRule, Permission, PermissionsSpec, Scope};
//!
//! let spec = PermissionsSpec::new(Scope::project("PRJ")).with_assignments(vec![
//!     AssignmentRule::new(Permission::ProjectRead, 1).with_groups(["developers"]),
//!     AssignmentRule::new(Permission::ProjectAdmin, 10).with_users(["alice"]),
//! ]);
//!
//! let outcome = lifecycle::create(&ApplyContext::default(), &backend, &backend, &spec)?;
//! for mutation in &outcome.mutations {
//!     println!("{mutation}");
//! }
//! ```

pub mod attestation;
pub mod context;
pub mod diff;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod memory;
pub mod order;
pub mod permission;
pub mod scope;
pub mod types;

pub use attestation::{AssignmentResult, PermissionAttestation};
pub use context::{ApplyContext, Grantor, PermissionBackend, PrincipalDirectory, ScopedGrantor};
pub use diff::MutationSummary;
pub use engine::Reconciliation;
pub use error::{Error, Result};
pub use lifecycle::{ManagedPermissions, PermissionsSpec};
pub use memory::{MemoryBackend, RemoteSnapshot};
pub use order::{AssignmentOrder, OrderedAssignments};
pub use permission::Permission;
pub use scope::{Scope, ScopeKind};
pub use types::{
    AssignmentRule, ComputedAssignment, Mutation, MutationAction, ObjectPermissions, Principal,
    PrincipalKind, PrincipalPermission,
};
