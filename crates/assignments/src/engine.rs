//! Diff & apply engine
//!
//! Drives grants and revokes through a [`Grantor`] so that a scope's ACL
//! converges on a resolved [`AssignmentOrder`]:
//!
//! - [`apply`] grants every resolved principal (initial create)
//! - [`compute`] reports what the server currently grants managed principals
//! - [`update`] moves from a previously applied order to a planned one
//! - [`remove`] revokes every managed principal (delete)
//!
//! Mutations are issued one at a time, users before groups, each side in
//! first-seen order. The first failure stops the operation; mutations
//! already issued are not rolled back.

use crate::attestation::AssignmentResult;
use crate::context::{ApplyContext, Grantor, PrincipalDirectory};
use crate::error::{Error, Result};
use crate::order::{AssignmentOrder, OrderedAssignments};
use crate::permission::Permission;
use crate::types::{ComputedAssignment, Mutation, ObjectPermissions, Principal, PrincipalKind};

const KINDS: [PrincipalKind; 2] = [PrincipalKind::User, PrincipalKind::Group];

/// Outcome of a mutating operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Principals now holding their resolved permission
    pub result: AssignmentResult,
    /// Grants and revokes issued, in issue order
    pub mutations: Vec<Mutation>,
}

/// Grant every principal of `order` that exists upstream
pub fn apply<D, G>(
    ctx: &ApplyContext,
    order: &AssignmentOrder,
    directory: &D,
    grantor: &G,
) -> Result<Reconciliation>
where
    D: PrincipalDirectory + ?Sized,
    G: Grantor + ?Sized,
{
    let mut recorder = Recorder::new(ctx, grantor);
    let mut computed = [Vec::new(), Vec::new()];

    for (kind, out) in KINDS.into_iter().zip(computed.iter_mut()) {
        for (name, permission) in order.side(kind).iter() {
            if lookup(directory, kind, name).is_none() {
                continue;
            }
            recorder.grant(kind, name, permission, None)?;
            out.push(ComputedAssignment::new(name, permission));
        }
    }

    let [users, groups] = computed;
    Ok(recorder.finish(AssignmentResult::build(users, groups)))
}

/// Report the permissions the server grants to managed principals
///
/// Remote entries for principals outside `order` are ignored. Group names
/// are compared case-insensitively since the server may recapitalise them.
pub fn compute(current: &ObjectPermissions, order: &AssignmentOrder) -> AssignmentResult {
    let users = current
        .users
        .iter()
        .filter(|entry| order.users.contains(&entry.name))
        .map(ComputedAssignment::from)
        .collect();
    let groups = current
        .groups
        .iter()
        .filter(|entry| order.groups.contains_ignore_case(&entry.name))
        .map(ComputedAssignment::from)
        .collect();
    AssignmentResult::build(users, groups)
}

/// Converge from the `in_state` order to the `planned` order
///
/// Unchanged principals are not touched unless `force_update` is set.
/// Principals dropped from the plan are revoked: users by the name they were
/// configured with, groups by the name the directory reports (a group the
/// directory no longer knows is left alone). Group names are matched against
/// the applied order ignoring case.
pub fn update<D, G>(
    ctx: &ApplyContext,
    in_state: &AssignmentOrder,
    planned: &AssignmentOrder,
    force_update: bool,
    directory: &D,
    grantor: &G,
) -> Result<Reconciliation>
where
    D: PrincipalDirectory + ?Sized,
    G: Grantor + ?Sized,
{
    let mut recorder = Recorder::new(ctx, grantor);
    let mut computed = [Vec::new(), Vec::new()];

    for (kind, out) in KINDS.into_iter().zip(computed.iter_mut()) {
        *out = update_side(
            &mut recorder,
            kind,
            in_state.side(kind),
            planned.side(kind),
            force_update,
            directory,
        )?;
    }

    let [users, groups] = computed;
    Ok(recorder.finish(AssignmentResult::build(users, groups)))
}

fn update_side<D, G>(
    recorder: &mut Recorder<'_, G>,
    kind: PrincipalKind,
    in_state: &OrderedAssignments,
    planned: &OrderedAssignments,
    force_update: bool,
    directory: &D,
) -> Result<Vec<ComputedAssignment>>
where
    D: PrincipalDirectory + ?Sized,
    G: Grantor + ?Sized,
{
    // Group names are case-insensitive upstream: a case-only rename is the same group
    let removing = match kind {
        PrincipalKind::User => in_state.missing_from(planned),
        PrincipalKind::Group => in_state.missing_from_ignore_case(planned),
    };
    let mut computed = Vec::with_capacity(planned.len());

    for (name, permission) in planned.iter() {
        let Some(found) = lookup(directory, kind, name) else {
            continue;
        };
        computed.push(ComputedAssignment::new(name, permission));

        let previous = match kind {
            PrincipalKind::User => in_state.get(name),
            PrincipalKind::Group => in_state.get_ignore_case(name),
        };
        if previous == Some(permission) && !force_update {
            log::debug!("{kind} {name} already has {permission}, skipping");
            continue;
        }
        let target = match kind {
            PrincipalKind::User => name,
            PrincipalKind::Group => found.name.as_str(),
        };
        recorder.grant(kind, target, permission, previous)?;
    }

    for name in removing {
        match kind {
            PrincipalKind::User => recorder.revoke(kind, name)?,
            PrincipalKind::Group => {
                let Some(found) = lookup(directory, kind, name) else {
                    continue;
                };
                recorder.revoke(kind, &found.name)?;
            }
        }
    }

    Ok(computed)
}

/// Revoke every principal that is both granted on the server and managed by `order`
///
/// Principals the order does not name are never revoked.
pub fn remove<G>(
    ctx: &ApplyContext,
    current: &ObjectPermissions,
    order: &AssignmentOrder,
    grantor: &G,
) -> Result<Vec<Mutation>>
where
    G: Grantor + ?Sized,
{
    let mut recorder = Recorder::new(ctx, grantor);

    for entry in &current.users {
        if order.users.contains(&entry.name) {
            recorder.revoke(PrincipalKind::User, &entry.name)?;
        }
    }
    for entry in &current.groups {
        if order.groups.contains_ignore_case(&entry.name) {
            recorder.revoke(PrincipalKind::Group, &entry.name)?;
        }
    }

    Ok(recorder.mutations)
}

/// Look up a principal, treating any failure as "not found"
fn lookup<D>(directory: &D, kind: PrincipalKind, name: &str) -> Option<Principal>
where
    D: PrincipalDirectory + ?Sized,
{
    let found = match kind {
        PrincipalKind::User => directory.find_user(name),
        PrincipalKind::Group => directory.find_group(name),
    };
    match found {
        Ok(Some(principal)) => Some(principal),
        Ok(None) => {
            log::debug!("{kind} {name} not found upstream, skipping");
            None
        }
        Err(e) => {
            log::warn!("lookup of {kind} {name} failed, skipping: {e:#}");
            None
        }
    }
}

/// Issues mutations through a grantor and keeps the issue log
struct Recorder<'a, G: Grantor + ?Sized> {
    ctx: &'a ApplyContext,
    grantor: &'a G,
    mutations: Vec<Mutation>,
}

impl<'a, G: Grantor + ?Sized> Recorder<'a, G> {
    fn new(ctx: &'a ApplyContext, grantor: &'a G) -> Self {
        Self {
            ctx,
            grantor,
            mutations: Vec::new(),
        }
    }

    fn grant(
        &mut self,
        kind: PrincipalKind,
        name: &str,
        permission: Permission,
        previous: Option<Permission>,
    ) -> Result<()> {
        self.ctx.check_cancelled()?;
        if self.ctx.dry_run {
            log::info!("would grant {permission} to {kind} {name}");
        } else {
            self.send(kind, name, Some(permission))
                .map_err(|source| Error::grant_failed(kind, name, source))?;
            log::info!("granted {permission} to {kind} {name}");
        }
        self.mutations
            .push(Mutation::grant(kind, name, permission, previous));
        Ok(())
    }

    fn revoke(&mut self, kind: PrincipalKind, name: &str) -> Result<()> {
        self.ctx.check_cancelled()?;
        if self.ctx.dry_run {
            log::info!("would revoke permissions of {kind} {name}");
        } else {
            self.send(kind, name, None)
                .map_err(|source| Error::revoke_failed(kind, name, source))?;
            log::info!("revoked permissions of {kind} {name}");
        }
        self.mutations.push(Mutation::revoke(kind, name));
        Ok(())
    }

    fn send(
        &self,
        kind: PrincipalKind,
        name: &str,
        permission: Option<Permission>,
    ) -> anyhow::Result<()> {
        match kind {
            PrincipalKind::User => self.grantor.set_user_permission(name, permission),
            PrincipalKind::Group => self.grantor.set_group_permission(name, permission),
        }
    }

    fn finish(self, result: AssignmentResult) -> Reconciliation {
        Reconciliation {
            result,
            mutations: self.mutations,
        }
    }
}
