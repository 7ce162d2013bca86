//! `plan` and `apply`
//!
//! Both walk the config against the recorded state: new scopes are created,
//! recorded scopes are updated, and recorded scopes missing from the config
//! are deleted. `plan` runs the same walk as a dry run and saves nothing.

use anyhow::{Context as AnyhowContext, Result};
use assignments::{
    ApplyContext, ManagedPermissions, MemoryBackend, Mutation, MutationSummary, PermissionsSpec,
    Scope, lifecycle,
};
use std::collections::BTreeSet;

use crate::Context;
use crate::cli::ConvergeArgs;
use crate::config;
use crate::snapshot;
use crate::state::BitpermState;
use crate::ui;

pub fn run(ctx: &Context, args: &ConvergeArgs, dry_run: bool) -> Result<()> {
    execute(ctx, args, dry_run).map(|_| ())
}

fn execute(ctx: &Context, args: &ConvergeArgs, dry_run: bool) -> Result<MutationSummary> {
    let specs = config::load_specs(&args.config)?;
    let backend = snapshot::load(&args.remote.remote)?;
    let mut state = BitpermState::load(&ctx.state_path)?;

    let apply_ctx = ApplyContext::new(dry_run);
    let outcome = converge(ctx, &apply_ctx, &backend, &mut state, &specs);

    // Scopes converged before a failure keep their progress
    if !dry_run {
        snapshot::save(&args.remote.remote, &backend)?;
        state.touch(&ctx.state_path)?;
    }
    let summary = outcome?;

    if !ctx.quiet {
        println!();
        if !summary.has_changes() {
            ui::success("No changes. Remote permissions match the config.");
        } else if dry_run {
            ui::info(&format!("Plan: {}", ui::format_summary(&summary, true)));
        } else {
            ui::success(&format!(
                "Apply complete: {}",
                ui::format_summary(&summary, false)
            ));
        }
    }
    Ok(summary)
}

fn converge(
    ctx: &Context,
    apply_ctx: &ApplyContext,
    backend: &MemoryBackend,
    state: &mut BitpermState,
    specs: &[PermissionsSpec],
) -> Result<MutationSummary> {
    let mut summary = MutationSummary::default();

    for spec in specs {
        let outcome = match state.get(&spec.scope) {
            Some(existing) => {
                lifecycle::update(apply_ctx, backend, backend, spec, &existing.spec)
            }
            None => lifecycle::create(apply_ctx, backend, backend, spec),
        }
        .with_context(|| format!("Failed to converge {} {}", spec.scope.kind(), spec.scope))?;

        report(ctx, &spec.scope, &outcome.mutations, &mut summary);
        state.record(ManagedPermissions {
            spec: spec.clone(),
            result: outcome.result,
        });
    }

    let planned: BTreeSet<&Scope> = specs.iter().map(|spec| &spec.scope).collect();
    let stale: Vec<Scope> = state
        .resources
        .keys()
        .filter(|scope| !planned.contains(scope))
        .cloned()
        .collect();

    for scope in stale {
        let Some(managed) = state.get(&scope) else {
            continue;
        };
        let mutations = lifecycle::delete(apply_ctx, backend, &managed.spec)
            .with_context(|| format!("Failed to delete {} {scope}", scope.kind()))?;
        if managed.spec.retain_on_delete && ctx.verbose > 0 {
            ui::dim(&format!("{scope}: no longer managed, permissions retained"));
        }
        report(ctx, &scope, &mutations, &mut summary);
        state.forget(&scope);
    }

    Ok(summary)
}

/// Print a scope's mutations unless quiet, and add them to the running summary
pub(crate) fn report(
    ctx: &Context,
    scope: &Scope,
    mutations: &[Mutation],
    summary: &mut MutationSummary,
) {
    if mutations.is_empty() {
        if ctx.verbose > 0 {
            ui::dim(&format!("{scope}: up to date"));
        }
        return;
    }

    if !ctx.quiet {
        ui::section(&format!("{} {scope}", scope.kind()));
        for mutation in mutations {
            ui::mutation(mutation);
        }
    }
    summary.merge(&MutationSummary::from_mutations(mutations));
}
