use anyhow::{Context as AnyhowContext, Result};
use assignments::{ApplyContext, MemoryBackend, MutationSummary, Scope, lifecycle};

use crate::Context;
use crate::cli::RemoteArgs;
use crate::commands::apply::report;
use crate::snapshot;
use crate::state::BitpermState;
use crate::ui;

/// Delete every recorded scope, then forget it
pub fn run(ctx: &Context, args: &RemoteArgs, dry_run: bool) -> Result<()> {
    execute(ctx, args, dry_run).map(|_| ())
}

fn execute(ctx: &Context, args: &RemoteArgs, dry_run: bool) -> Result<MutationSummary> {
    let backend = snapshot::load(&args.remote)?;
    let mut state = BitpermState::load(&ctx.state_path)?;
    let apply_ctx = ApplyContext::new(dry_run);

    let scopes: Vec<Scope> = state.resources.keys().cloned().collect();
    if scopes.is_empty() {
        if !ctx.quiet {
            ui::info("Nothing is managed, nothing to destroy.");
        }
        return Ok(MutationSummary::default());
    }

    let mut summary = MutationSummary::default();
    let outcome = destroy_all(ctx, &apply_ctx, &backend, &mut state, scopes, &mut summary);

    // Scopes deleted before a failure stay forgotten
    if !dry_run {
        snapshot::save(&args.remote, &backend)?;
        state.touch(&ctx.state_path)?;
    }
    outcome?;

    if !ctx.quiet {
        println!();
        if dry_run {
            ui::info(&format!("Plan: {}", ui::format_summary(&summary, true)));
        } else {
            ui::success(&format!(
                "Destroy complete: {}",
                ui::format_summary(&summary, false)
            ));
        }
    }
    Ok(summary)
}

fn destroy_all(
    ctx: &Context,
    apply_ctx: &ApplyContext,
    backend: &MemoryBackend,
    state: &mut BitpermState,
    scopes: Vec<Scope>,
    summary: &mut MutationSummary,
) -> Result<()> {
    for scope in scopes {
        let Some(managed) = state.get(&scope) else {
            continue;
        };
        let mutations = lifecycle::delete(apply_ctx, backend, &managed.spec)
            .with_context(|| format!("Failed to delete {} {scope}", scope.kind()))?;
        if managed.spec.retain_on_delete && !ctx.quiet {
            ui::dim(&format!("{scope}: permissions retained"));
        }
        report(ctx, &scope, &mutations, summary);
        state.forget(&scope);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{apply, testing::Fixture};
    use assignments::PermissionBackend;

    #[test]
    fn test_destroy_empty_state() {
        let fixture = Fixture::new();
        let summary = execute(&fixture.ctx, &fixture.remote_args(), false).unwrap();
        assert!(!summary.has_changes());
    }

    #[test]
    fn test_destroy_honours_retain_on_delete() {
        let fixture = Fixture::new();
        apply::run(&fixture.ctx, &fixture.converge_args(), false).unwrap();

        let planned = execute(&fixture.ctx, &fixture.remote_args(), true).unwrap();
        assert_eq!(planned.revokes, 1);
        assert_eq!(fixture.state().resources.len(), 2);

        let summary = execute(&fixture.ctx, &fixture.remote_args(), false).unwrap();
        assert_eq!(summary.revokes, 1);
        assert!(fixture.state().resources.is_empty());

        let backend = fixture.backend();
        assert!(!backend.read_permissions(&Scope::project("PRJ")).unwrap().is_empty());
        assert!(backend
            .read_permissions(&Scope::repository("PRJ", "app"))
            .unwrap()
            .is_empty());
    }
}
