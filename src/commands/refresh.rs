use anyhow::Result;
use assignments::{AssignmentResult, Error, Scope, lifecycle};

use crate::Context;
use crate::cli::RemoteArgs;
use crate::snapshot;
use crate::state::BitpermState;
use crate::ui;

/// Re-read every recorded scope and store what the remote now grants
///
/// A scope the remote no longer has is dropped from the state.
pub fn run(ctx: &Context, args: &RemoteArgs) -> Result<()> {
    execute(ctx, args).map(|_| ())
}

fn execute(ctx: &Context, args: &RemoteArgs) -> Result<usize> {
    let backend = snapshot::load(&args.remote)?;
    let mut state = BitpermState::load(&ctx.state_path)?;

    let scopes: Vec<Scope> = state.resources.keys().cloned().collect();
    let mut drifted = 0;
    for scope in scopes {
        let Some(managed) = state.resources.get_mut(&scope) else {
            continue;
        };
        match lifecycle::read(&backend, &managed.spec) {
            Ok(result) => {
                if result != managed.result {
                    drifted += 1;
                    if !ctx.quiet {
                        ui::warn(&format!("{} {scope} drifted", scope.kind()));
                        show(&result);
                    }
                    managed.result = result;
                }
            }
            Err(Error::ReadPermissions { source, .. }) => {
                log::debug!("reading {scope} failed: {source:#}");
                if !ctx.quiet {
                    ui::warn(&format!(
                        "{} {scope} no longer exists, removing from state",
                        scope.kind()
                    ));
                }
                state.forget(&scope);
                drifted += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    state.touch(&ctx.state_path)?;
    if !ctx.quiet {
        ui::success(&format!(
            "Refreshed {} scopes, {drifted} changed",
            state.resources.len()
        ));
    }
    Ok(drifted)
}

fn show(result: &AssignmentResult) {
    for computed in &result.computed_users {
        ui::kv(&format!("user {}", computed.name), computed.permission.as_str());
    }
    for computed in &result.computed_groups {
        ui::kv(&format!("group {}", computed.name), computed.permission.as_str());
    }
}
