use anyhow::{Context as AnyhowContext, Result, bail};
use assignments::{ManagedPermissions, PermissionsSpec, Scope, lifecycle};

use crate::Context;
use crate::cli::RemoteArgs;
use crate::snapshot;
use crate::state::BitpermState;
use crate::ui;

/// Record an existing scope as managed, with no assignments yet
///
/// The next `apply` treats it as an update rather than a create.
pub fn run(ctx: &Context, scope: &str, args: &RemoteArgs) -> Result<()> {
    let scope: Scope = scope.parse()?;
    let backend = snapshot::load(&args.remote)?;
    let mut state = BitpermState::load(&ctx.state_path)?;

    if state.get(&scope).is_some() {
        bail!("{} {scope} is already managed", scope.kind());
    }

    let spec = PermissionsSpec::new(scope.clone());
    let result = lifecycle::read(&backend, &spec)
        .with_context(|| format!("Cannot import {} {scope}", scope.kind()))?;
    state.record(ManagedPermissions { spec, result });
    state.touch(&ctx.state_path)?;

    if !ctx.quiet {
        ui::success(&format!("Imported {} {scope}", scope.kind()));
    }
    Ok(())
}
