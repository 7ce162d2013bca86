use anyhow::{Context as AnyhowContext, Result};
use assignments::{PermissionAttestation, Scope, lifecycle};

use crate::cli::RemoteArgs;
use crate::snapshot;

/// Print every permission held on a scope as JSON
pub fn run(scope: &str, args: &RemoteArgs) -> Result<()> {
    let attestation = build(scope, args)?;
    let json =
        serde_json::to_string_pretty(&attestation).context("Failed to serialize attestation")?;
    println!("{json}");
    Ok(())
}

fn build(scope: &str, args: &RemoteArgs) -> Result<PermissionAttestation> {
    let scope: Scope = scope.parse()?;
    let backend = snapshot::load(&args.remote)?;
    Ok(lifecycle::attest(&backend, &scope)?)
}
