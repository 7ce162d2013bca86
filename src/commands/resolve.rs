use anyhow::Result;
use assignments::{OrderedAssignments, PermissionsSpec};
use std::path::Path;

use crate::Context;
use crate::config;
use crate::ui;

/// Print the effective permission of every principal, per scope
pub fn run(ctx: &Context, config_path: &Path) -> Result<()> {
    let specs = config::load_specs(config_path)?;
    if specs.is_empty() {
        ui::warn(&format!("No scopes configured in {}", config_path.display()));
        return Ok(());
    }

    for spec in &specs {
        show(ctx, spec);
    }
    Ok(())
}

fn show(ctx: &Context, spec: &PermissionsSpec) {
    ui::header(&format!("{} {}", spec.scope.kind(), spec.scope));
    if let Some(version) = &spec.assignment_version {
        ui::kv("assignment_version", version);
    }
    if ctx.verbose > 0 {
        ui::kv("retain_on_delete", &spec.retain_on_delete.to_string());
        ui::kv("rules", &spec.assignments.len().to_string());
    }

    let order = spec.order();
    if order.is_empty() {
        ui::dim("no assignments");
        return;
    }
    show_side("Users", &order.users);
    show_side("Groups", &order.groups);
}

fn show_side(title: &str, side: &OrderedAssignments) {
    if side.is_empty() {
        return;
    }
    ui::section(title);
    for (name, permission) in rows(side) {
        ui::kv(name, permission);
    }
}

/// `(principal, permission wire name)` rows in resolution order
fn rows(side: &OrderedAssignments) -> Vec<(&str, &'static str)> {
    side.iter()
        .map(|(name, permission)| (name, permission.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::Fixture;

    #[test]
    fn test_resolve_sample_config() {
        let fixture = Fixture::new();
        run(&fixture.ctx, &fixture.config).unwrap();

        let specs = config::load_specs(&fixture.config).unwrap();
        let project = specs[0].order();
        assert_eq!(
            rows(&project.users),
            [("alice", "PROJECT_ADMIN"), ("bob", "PROJECT_READ")]
        );
        assert_eq!(rows(&project.groups), [("developers", "PROJECT_READ")]);

        let repository = specs[1].order();
        assert!(repository.users.is_empty());
        assert_eq!(rows(&repository.groups), [("ops", "REPO_WRITE")]);
    }

    #[test]
    fn test_resolve_surfaces_config_errors() {
        let fixture = Fixture::new();
        fixture.write_config("[[projects]]\nkey = \"\"\n");
        assert!(run(&fixture.ctx, &fixture.config).is_err());
    }
}
