//! Assignments config
//!
//! ```toml
//! [[projects]]
//! key = "PRJ"
//! assignment_version = "1"
//!
//! [[projects.assignments]]
//! permission = "PROJECT_ADMIN"
//! priority = 10
//! users = ["alice"]
//!
//! [[repositories]]
//! project = "PRJ"
//! slug = "app"
//! retain_on_delete = false
//!
//! [[repositories.assignments]]
//! permission = "REPO_WRITE"
//! priority = 1
//! groups = ["developers"]
//! ```

use anyhow::{Context, Result, bail};
use assignments::{AssignmentRule, PermissionsSpec, Scope, ScopeKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

fn default_retain_on_delete() -> bool {
    true
}

/// Settings shared by project and repository entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_version: Option<String>,

    #[serde(default = "default_retain_on_delete")]
    pub retain_on_delete: bool,

    #[serde(default)]
    pub assignments: Vec<AssignmentRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub key: String,
    #[serde(flatten)]
    pub settings: ScopeSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub project: String,
    pub slug: String,
    #[serde(flatten)]
    pub settings: ScopeSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionsConfig {
    #[serde(default)]
    pub projects: Vec<ProjectConfig>,
    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,
}

impl PermissionsConfig {
    /// Load and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Convert to validated specs, projects first, in file order
    pub fn into_specs(self) -> Result<Vec<PermissionsSpec>> {
        let projects = self
            .projects
            .into_iter()
            .map(|p| (p.key, ScopeKind::Project, p.settings));
        let repositories = self.repositories.into_iter().map(|r| {
            (
                format!("{}/{}", r.project, r.slug),
                ScopeKind::Repository,
                r.settings,
            )
        });

        let mut seen = BTreeSet::new();
        let mut specs = Vec::new();
        for (raw_scope, kind, settings) in projects.chain(repositories) {
            let scope: Scope = raw_scope.parse()?;
            if scope.kind() != kind {
                bail!("invalid {kind} {raw_scope:?}");
            }
            if !seen.insert(scope.clone()) {
                bail!("{} {scope} is configured more than once", scope.kind());
            }

            let spec = PermissionsSpec {
                scope,
                assignment_version: settings.assignment_version,
                retain_on_delete: settings.retain_on_delete,
                assignments: settings.assignments,
            };
            spec.validate()
                .with_context(|| format!("Invalid assignments for {}", spec.scope))?;
            specs.push(spec);
        }
        Ok(specs)
    }
}

/// Load a config file straight into validated specs
pub fn load_specs(path: &Path) -> Result<Vec<PermissionsSpec>> {
    PermissionsConfig::load(path)?.into_specs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assignments::Permission;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[[projects]]
key = "PRJ"
assignment_version = "1"

[[projects.assignments]]
permission = "PROJECT_ADMIN"
priority = 10
users = ["alice"]

[[projects.assignments]]
permission = "PROJECT_READ"
priority = 1
users = ["alice", "bob"]
groups = ["developers"]

[[repositories]]
project = "PRJ"
slug = "app"
retain_on_delete = false

[[repositories.assignments]]
permission = "REPO_WRITE"
priority = 1
groups = ["developers"]
"#;

    #[test]
    fn test_parse_sample() {
        let specs = PermissionsConfig::parse(SAMPLE).unwrap().into_specs().unwrap();
        assert_eq!(specs.len(), 2);

        let project = &specs[0];
        assert_eq!(project.scope, Scope::project("PRJ"));
        assert_eq!(project.assignment_version.as_deref(), Some("1"));
        assert!(project.retain_on_delete);
        assert_eq!(project.order().user_permission("alice"), Some(Permission::ProjectAdmin));
        assert_eq!(project.order().user_permission("bob"), Some(Permission::ProjectRead));

        let repo = &specs[1];
        assert_eq!(repo.scope.kind(), ScopeKind::Repository);
        assert!(!repo.retain_on_delete);
        assert!(repo.assignments[0].users.is_empty());
    }

    #[test]
    fn test_rejects_foreign_permission() {
        let content = r#"
[[repositories]]
project = "PRJ"
slug = "app"

[[repositories.assignments]]
permission = "PROJECT_ADMIN"
priority = 1
users = ["alice"]
"#;
        let err = PermissionsConfig::parse(content)
            .unwrap()
            .into_specs()
            .unwrap_err();
        assert!(err.to_string().contains("PRJ/app"));
    }

    #[test]
    fn test_rejects_unknown_permission_name() {
        let content = r#"
[[projects]]
key = "PRJ"

[[projects.assignments]]
permission = "SUPERUSER"
priority = 1
"#;
        assert!(PermissionsConfig::parse(content).is_err());
    }

    #[test]
    fn test_rejects_duplicate_scope() {
        let content = r#"
[[projects]]
key = "PRJ"

[[projects]]
key = "PRJ"
"#;
        let err = PermissionsConfig::parse(content)
            .unwrap()
            .into_specs()
            .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_rejects_malformed_slug() {
        let content = r#"
[[repositories]]
project = "PRJ"
slug = "a/b"
"#;
        assert!(PermissionsConfig::parse(content).unwrap().into_specs().is_err());
    }

    #[test]
    fn test_rejects_project_key_with_slash() {
        let content = "[[projects]]\nkey = \"PRJ/app\"\n";
        let err = PermissionsConfig::parse(content)
            .unwrap()
            .into_specs()
            .unwrap_err();
        assert!(err.to_string().contains("invalid project"));
    }

    #[test]
    fn test_load_specs_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let specs = load_specs(file.path()).unwrap();
        assert_eq!(specs.len(), 2);

        assert!(load_specs(Path::new("/nonexistent/bitperm.toml")).is_err());
    }
}
