//! Remote snapshot files
//!
//! A snapshot stands in for the server: the users and groups it knows and
//! the ACL of every existing scope.
//!
//! ```toml
//! users = ["alice", "bob"]
//! groups = ["Developers"]
//!
//! [permissions.PRJ]
//! users = [{ name = "alice", permission = "PROJECT_ADMIN" }]
//!
//! [permissions."PRJ/app"]
//! groups = [{ name = "Developers", permission = "REPO_WRITE" }]
//! ```

use anyhow::{Context, Result};
use assignments::{MemoryBackend, RemoteSnapshot};
use std::fs;
use std::path::Path;

/// Load a snapshot file into a backend
pub fn load(path: &Path) -> Result<MemoryBackend> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read remote snapshot: {}", path.display()))?;
    let snapshot: RemoteSnapshot = toml::from_str(&content)
        .with_context(|| format!("Failed to parse remote snapshot: {}", path.display()))?;
    log::debug!(
        "Loaded remote with {} users, {} groups, {} scopes",
        snapshot.users.len(),
        snapshot.groups.len(),
        snapshot.permissions.len()
    );
    Ok(MemoryBackend::new(snapshot))
}

/// Write the backend's current contents back to a snapshot file
pub fn save(path: &Path, backend: &MemoryBackend) -> Result<()> {
    let content =
        toml::to_string_pretty(&backend.snapshot()).context("Failed to serialize remote snapshot")?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write remote snapshot: {}", path.display()))?;
    log::debug!("Saved remote snapshot to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assignments::{Permission, PermissionBackend, PrincipalPermission, Scope};
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
users = ["alice", "bob"]
groups = ["Developers"]

[permissions.PRJ]
users = [{ name = "alice", permission = "PROJECT_ADMIN" }]

[permissions."PRJ/app"]
groups = [{ name = "Developers", permission = "REPO_WRITE" }]
"#;

    #[test]
    fn test_load_sample() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("remote.toml");
        fs::write(&path, SAMPLE).unwrap();

        let backend = load(&path).unwrap();
        let project = backend.read_permissions(&Scope::project("PRJ")).unwrap();
        assert_eq!(
            project.users,
            vec![PrincipalPermission::new("alice", Permission::ProjectAdmin)]
        );
        let repo = backend
            .read_permissions(&Scope::repository("PRJ", "app"))
            .unwrap();
        assert_eq!(repo.groups[0].permission, Permission::RepoWrite);
    }

    #[test]
    fn test_save_preserves_mutations() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("remote.toml");
        fs::write(&path, SAMPLE).unwrap();

        let backend = load(&path).unwrap();
        backend
            .set_user_permission(&Scope::project("PRJ"), "bob", Some(Permission::ProjectRead))
            .unwrap();
        save(&path, &backend).unwrap();

        let reloaded = load(&path).unwrap();
        assert_eq!(reloaded.snapshot(), backend.snapshot());
    }

    #[test]
    fn test_missing_snapshot_is_an_error() {
        let err = load(Path::new("/nonexistent/remote.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read remote snapshot"));
    }
}
