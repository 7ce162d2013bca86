use anyhow::{Context, Result};
use assignments::{ManagedPermissions, Scope};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Scopes under management and what was last attested for them
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BitpermState {
    /// Applied spec and computed result per scope
    #[serde(default)]
    pub resources: BTreeMap<Scope, ManagedPermissions>,

    /// Last time the state was updated
    pub last_updated: DateTime<Utc>,
}

impl Default for BitpermState {
    fn default() -> Self {
        Self {
            resources: BTreeMap::new(),
            last_updated: Utc::now(),
        }
    }
}

impl BitpermState {
    /// Load state from disk, or return default if file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file does not exist, using default state");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let state: BitpermState = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        log::debug!("Loaded state from {}", path.display());
        Ok(state)
    }

    /// Save state to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        let content =
            serde_json::to_string_pretty(&self).context("Failed to serialize state to JSON")?;

        fs::write(path, &content)
            .with_context(|| format!("Failed to write state file: {}", path.display()))?;

        log::debug!("Saved state to {}", path.display());
        Ok(())
    }

    /// Update the last_updated timestamp and save
    pub fn touch(&mut self, path: &Path) -> Result<()> {
        self.last_updated = Utc::now();
        self.save(path)
    }

    pub fn get(&self, scope: &Scope) -> Option<&ManagedPermissions> {
        self.resources.get(scope)
    }

    pub fn record(&mut self, managed: ManagedPermissions) {
        self.resources.insert(managed.spec.scope.clone(), managed);
    }

    pub fn forget(&mut self, scope: &Scope) -> Option<ManagedPermissions> {
        self.resources.remove(scope)
    }
}
