//! Path resolution for bitperm
//!
//! # Environment Variables
//!
//! - `BITPERM_STATE_DIR` - Override state directory
//!
//! # Path Resolution Priority
//!
//! For state_dir():
//! 1. `BITPERM_STATE_DIR` environment variable
//! 2. `XDG_STATE_HOME/bitperm` (if set)
//! 3. Platform default:
//!    - Windows: `%LOCALAPPDATA%\bitperm`
//!    - macOS/Linux: `~/.local/state/bitperm`

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable for state directory override
pub const ENV_STATE_DIR: &str = "BITPERM_STATE_DIR";

const STATE_FILE: &str = "state.json";

/// Get the bitperm state directory path
pub fn state_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_STATE_DIR) {
        let path = expand(&dir);
        log::debug!("Using state dir from {}: {}", ENV_STATE_DIR, path.display());
        return Ok(path);
    }

    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        let path = PathBuf::from(xdg_state).join("bitperm");
        log::debug!("Using XDG_STATE_HOME: {}", path.display());
        return Ok(path);
    }

    #[cfg(windows)]
    {
        if let Some(local_app_data) = dirs::data_local_dir() {
            let path = local_app_data.join("bitperm");
            log::debug!("Using Windows state dir: {}", path.display());
            return Ok(path);
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".local").join("state").join("bitperm");
    log::debug!("Using default state dir: {}", path.display());
    Ok(path)
}

/// Resolve the state file: an explicit path wins over the state directory
pub fn state_file(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(expand(&path.to_string_lossy())),
        None => Ok(state_dir()?.join(STATE_FILE)),
    }
}

/// Expand ~ and environment variables in a path string
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    /// Run `f` with `key` set, restoring the previous value afterwards
    fn with_env_var<F, R>(key: &str, value: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();
        // SAFETY: Tests run in isolation and don't read env vars concurrently
        unsafe { env::set_var(key, value) };
        let result = f();
        match original {
            // SAFETY: Tests run in isolation
            Some(v) => unsafe { env::set_var(key, v) },
            None => unsafe { env::remove_var(key) },
        }
        result
    }

    #[test]
    fn test_state_dir_env_override() {
        with_env_var(ENV_STATE_DIR, "/custom/bitperm/state", || {
            assert_eq!(state_dir().unwrap(), PathBuf::from("/custom/bitperm/state"));
            assert_eq!(
                state_file(None).unwrap(),
                PathBuf::from("/custom/bitperm/state/state.json")
            );
        });
    }

    #[test]
    fn test_explicit_state_file_wins() {
        let path = state_file(Some(Path::new("/tmp/bitperm-explicit.json"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/bitperm-explicit.json"));
    }

    #[test]
    fn test_expand_tilde() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand("~/bitperm"), home.join("bitperm"));
        assert_eq!(expand("/absolute/path"), PathBuf::from("/absolute/path"));
    }
}
