//! Shared fixtures for command tests

use crate::Context;
use crate::cli::{ConvergeArgs, RemoteArgs};
use crate::snapshot;
use crate::state::BitpermState;
use assignments::MemoryBackend;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const REMOTE: &str = r#"
users = ["alice", "bob", "carol"]
groups = ["Developers", "Ops"]

[permissions.PRJ]

[permissions."PRJ/app"]
"#;

pub const CONFIG: &str = r#"
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
groups = ["ops"]
"#;

/// A temp directory holding a config, a remote snapshot and a state file
pub struct Fixture {
    _dir: TempDir,
    pub config: PathBuf,
    pub remote: PathBuf,
    pub ctx: Context,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("bitperm.toml");
        let remote = dir.path().join("remote.toml");
        fs::write(&config, CONFIG).unwrap();
        fs::write(&remote, REMOTE).unwrap();
        let ctx = Context {
            verbose: 0,
            quiet: true,
            state_path: dir.path().join("state").join("state.json"),
        };
        Self {
            _dir: dir,
            config,
            remote,
            ctx,
        }
    }

    pub fn write_config(&self, content: &str) {
        fs::write(&self.config, content).unwrap();
    }

    pub fn remote_args(&self) -> RemoteArgs {
        RemoteArgs {
            remote: self.remote.clone(),
        }
    }

    pub fn converge_args(&self) -> ConvergeArgs {
        ConvergeArgs {
            config: self.config.clone(),
            remote: self.remote_args(),
        }
    }

    pub fn backend(&self) -> MemoryBackend {
        snapshot::load(&self.remote).unwrap()
    }

    pub fn state(&self) -> BitpermState {
        BitpermState::load(&self.ctx.state_path).unwrap()
    }
}
