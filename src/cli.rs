use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bitperm")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Plan and apply project and repository permission assignments", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// State file (defaults to the bitperm state directory)
    #[arg(long, env = "BITPERM_STATE", global = true)]
    pub state: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the effective permission of every principal per scope
    Resolve {
        /// Assignments config file (TOML)
        config: PathBuf,
    },

    /// Show the grants and revokes an apply would issue
    Plan(ConvergeArgs),

    /// Converge the remote on the config and record the result
    Apply(ConvergeArgs),

    /// Re-read the remote and update recorded results
    Refresh(RemoteArgs),

    /// Stop managing every recorded scope
    Destroy {
        #[command(flatten)]
        remote: RemoteArgs,

        /// Dry run - show what would be revoked
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Start managing an existing scope with no assignments
    Import {
        /// Scope: `KEY` for a project, `KEY/slug` for a repository
        scope: String,

        #[command(flatten)]
        remote: RemoteArgs,
    },

    /// Print every permission held on a scope, grouped by permission
    Attest {
        /// Scope: `KEY` for a project, `KEY/slug` for a repository
        scope: String,

        #[command(flatten)]
        remote: RemoteArgs,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct RemoteArgs {
    /// Remote snapshot file (TOML)
    #[arg(short, long, env = "BITPERM_REMOTE")]
    pub remote: PathBuf,
}

#[derive(Args)]
pub struct ConvergeArgs {
    /// Assignments config file (TOML)
    pub config: PathBuf,

    #[command(flatten)]
    pub remote: RemoteArgs,
}
