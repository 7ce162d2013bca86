mod cli;
mod commands;
mod config;
mod paths;
mod snapshot;
mod state;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub state_path: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "bitperm", &mut io::stdout());
        return Ok(());
    }

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        state_path: paths::state_file(cli.state.as_deref())?,
    };
    log::debug!("Using state file {}", ctx.state_path.display());

    match cli.command {
        Command::Resolve { config } => commands::resolve::run(&ctx, &config),
        Command::Plan(args) => commands::apply::run(&ctx, &args, true),
        Command::Apply(args) => commands::apply::run(&ctx, &args, false),
        Command::Refresh(args) => commands::refresh::run(&ctx, &args),
        Command::Destroy { remote, dry_run } => commands::destroy::run(&ctx, &remote, dry_run),
        Command::Import { scope, remote } => commands::import::run(&ctx, &scope, &remote),
        Command::Attest { scope, remote } => commands::attest::run(&scope, &remote),
        Command::Completions { .. } => Ok(()),
    }
}
