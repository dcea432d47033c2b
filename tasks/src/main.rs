//! Task runner for viz.
//!
//! Each subcommand runs a fixed sequence of external tools with their output
//! streamed straight to the terminal. The first failing step ends the run
//! with a nonzero exit status.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use tasks::core::platform::OsFamily;
use tasks::core::types::Task;
use tasks::dispatch::{Host, run_task};
use tasks::exit_codes;
use tasks::io::config::{CONFIG_FILE, load_config};
use tasks::io::process::SystemRunner;
use tasks::io::resolver::SearchPath;
use tasks::logging;

#[derive(Parser)]
#[command(name = "tasks", version, about = "Task runner for viz")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Verify the toolchain and install frontend and Go dependencies.
    Prepare,
    /// Run the frontend watcher in the foreground.
    Watch,
    /// Run the application from source in development mode.
    Run,
    /// Build frontend assets, embed them and cross-compile release binaries.
    Production,
}

impl From<Command> for Task {
    fn from(command: Command) -> Self {
        match command {
            Command::Prepare => Task::Prepare,
            Command::Watch => Task::Watch,
            Command::Run => Task::Run,
            Command::Production => Task::Production,
        }
    }
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::FAILED);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let workdir = std::env::current_dir().context("resolve working directory")?;
    let cfg = load_config(&workdir.join(CONFIG_FILE))?;

    let runner = SystemRunner;
    let lookup = SearchPath;
    let mut host = Host::new(&runner, &lookup, &cfg, &workdir);
    run_task(cli.command.into(), &cfg, OsFamily::current(), &mut host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn parses_each_task() {
        for (arg, task) in [
            ("prepare", Task::Prepare),
            ("watch", Task::Watch),
            ("run", Task::Run),
            ("production", Task::Production),
        ] {
            let cli = Cli::parse_from(["tasks", arg]);
            assert_eq!(Task::from(cli.command), task);
        }
    }

    #[test]
    fn missing_subcommand_is_a_usage_error() {
        let err = Cli::try_parse_from(["tasks"]).err().expect("usage error");
        assert_eq!(err.exit_code(), exit_codes::USAGE);
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        let err = Cli::try_parse_from(["tasks", "deploy"])
            .err()
            .expect("usage error");
        assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        assert_eq!(err.exit_code(), exit_codes::USAGE);
    }

    #[test]
    fn extra_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["tasks", "run", "--fast"]).is_err());
    }
}
