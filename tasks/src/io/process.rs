//! Child process execution with pass-through stdio.

use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument};

use crate::core::types::Invocation;

/// Abstraction over process execution.
///
/// Tests use a scripted runner that records invocations without spawning.
pub trait CommandRunner {
    /// Run with stdin/stdout/stderr inherited; blocks until the child exits.
    ///
    /// Errors if the program cannot be launched or exits unsuccessfully.
    fn run(&self, invocation: &Invocation) -> Result<()>;

    /// Run and return captured stdout; same failure policy as [`run`](Self::run).
    fn capture(&self, invocation: &Invocation) -> Result<String>;
}

/// Runner that spawns real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    #[instrument(skip_all, fields(program = %invocation.program))]
    fn run(&self, invocation: &Invocation) -> Result<()> {
        println!("> {invocation}");

        let status = match command(invocation)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
        {
            Ok(status) => status,
            Err(e) => {
                debug!(err = %e, "failed to spawn command");
                return Err(e).with_context(|| format!("spawn {}", invocation.program));
            }
        };

        if !status.success() {
            debug!(exit_code = ?status.code(), "command failed");
            return Err(anyhow!("{invocation} exited with {status}"));
        }
        debug!("command finished");
        Ok(())
    }

    #[instrument(skip_all, fields(program = %invocation.program))]
    fn capture(&self, invocation: &Invocation) -> Result<String> {
        let output = command(invocation)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .with_context(|| format!("spawn {}", invocation.program))?;

        if !output.status.success() {
            debug!(exit_code = ?output.status.code(), "capture command failed");
            return Err(anyhow!("{invocation} exited with {}", output.status));
        }
        debug!(bytes = output.stdout.len(), "captured stdout");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn command(invocation: &Invocation) -> Command {
    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_fails_to_launch() {
        let err = SystemRunner
            .run(&Invocation::new("tasks-definitely-not-a-real-binary"))
            .expect_err("launch should fail");
        assert!(format!("{err:#}").contains("spawn tasks-definitely-not-a-real-binary"));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_an_error() {
        let err = SystemRunner
            .run(&Invocation::new("sh").args(["-c", "exit 3"]))
            .expect_err("nonzero exit should fail");
        assert!(err.to_string().contains("sh -c exit 3 exited with"));
    }

    #[cfg(unix)]
    #[test]
    fn zero_exit_succeeds() {
        SystemRunner
            .run(&Invocation::new("true"))
            .expect("true succeeds");
    }

    #[cfg(unix)]
    #[test]
    fn capture_returns_stdout() {
        let out = SystemRunner
            .capture(&Invocation::new("sh").args(["-c", "echo /opt/gopath"]))
            .expect("capture");
        assert_eq!(out, "/opt/gopath\n");
    }
}
