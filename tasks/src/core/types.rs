//! Shared deterministic types for task planning.
//!
//! A task is planned into a list of [`Step`]s before anything runs, so the
//! exact command sequence of every task can be asserted on in tests.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The four task entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Prepare,
    Watch,
    Run,
    Production,
}

impl Task {
    pub fn name(self) -> &'static str {
        match self {
            Task::Prepare => "prepare",
            Task::Watch => "watch",
            Task::Run => "run",
            Task::Production => "production",
        }
    }
}

/// An external tool: the command looked up on the search path and the
/// human-readable name used in found/install messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub command: String,
    pub name: String,
}

impl Tool {
    pub fn new(command: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            name: name.into(),
        }
    }
}

/// A program plus its ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Prepend `program` and shift the current program into the argument list
    /// (e.g. `npm i -g x` becomes `sudo npm i -g x`).
    pub fn prefixed(self, program: impl Into<String>) -> Self {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(self.program);
        args.extend(self.args);
        Self {
            program: program.into(),
            args,
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// One unit of work inside a task. Steps run strictly in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Print an operator-facing progress line.
    Say(String),
    /// Fail unless `tool` is on the search path.
    RequireOnPath(Tool),
    /// Run `install` when `tool` is absent, then require it on the search path.
    InstallIfMissing { tool: Tool, install: Invocation },
    /// Run an invocation with inherited stdio.
    Run(Invocation),
    /// Run `<managed root>/bin/<tool>` with `args`.
    RunManaged { tool: String, args: Vec<String> },
    /// Remove a directory tree; a missing directory is not an error.
    RemoveDir(PathBuf),
    /// Remove a single file; a missing file is not an error.
    RemoveFile(PathBuf),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Say(message) => write!(f, "say {message:?}"),
            Step::RequireOnPath(tool) => write!(f, "require {}", tool.command),
            Step::InstallIfMissing { tool, .. } => write!(f, "ensure {}", tool.command),
            Step::Run(invocation) => write!(f, "{invocation}"),
            Step::RunManaged { tool, args } => {
                write!(f, "{tool}")?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                Ok(())
            }
            Step::RemoveDir(path) => write!(f, "remove dir {}", path.display()),
            Step::RemoveFile(path) => write!(f, "remove file {}", path.display()),
        }
    }
}
