//! Test-only fakes for process execution and search-path lookup.

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tempfile::TempDir;

use crate::core::types::Invocation;
use crate::io::process::CommandRunner;
use crate::io::resolver::PathLookup;

/// Runner that records invocations instead of spawning processes.
///
/// `run` succeeds unless a scripted failure matches; `capture` returns a
/// fixed root (or fails when scripted to).
pub struct ScriptedRunner {
    capture_output: Option<String>,
    failures: Vec<(String, usize)>,
    invocations: RefCell<Vec<Invocation>>,
    captures: Cell<usize>,
}

impl Default for ScriptedRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            capture_output: Some("/home/dev/go\n".to_string()),
            failures: Vec::new(),
            invocations: RefCell::new(Vec::new()),
            captures: Cell::new(0),
        }
    }

    /// Set the stdout returned by every `capture`.
    pub fn with_capture(mut self, output: &str) -> Self {
        self.capture_output = Some(output.to_string());
        self
    }

    /// Make every `capture` fail.
    pub fn fail_capture(mut self) -> Self {
        self.capture_output = None;
        self
    }

    /// Fail the `nth` (1-based) `run` whose program file name is `program`.
    pub fn fail_nth(mut self, program: &str, nth: usize) -> Self {
        self.failures.push((program.to_string(), nth));
        self
    }

    /// Every `run` invocation attempted so far, including failed ones.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.borrow().clone()
    }

    /// Invocations whose program file name is `program`.
    pub fn runs_of(&self, program: &str) -> Vec<Invocation> {
        self.invocations
            .borrow()
            .iter()
            .filter(|inv| program_name(inv) == program)
            .cloned()
            .collect()
    }

    pub fn capture_count(&self) -> usize {
        self.captures.get()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        self.invocations.borrow_mut().push(invocation.clone());
        let name = program_name(invocation);
        let seen = self.runs_of(&name).len();
        if self
            .failures
            .iter()
            .any(|(program, nth)| *program == name && *nth == seen)
        {
            return Err(anyhow!("{invocation} exited with exit status: 1"));
        }
        Ok(())
    }

    fn capture(&self, invocation: &Invocation) -> Result<String> {
        self.captures.set(self.captures.get() + 1);
        self.capture_output
            .clone()
            .ok_or_else(|| anyhow!("{invocation} exited with exit status: 1"))
    }
}

fn program_name(invocation: &Invocation) -> String {
    Path::new(&invocation.program)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Search path with a fixed set of installed commands under `/usr/bin`.
///
/// Commands registered with [`installable`](Self::installable) are missing on
/// their first lookup and present afterwards, modelling a successful install.
pub struct FixedLookup {
    present: Vec<String>,
    installable: Vec<String>,
    looked_up: RefCell<Vec<String>>,
}

impl FixedLookup {
    pub fn with(present: &[&str]) -> Self {
        Self {
            present: present.iter().map(|s| s.to_string()).collect(),
            installable: Vec::new(),
            looked_up: RefCell::new(Vec::new()),
        }
    }

    pub fn installable(mut self, command: &str) -> Self {
        self.installable.push(command.to_string());
        self
    }
}

impl PathLookup for FixedLookup {
    fn find(&self, command: &str) -> Option<PathBuf> {
        let seen_before = self.looked_up.borrow().iter().any(|c| c == command);
        self.looked_up.borrow_mut().push(command.to_string());
        let present = self.present.iter().any(|c| c == command)
            || (seen_before && self.installable.iter().any(|c| c == command));
        present.then(|| PathBuf::from("/usr/bin").join(command))
    }
}

/// Create a temp directory containing the given (empty) relative files.
pub fn workspace_with(files: &[&str]) -> Result<TempDir> {
    let temp = tempfile::tempdir().context("create tempdir")?;
    for file in files {
        let path = temp.path().join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        fs::write(&path, "").with_context(|| format!("write {}", path.display()))?;
    }
    Ok(temp)
}
