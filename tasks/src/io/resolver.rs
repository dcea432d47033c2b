//! Tool resolution: search-path preconditions and the managed bin directory.
//!
//! Managed tools (`rice`, `gox`) are installed by the toolchain into
//! `<root>/bin/<tool>`, where `<root>` is whatever the toolchain reports
//! (`go env GOPATH`). The root is queried once per [`ToolResolver`] and
//! reused for every later resolution.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument};

use crate::core::types::{Invocation, Tool};
use crate::io::process::CommandRunner;

/// Directory under the managed root that holds installed executables.
const BIN_DIR: &str = "bin";

/// Abstraction over executable lookup on the search path.
pub trait PathLookup {
    fn find(&self, command: &str) -> Option<PathBuf>;
}

/// Lookup backed by the process `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchPath;

impl PathLookup for SearchPath {
    fn find(&self, command: &str) -> Option<PathBuf> {
        which::which(command).ok()
    }
}

/// Require `tool` to be installed on the search path.
///
/// Prints `<name> found...` when present; otherwise errors with an install
/// instruction for the operator.
#[instrument(skip_all, fields(command = %tool.command))]
pub fn require_on_path(lookup: &dyn PathLookup, tool: &Tool) -> Result<PathBuf> {
    match lookup.find(&tool.command) {
        Some(path) => {
            debug!(path = %path.display(), "tool found");
            println!("{} found...", tool.name);
            Ok(path)
        }
        None => {
            debug!("tool missing from search path");
            Err(anyhow!("Please, install {} and return!", tool.name))
        }
    }
}

/// Resolves tools inside the managed bin directory, caching its root.
#[derive(Debug, Clone)]
pub struct ToolResolver {
    root_query: Invocation,
    root: Option<PathBuf>,
}

impl ToolResolver {
    /// `root_query` must print the managed root on stdout.
    pub fn new(root_query: Invocation) -> Self {
        Self {
            root_query,
            root: None,
        }
    }

    /// Root reported by the query, if it has run.
    pub fn cached_root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Return `<root>/bin/<tool>`, running the root query on first use only.
    pub fn managed_path(&mut self, runner: &dyn CommandRunner, tool: &str) -> Result<PathBuf> {
        let root = match &self.root {
            Some(root) => root.clone(),
            None => {
                let root = query_root(runner, &self.root_query)?;
                self.root = Some(root.clone());
                root
            }
        };
        Ok(root.join(BIN_DIR).join(tool))
    }

    /// Resolve `tool` in the managed bin directory and run it.
    pub fn run_managed(
        &mut self,
        runner: &dyn CommandRunner,
        tool: &str,
        args: &[String],
    ) -> Result<()> {
        let path = self.managed_path(runner, tool)?;
        let invocation = Invocation::new(path.to_string_lossy()).args(args.iter().cloned());
        runner.run(&invocation)
    }
}

#[instrument(skip_all, fields(query = %query))]
fn query_root(runner: &dyn CommandRunner, query: &Invocation) -> Result<PathBuf> {
    let out = runner
        .capture(query)
        .with_context(|| format!("query managed tool root ({query})"))?;
    let root = out.trim_matches(|c: char| c == '\n' || c == '\r' || c == ' ');
    if root.is_empty() {
        return Err(anyhow!("{query} printed an empty managed tool root"));
    }
    info!(root, "resolved managed tool root");
    Ok(PathBuf::from(root))
}
