//! Task configuration read from an optional `tasks.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::platform::Platform;
use crate::core::types::Tool;

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "tasks.toml";

/// Task configuration (TOML).
///
/// Every field has a default, so a missing file or a partial file reproduces
/// the stock viz setup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TasksConfig {
    pub tools: ToolsConfig,
    pub prepare: PrepareConfig,
    pub run: RunConfig,
    pub production: ProductionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolsConfig {
    /// JavaScript runtime (checked, never invoked).
    pub runtime: Tool,
    /// Native toolchain used for `get`, `run` and the managed root query.
    pub toolchain: Tool,
    pub package_manager: Tool,
    /// Frontend task runner CLI (`watch`, `build`).
    pub frontend_runner: Tool,
    /// Package installed globally when the frontend runner is missing.
    pub frontend_runner_package: String,
    /// Privilege prefix for global installs on Linux.
    pub elevate: String,
    /// Toolchain arguments that print the managed tool root.
    pub root_query: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            runtime: Tool::new("node", "Node.JS"),
            toolchain: Tool::new("go", "Go"),
            package_manager: Tool::new("npm", "NPM"),
            frontend_runner: Tool::new("gulp", "Gulp"),
            frontend_runner_package: "gulp-cli".to_string(),
            elevate: "sudo".to_string(),
            root_query: strings(&["env", "GOPATH"]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PrepareConfig {
    /// Arguments to `<toolchain> get`, in order.
    pub toolchain_deps: Vec<String>,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            toolchain_deps: strings(&[
                "./...",
                "github.com/mitchellh/gox",
                "github.com/GeertJohan/go.rice",
                "github.com/GeertJohan/go.rice/rice",
                "golang.org/x/sys/unix",
            ]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RunConfig {
    /// Source files passed to `<toolchain> run`, in order.
    pub entry_files: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            entry_files: strings(&[
                "config.go",
                "csv_provider.go",
                "providers.go",
                "web.go",
                "viz.go",
            ]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProductionConfig {
    /// Managed tool that turns static assets into a generated source file.
    pub embed_tool: String,
    pub embed_args: Vec<String>,
    /// Generated source file removed once every platform is built.
    pub embed_artifact: PathBuf,
    /// Managed cross-compilation tool.
    pub cross_tool: String,
    /// Output directory cleared before cross-compiling.
    pub build_dir: PathBuf,
    /// Output path template handed to the cross-compilation tool.
    pub output_template: String,
    pub platforms: Vec<Platform>,
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self {
            embed_tool: "rice".to_string(),
            embed_args: strings(&["embed-go"]),
            embed_artifact: PathBuf::from("rice-box.go"),
            cross_tool: "gox".to_string(),
            build_dir: PathBuf::from("build"),
            output_template: "build/{{.Dir}}_{{.OS}}_{{.Arch}}".to_string(),
            platforms: vec![
                Platform::new("windows", "386"),
                Platform::new("windows", "amd64"),
                Platform::new("linux", "386"),
                Platform::new("linux", "amd64"),
                Platform::new("linux", "arm"),
            ],
        }
    }
}

impl TasksConfig {
    pub fn validate(&self) -> Result<()> {
        let tools = &self.tools;
        for (key, tool) in [
            ("tools.runtime", &tools.runtime),
            ("tools.toolchain", &tools.toolchain),
            ("tools.package_manager", &tools.package_manager),
            ("tools.frontend_runner", &tools.frontend_runner),
        ] {
            if tool.command.trim().is_empty() {
                return Err(anyhow!("{key}.command must be non-empty"));
            }
        }
        if tools.frontend_runner_package.trim().is_empty() {
            return Err(anyhow!("tools.frontend_runner_package must be non-empty"));
        }
        if tools.elevate.trim().is_empty() {
            return Err(anyhow!("tools.elevate must be non-empty"));
        }
        if tools.root_query.is_empty() {
            return Err(anyhow!("tools.root_query must be a non-empty array"));
        }
        if self.run.entry_files.is_empty() {
            return Err(anyhow!("run.entry_files must be a non-empty array"));
        }
        let production = &self.production;
        if production.embed_tool.trim().is_empty() {
            return Err(anyhow!("production.embed_tool must be non-empty"));
        }
        if production.cross_tool.trim().is_empty() {
            return Err(anyhow!("production.cross_tool must be non-empty"));
        }
        if production.build_dir.as_os_str().is_empty() {
            return Err(anyhow!("production.build_dir must be non-empty"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `TasksConfig::default()`.
pub fn load_config(path: &Path) -> Result<TasksConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        let cfg = TasksConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: TasksConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate().with_context(|| format!("validate {}", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(cfg)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
