//! Orchestration: walk a task's planned steps against the host.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::core::platform::OsFamily;
use crate::core::types::{Invocation, Step, Task};
use crate::io::config::TasksConfig;
use crate::io::process::CommandRunner;
use crate::io::resolver::{PathLookup, ToolResolver, require_on_path};
use crate::plan::plan;

/// Everything a step needs to touch the outside world.
pub struct Host<'a> {
    pub runner: &'a dyn CommandRunner,
    pub lookup: &'a dyn PathLookup,
    pub resolver: ToolResolver,
    /// Base for relative paths in remove steps.
    pub workdir: PathBuf,
}

impl<'a> Host<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        lookup: &'a dyn PathLookup,
        cfg: &TasksConfig,
        workdir: impl Into<PathBuf>,
    ) -> Self {
        let root_query = Invocation::new(&cfg.tools.toolchain.command)
            .args(cfg.tools.root_query.iter().cloned());
        Self {
            runner,
            lookup,
            resolver: ToolResolver::new(root_query),
            workdir: workdir.into(),
        }
    }
}

/// Plan `task` and run it to completion, stopping at the first failure.
#[instrument(skip_all, fields(task = task.name()))]
pub fn run_task(task: Task, cfg: &TasksConfig, os: OsFamily, host: &mut Host<'_>) -> Result<()> {
    let steps = plan(task, cfg, os);
    info!(steps = steps.len(), "starting task");
    execute(&steps, host)?;
    info!("task finished");
    Ok(())
}

/// Run `steps` strictly in order. The first error aborts the walk; nothing
/// already produced is rolled back.
pub fn execute(steps: &[Step], host: &mut Host<'_>) -> Result<()> {
    let total = steps.len();
    for (idx, step) in steps.iter().enumerate() {
        let n = idx + 1;
        debug!(n, total, %step, "running step");
        execute_step(step, host).with_context(|| format!("step {n}/{total} ({step})"))?;
    }
    Ok(())
}

fn execute_step(step: &Step, host: &mut Host<'_>) -> Result<()> {
    match step {
        Step::Say(message) => {
            println!("{message}");
            Ok(())
        }
        Step::RequireOnPath(tool) => require_on_path(host.lookup, tool).map(|_| ()),
        Step::InstallIfMissing { tool, install } => {
            if host.lookup.find(&tool.command).is_some() {
                println!("{} found...", tool.name);
                return Ok(());
            }
            println!("{} not found! Installing it...", tool.name);
            host.runner.run(install)?;
            require_on_path(host.lookup, tool)
                .with_context(|| format!("{} still missing after install", tool.command))
                .map(|_| ())
        }
        Step::Run(invocation) => host.runner.run(invocation),
        Step::RunManaged { tool, args } => host.resolver.run_managed(host.runner, tool, args),
        Step::RemoveDir(path) => remove(&host.workdir.join(path), true),
        Step::RemoveFile(path) => remove(&host.workdir.join(path), false),
    }
}

/// Remove `path`. With `recursive`, a regular file in place of the expected
/// directory is removed too.
fn remove(path: &Path, recursive: bool) -> Result<()> {
    let result = if recursive && path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => {
            debug!(path = %path.display(), "removed");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "nothing to remove");
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("remove {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixedLookup, ScriptedRunner, workspace_with};

    const ALL_TOOLS: &[&str] = &["node", "go", "npm", "gulp"];

    #[test]
    fn run_task_executes_the_dev_command() {
        let runner = ScriptedRunner::new();
        let lookup = FixedLookup::with(ALL_TOOLS);
        let cfg = TasksConfig::default();
        let mut host = Host::new(&runner, &lookup, &cfg, "/work");

        run_task(Task::Run, &cfg, OsFamily::Linux, &mut host).expect("run");

        let calls: Vec<String> = runner.invocations().iter().map(ToString::to_string).collect();
        assert_eq!(
            calls,
            vec!["go run config.go csv_provider.go providers.go web.go viz.go"]
        );
        assert_eq!(runner.capture_count(), 0);
    }

    #[test]
    fn production_stops_after_failed_cross_compile() {
        let workspace = workspace_with(&["build/old_binary", "rice-box.go"]).expect("workspace");
        let runner = ScriptedRunner::new().fail_nth("gox", 3);
        let lookup = FixedLookup::with(ALL_TOOLS);
        let cfg = TasksConfig::default();
        let mut host = Host::new(&runner, &lookup, &cfg, workspace.path());

        let err = run_task(Task::Production, &cfg, OsFamily::Linux, &mut host)
            .expect_err("third gox fails");

        let gox = runner.runs_of("gox");
        assert_eq!(gox.len(), 3);
        assert_eq!(gox[2].args[0], "-osarch=linux/386");
        assert!(format!("{err:#}").starts_with("step 6/9"));
        assert!(!workspace.path().join("build").exists());
        assert!(workspace.path().join("rice-box.go").exists());
    }

    #[test]
    fn production_queries_managed_root_once() {
        let workspace = workspace_with(&["rice-box.go"]).expect("workspace");
        let runner = ScriptedRunner::new();
        let lookup = FixedLookup::with(ALL_TOOLS);
        let cfg = TasksConfig::default();
        let mut host = Host::new(&runner, &lookup, &cfg, workspace.path());

        run_task(Task::Production, &cfg, OsFamily::Linux, &mut host).expect("production");

        assert_eq!(runner.capture_count(), 1);
        assert_eq!(runner.runs_of("rice").len(), 1);
        assert_eq!(runner.runs_of("gox").len(), 5);
        let gox_path = PathBuf::from(&runner.runs_of("gox")[0].program);
        assert_eq!(gox_path, Path::new("/home/dev/go").join("bin").join("gox"));
        assert!(!workspace.path().join("rice-box.go").exists());
    }

    #[test]
    fn prepare_installs_missing_frontend_runner_with_sudo_on_linux() {
        let runner = ScriptedRunner::new();
        let lookup = FixedLookup::with(&["node", "go", "npm"]).installable("gulp");
        let cfg = TasksConfig::default();
        let mut host = Host::new(&runner, &lookup, &cfg, "/work");

        run_task(Task::Prepare, &cfg, OsFamily::Linux, &mut host).expect("prepare");

        let calls = runner.invocations();
        assert_eq!(
            calls[0],
            Invocation::new("sudo").args(["npm", "i", "-g", "gulp-cli"])
        );
        assert_eq!(calls[1], Invocation::new("npm").arg("i"));
        assert_eq!(calls[2].args[0], "get");
    }

    #[test]
    fn prepare_installs_without_sudo_elsewhere() {
        let runner = ScriptedRunner::new();
        let lookup = FixedLookup::with(&["node", "go", "npm"]).installable("gulp");
        let cfg = TasksConfig::default();
        let mut host = Host::new(&runner, &lookup, &cfg, "/work");

        run_task(Task::Prepare, &cfg, OsFamily::MacOs, &mut host).expect("prepare");

        assert_eq!(
            runner.invocations()[0],
            Invocation::new("npm").args(["i", "-g", "gulp-cli"])
        );
    }

    #[test]
    fn prepare_skips_install_when_frontend_runner_present() {
        let runner = ScriptedRunner::new();
        let lookup = FixedLookup::with(ALL_TOOLS);
        let cfg = TasksConfig::default();
        let mut host = Host::new(&runner, &lookup, &cfg, "/work");

        run_task(Task::Prepare, &cfg, OsFamily::Linux, &mut host).expect("prepare");

        assert!(runner.runs_of("sudo").is_empty());
        assert_eq!(runner.invocations().len(), 2);
    }

    #[test]
    fn prepare_fails_when_install_does_not_provide_the_tool() {
        let runner = ScriptedRunner::new();
        let lookup = FixedLookup::with(&["node", "go", "npm"]);
        let cfg = TasksConfig::default();
        let mut host = Host::new(&runner, &lookup, &cfg, "/work");

        let err = run_task(Task::Prepare, &cfg, OsFamily::Windows, &mut host)
            .expect_err("gulp never appears");

        assert!(format!("{err:#}").contains("Please, install Gulp and return!"));
        assert_eq!(runner.invocations().len(), 1);
    }

    #[test]
    fn prepare_aborts_before_running_anything_when_toolchain_missing() {
        let runner = ScriptedRunner::new();
        let lookup = FixedLookup::with(&["node", "npm", "gulp"]);
        let cfg = TasksConfig::default();
        let mut host = Host::new(&runner, &lookup, &cfg, "/work");

        let err = run_task(Task::Prepare, &cfg, OsFamily::Linux, &mut host)
            .expect_err("go missing");

        assert_eq!(
            format!("{err:#}"),
            "step 2/9 (require go): Please, install Go and return!"
        );
        assert!(runner.invocations().is_empty());
    }

    #[test]
    fn remove_steps_tolerate_missing_paths() {
        let workspace = workspace_with(&[]).expect("workspace");
        let runner = ScriptedRunner::new();
        let lookup = FixedLookup::with(&[]);
        let cfg = TasksConfig::default();
        let mut host = Host::new(&runner, &lookup, &cfg, workspace.path());

        execute(
            &[
                Step::RemoveDir(PathBuf::from("build")),
                Step::RemoveFile(PathBuf::from("rice-box.go")),
            ],
            &mut host,
        )
        .expect("missing paths are fine");
        assert!(runner.invocations().is_empty());
    }

    #[test]
    fn remove_dir_step_removes_a_file_in_its_place() {
        let workspace = workspace_with(&["build"]).expect("workspace");
        let runner = ScriptedRunner::new();
        let lookup = FixedLookup::with(&[]);
        let cfg = TasksConfig::default();
        let mut host = Host::new(&runner, &lookup, &cfg, workspace.path());

        execute(&[Step::RemoveDir(PathBuf::from("build"))], &mut host).expect("remove");

        assert!(!workspace.path().join("build").exists());
    }
}
