//! Task planning: the fixed step list behind each subcommand.
//!
//! Planning is pure. The only host-dependent input is the [`OsFamily`], which
//! decides whether a global install needs the privilege prefix.

use crate::core::platform::{OsFamily, Platform};
use crate::core::types::{Invocation, Step, Task};
use crate::io::config::{ProductionConfig, TasksConfig};

/// Build the ordered steps for `task`.
pub fn plan(task: Task, cfg: &TasksConfig, os: OsFamily) -> Vec<Step> {
    match task {
        Task::Prepare => plan_prepare(cfg, os),
        Task::Watch => plan_watch(cfg),
        Task::Run => plan_run(cfg),
        Task::Production => plan_production(cfg),
    }
}

fn plan_prepare(cfg: &TasksConfig, os: OsFamily) -> Vec<Step> {
    let tools = &cfg.tools;

    let mut install = Invocation::new(&tools.package_manager.command).args([
        "i",
        "-g",
        tools.frontend_runner_package.as_str(),
    ]);
    if os.elevates_global_installs() {
        install = install.prefixed(&tools.elevate);
    }

    vec![
        Step::RequireOnPath(tools.runtime.clone()),
        Step::RequireOnPath(tools.toolchain.clone()),
        Step::RequireOnPath(tools.package_manager.clone()),
        Step::InstallIfMissing {
            tool: tools.frontend_runner.clone(),
            install,
        },
        Step::Say(format!("Installing {} dependencies...", tools.package_manager.name)),
        Step::Run(Invocation::new(&tools.package_manager.command).arg("i")),
        Step::Say(format!("Installing {} dependencies...", tools.toolchain.name)),
        Step::Run(
            Invocation::new(&tools.toolchain.command)
                .arg("get")
                .args(cfg.prepare.toolchain_deps.iter().cloned()),
        ),
        Step::Say("Ready for development!".to_string()),
    ]
}

fn plan_watch(cfg: &TasksConfig) -> Vec<Step> {
    vec![Step::Run(
        Invocation::new(&cfg.tools.frontend_runner.command).arg("watch"),
    )]
}

fn plan_run(cfg: &TasksConfig) -> Vec<Step> {
    vec![Step::Run(
        Invocation::new(&cfg.tools.toolchain.command)
            .arg("run")
            .args(cfg.run.entry_files.iter().cloned()),
    )]
}

fn plan_production(cfg: &TasksConfig) -> Vec<Step> {
    let production = &cfg.production;
    let mut steps = vec![
        Step::Run(
            Invocation::new(&cfg.tools.frontend_runner.command).args(["build", "--production"]),
        ),
        Step::RunManaged {
            tool: production.embed_tool.clone(),
            args: production.embed_args.clone(),
        },
        Step::RemoveDir(production.build_dir.clone()),
    ];
    steps.extend(
        production
            .platforms
            .iter()
            .map(|platform| cross_compile(production, platform)),
    );
    steps.push(Step::RemoveFile(production.embed_artifact.clone()));
    steps
}

fn cross_compile(production: &ProductionConfig, platform: &Platform) -> Step {
    Step::RunManaged {
        tool: production.cross_tool.clone(),
        args: vec![
            format!("-osarch={platform}"),
            format!("-output={}", production.output_template),
        ],
    }
}
