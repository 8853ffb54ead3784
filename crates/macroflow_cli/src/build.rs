//! `macroflow build`: run the flow for each design in hard-macro order.
//!
//! 1. Find the project and load `macroflow.toml`
//! 2. Plan the designs to build
//! 3. For each design: attach libraries from earlier runs, run the tool,
//!    verify artifacts, and record the job

use std::collections::BTreeMap;

use macroflow_config::load_config;
use macroflow_flow::{BuildPlan, ExternalBackend, FlowError, HdlSession};

use crate::pipeline::{render_diagnostics, resolve_project_root, status};
use crate::{BuildArgs, GlobalArgs};

/// Runs the `macroflow build` command.
///
/// Stops at the first design that fails. Returns exit code 0 when every
/// planned design completed.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = load_config(&project_dir)?;
    let plan = BuildPlan::new(&config, &project_dir, args.design.as_deref(), args.with_deps)?;
    let backend = ExternalBackend::from_tool(&config.tool);

    status(
        global,
        "Building",
        format!("{} ({})", config.workspace.name, plan.order().join(", ")),
    );

    let mut session = HdlSession::new();
    let mut completed = BTreeMap::new();
    for name in plan.order() {
        let project = match plan.prepare(name, &completed, &mut session) {
            Ok(project) => project,
            Err(e) => {
                render_diagnostics(&session, global);
                return Err(e.into());
            }
        };
        for library in project.libraries() {
            status(
                global,
                "Attaching",
                format!("{} ({}) to {name}", library.name(), library.cells().join(", ")),
            );
        }
        status(global, "Running", format!("{name} in {}", project.layout().job_dir().display()));

        match project.run(&backend, &mut session) {
            Ok(run) => {
                render_diagnostics(&session, global);
                status(
                    global,
                    "Finished",
                    format!("{name} ({} artifacts verified)", run.record().artifacts.len()),
                );
                completed.insert(name.clone(), run);
            }
            Err(e) => {
                render_diagnostics(&session, global);
                if let FlowError::ToolFailed { stderr_tail, .. } = &e {
                    if !stderr_tail.is_empty() {
                        eprintln!("{stderr_tail}");
                    }
                }
                return Err(e.into());
            }
        }
    }
    Ok(0)
}
