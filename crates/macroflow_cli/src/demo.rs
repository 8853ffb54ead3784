//! `macroflow demo`: the built-in scenario without a project file.

use macroflow_config::ToolConfig;
use macroflow_flow::{run_hard_macro_demo, ExternalBackend, FlowError, HdlSession, PHYSICAL_FILESET};

use crate::pipeline::{render_diagnostics, status};
use crate::{DemoArgs, GlobalArgs};

/// Runs the `macroflow demo` command.
pub fn run(args: &DemoArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let workdir = std::path::PathBuf::from(&args.workdir);
    std::fs::create_dir_all(&workdir)?;

    let mut tool = ToolConfig::default();
    if let Some(command) = &args.tool {
        tool.command = command.clone();
    }
    let backend = ExternalBackend::from_tool(&tool);

    status(global, "Running", format!("hard-macro demo in {}", workdir.display()));
    let mut session = HdlSession::new();
    let outcome = match run_hard_macro_demo(&workdir, &backend, &mut session) {
        Ok(outcome) => outcome,
        Err(e) => {
            render_diagnostics(&session, global);
            if let FlowError::ToolFailed { stderr_tail, .. } = &e {
                eprintln!("{stderr_tail}");
            }
            return Err(e.into());
        }
    };
    render_diagnostics(&session, global);

    print!("{}", outcome.a.summary());
    println!(
        "library {} ({}) provides {}",
        outcome.library.name(),
        outcome.library.pdk(),
        outcome.library.cells().join(", ")
    );
    if let Some(physical) = outcome.library.fileset(PHYSICAL_FILESET) {
        for file in &physical.files {
            println!("  {}", file.display());
        }
    }
    print!("{}", outcome.b.summary());
    status(global, "Finished", "hard-macro demo");
    Ok(0)
}
