//! `macroflow summary`: print a recorded job.

use macroflow_config::load_config;
use macroflow_flow::{BuildLayout, JobRecord, RunSummary};

use crate::pipeline::resolve_project_root;
use crate::{GlobalArgs, SummaryArgs};

/// Runs the `macroflow summary` command.
///
/// Works for failed jobs too; only a missing record is an error.
pub fn run(args: &SummaryArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = load_config(&project_dir)?;
    let job = args.job.as_deref().unwrap_or(&config.workspace.job);
    let layout = BuildLayout::new(
        project_dir.join(&config.workspace.build_dir),
        &args.design,
        job,
    );

    let path = layout.record_path();
    if !path.is_file() {
        return Err(format!(
            "no job record for design '{}' job '{job}' (expected {})",
            args.design,
            path.display()
        )
        .into());
    }
    let record = JobRecord::load(&path)?;
    print!("{}", RunSummary::new(&record, &layout));
    Ok(0)
}
