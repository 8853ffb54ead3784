//! `macroflow emit`: (re)write the built-in sources.

use macroflow_flow::{emit_builtin, EmitOutcome};

use crate::pipeline::{resolve_project_root, status};
use crate::GlobalArgs;

/// Runs the `macroflow emit` command.
///
/// Writes into the project directory, or the current directory when there
/// is no project.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let dir = match resolve_project_root(global) {
        Ok(dir) => dir,
        Err(_) => std::env::current_dir()?,
    };
    for (path, outcome) in emit_builtin(&dir)? {
        let verb = match outcome {
            EmitOutcome::Written => "Wrote",
            EmitOutcome::Unchanged => "Unchanged",
        };
        status(global, verb, path.display());
    }
    Ok(0)
}
