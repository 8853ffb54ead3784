//! Helpers shared by the CLI commands: project discovery, status lines, and
//! diagnostic rendering.

use std::path::{Path, PathBuf};

use macroflow_config::CONFIG_FILE;
use macroflow_diagnostics::{DiagnosticRenderer, TerminalRenderer};
use macroflow_flow::HdlSession;

use crate::GlobalArgs;

/// Walks up from `start` looking for the nearest directory containing
/// `macroflow.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project directory from `--config` (file or directory), or
/// by searching upward from the current directory.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match &global.config {
        Some(config_path) => {
            let p = PathBuf::from(config_path);
            if p.is_file() {
                Ok(p.parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map_or_else(|| PathBuf::from("."), Path::to_path_buf))
            } else {
                Ok(p)
            }
        }
        None => find_project_root(&std::env::current_dir()?),
    }
}

/// Prints a right-aligned, cargo-style status line unless `--quiet`.
pub fn status(global: &GlobalArgs, verb: &str, message: impl std::fmt::Display) {
    if !global.quiet {
        eprintln!("{verb:>12} {message}");
    }
}

/// Renders and drains every diagnostic collected so far.
pub fn render_diagnostics(session: &HdlSession, global: &GlobalArgs) {
    let renderer = TerminalRenderer::new(global.color);
    for diag in session.sink.take_all() {
        if global.quiet && !diag.severity.is_error() {
            continue;
        }
        eprint!("{}", renderer.render(&diag, &session.sources));
    }
}
