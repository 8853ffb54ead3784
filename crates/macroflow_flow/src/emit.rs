//! Writing HDL and constraint text to disk.

use crate::error::FlowError;
use macroflow_common::ContentHash;
use macroflow_config::ResolvedClock;
use std::path::Path;

/// What [`emit_source`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    /// The file was created or its content replaced.
    Written,
    /// The file already held exactly this content.
    Unchanged,
}

/// Writes `text` to `path`, creating parent directories.
///
/// An existing file whose content hash matches `text` is left untouched.
pub fn emit_source(path: &Path, text: &str) -> Result<EmitOutcome, FlowError> {
    if let Ok(existing) = ContentHash::from_file(path) {
        if existing == ContentHash::from_bytes(text.as_bytes()) {
            tracing::debug!(path = %path.display(), "source unchanged");
            return Ok(EmitOutcome::Unchanged);
        }
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| FlowError::io(parent, e))?;
    }
    std::fs::write(path, text).map_err(|e| FlowError::io(path, e))?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "source written");
    Ok(EmitOutcome::Written)
}

/// Renders one `create_clock` line per clock.
pub fn sdc_from_clocks(clocks: &[ResolvedClock]) -> String {
    clocks
        .iter()
        .map(|clock| {
            format!(
                "create_clock -name {} -period {} [get_ports {}]\n",
                clock.name,
                clock.period.ns(),
                clock.port
            )
        })
        .collect()
}
