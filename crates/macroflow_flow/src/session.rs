//! Parsed-source state shared by every design checked in one invocation.

use crate::error::FlowError;
use macroflow_common::Interner;
use macroflow_diagnostics::{DiagnosticSink, FileId, SourceMap};
use macroflow_hdl::{ModuleIndex, SourceUnit};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Source files, their parses, and the diagnostics they produced.
///
/// Each path is read and parsed at most once, so a file shared between
/// designs yields its diagnostics once.
#[derive(Default)]
pub struct HdlSession {
    pub sources: SourceMap,
    pub interner: Interner,
    pub sink: DiagnosticSink,
    loaded: HashMap<PathBuf, FileId>,
    units: HashMap<FileId, SourceUnit>,
}

impl HdlSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and parses `path` unless it already has been.
    pub fn parse(&mut self, path: &Path) -> Result<FileId, FlowError> {
        if let Some(id) = self.loaded.get(path) {
            return Ok(*id);
        }
        let id = self.sources.load(path).map_err(|e| FlowError::io(path, e))?;
        let unit = macroflow_hdl::parse_file(&self.sources, id, &self.interner, &self.sink);
        tracing::debug!(
            path = %path.display(),
            modules = unit.modules.len(),
            "parsed source"
        );
        self.loaded.insert(path.to_path_buf(), id);
        self.units.insert(id, unit);
        Ok(id)
    }

    /// Parses every path, returning file ids in the same order.
    pub fn parse_all<'p>(
        &mut self,
        paths: impl IntoIterator<Item = &'p PathBuf>,
    ) -> Result<Vec<FileId>, FlowError> {
        paths.into_iter().map(|p| self.parse(p)).collect()
    }

    /// The parse of a file returned by [`HdlSession::parse`].
    pub fn unit(&self, id: FileId) -> Option<&SourceUnit> {
        self.units.get(&id)
    }

    /// Indexes the modules of the given files. Duplicate definitions are
    /// reported to the sink.
    pub fn index(&self, files: &[FileId]) -> ModuleIndex<'_> {
        ModuleIndex::build(
            files.iter().filter_map(|id| self.units.get(id)),
            &self.interner,
            &self.sink,
        )
    }
}
