//! Design descriptors: named filesets with a top module each.

use crate::error::FlowError;
use crate::session::HdlSession;
use macroflow_diagnostics::{Diagnostic, DiagnosticCode};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// An immutable design unit.
#[derive(Debug, Clone)]
pub struct Design {
    name: String,
    dataroot: PathBuf,
    filesets: BTreeMap<String, Vec<PathBuf>>,
    tops: BTreeMap<String, String>,
}

impl Design {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory relative file references were resolved against.
    pub fn dataroot(&self) -> &Path {
        &self.dataroot
    }

    /// Files of a fileset, resolved against the data root.
    pub fn files(&self, fileset: &str) -> Option<&[PathBuf]> {
        self.filesets.get(fileset).map(Vec::as_slice)
    }

    /// The top module declared for a fileset.
    pub fn top(&self, fileset: &str) -> Option<&str> {
        self.tops.get(fileset).map(String::as_str)
    }

    /// Fileset names in sorted order.
    pub fn filesets(&self) -> impl Iterator<Item = &str> {
        self.filesets.keys().map(String::as_str)
    }

    pub fn has_fileset(&self, fileset: &str) -> bool {
        self.filesets.contains_key(fileset)
    }
}

/// Collects files and top modules, then validates them into a [`Design`].
#[derive(Debug, Clone)]
pub struct DesignBuilder {
    name: String,
    dataroot: PathBuf,
    filesets: BTreeMap<String, Vec<PathBuf>>,
    tops: BTreeMap<String, String>,
}

impl DesignBuilder {
    /// Starts a design. The data root defaults to the current directory.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dataroot: PathBuf::from("."),
            filesets: BTreeMap::new(),
            tops: BTreeMap::new(),
        }
    }

    /// Sets the directory relative file paths are resolved against.
    pub fn set_dataroot(mut self, root: impl Into<PathBuf>) -> Self {
        self.dataroot = root.into();
        self
    }

    /// Appends a file to a fileset, creating the fileset on first use.
    pub fn add_file(mut self, file: impl AsRef<Path>, fileset: &str) -> Self {
        let path = self.dataroot.join(file);
        self.filesets.entry(fileset.to_string()).or_default().push(path);
        self
    }

    /// Declares the top module of a fileset.
    pub fn set_topmodule(mut self, top: impl Into<String>, fileset: &str) -> Self {
        self.tops.insert(fileset.to_string(), top.into());
        self
    }

    /// Validates the descriptor.
    ///
    /// Every fileset must have files, every top must name a known fileset,
    /// and the fileset's sources must parse and define the top module.
    pub fn build(self, session: &mut HdlSession) -> Result<Design, FlowError> {
        if self.filesets.is_empty() {
            return Err(FlowError::EmptyFileset {
                design: self.name,
                fileset: "(none)".to_string(),
            });
        }
        for (fileset, files) in &self.filesets {
            if files.is_empty() {
                return Err(FlowError::EmptyFileset {
                    design: self.name.clone(),
                    fileset: fileset.clone(),
                });
            }
        }

        for (fileset, top) in &self.tops {
            let files = self
                .filesets
                .get(fileset)
                .ok_or_else(|| FlowError::UnknownFileset {
                    design: self.name.clone(),
                    fileset: fileset.clone(),
                })?;

            let errors_before = session.sink.error_count();
            let ids = session.parse_all(files)?;
            let parse_errors = session.sink.error_count() - errors_before;
            if parse_errors > 0 {
                return Err(FlowError::Rejected {
                    design: self.name.clone(),
                    errors: parse_errors,
                });
            }

            let defined = session.interner.get(top).is_some_and(|ident| {
                ids.iter()
                    .filter_map(|id| session.unit(*id))
                    .flat_map(|unit| &unit.modules)
                    .any(|module| module.name == ident)
            });
            if !defined {
                let mut diag = Diagnostic::error(
                    DiagnosticCode::TOP_NOT_FOUND,
                    format!("top module `{top}` is not defined in fileset `{fileset}`"),
                );
                for file in files {
                    diag = diag.with_note(format!("searched {}", file.display()));
                }
                session.sink.emit(diag);
                return Err(FlowError::TopNotFound {
                    design: self.name.clone(),
                    top: top.clone(),
                    fileset: fileset.clone(),
                });
            }
        }

        tracing::debug!(design = %self.name, filesets = self.filesets.len(), "design built");
        Ok(Design {
            name: self.name,
            dataroot: self.dataroot,
            filesets: self.filesets,
            tops: self.tops,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{A_V, B_V};
    use tempfile::TempDir;

    fn workdir() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("A.v"), A_V).unwrap();
        std::fs::write(dir.path().join("B.v"), B_V).unwrap();
        dir
    }

    #[test]
    fn single_file_design() {
        let dir = workdir();
        let mut session = HdlSession::new();
        let design = DesignBuilder::new("A")
            .set_dataroot(dir.path())
            .add_file("A.v", "verilog")
            .set_topmodule("A", "verilog")
            .build(&mut session)
            .unwrap();
        assert_eq!(design.name(), "A");
        assert_eq!(design.top("verilog"), Some("A"));
        assert_eq!(design.files("verilog").unwrap(), &[dir.path().join("A.v")]);
        assert_eq!(design.filesets().collect::<Vec<_>>(), vec!["verilog"]);
        assert!(!session.sink.has_errors());
    }

    #[test]
    fn top_must_be_defined() {
        let dir = workdir();
        let mut session = HdlSession::new();
        let err = DesignBuilder::new("A")
            .set_dataroot(dir.path())
            .add_file("A.v", "verilog")
            .set_topmodule("Z", "verilog")
            .build(&mut session)
            .unwrap_err();
        assert!(matches!(err, FlowError::TopNotFound { ref top, .. } if top == "Z"));
        let diags = session.sink.diagnostics();
        assert_eq!(diags[0].code, DiagnosticCode::TOP_NOT_FOUND);
    }

    #[test]
    fn top_for_unknown_fileset() {
        let dir = workdir();
        let err = DesignBuilder::new("A")
            .set_dataroot(dir.path())
            .add_file("A.v", "verilog")
            .set_topmodule("A", "rtl")
            .build(&mut HdlSession::new())
            .unwrap_err();
        assert!(matches!(err, FlowError::UnknownFileset { ref fileset, .. } if fileset == "rtl"));
    }

    #[test]
    fn no_files() {
        let err = DesignBuilder::new("A")
            .set_topmodule("A", "verilog")
            .build(&mut HdlSession::new())
            .unwrap_err();
        assert!(matches!(err, FlowError::EmptyFileset { .. }));
    }

    #[test]
    fn syntax_errors_reject_design() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("bad.v"), "module bad(input x\nendmodule\n").unwrap();
        let mut session = HdlSession::new();
        let err = DesignBuilder::new("bad")
            .set_dataroot(dir.path())
            .add_file("bad.v", "verilog")
            .set_topmodule("bad", "verilog")
            .build(&mut session)
            .unwrap_err();
        assert!(matches!(err, FlowError::Rejected { errors, .. } if errors > 0));
    }

    #[test]
    fn top_defined_in_second_file() {
        let dir = workdir();
        let mut session = HdlSession::new();
        let design = DesignBuilder::new("B")
            .set_dataroot(dir.path())
            .add_file("A.v", "verilog")
            .add_file("B.v", "verilog")
            .set_topmodule("B", "verilog")
            .build(&mut session)
            .unwrap();
        assert_eq!(design.files("verilog").unwrap().len(), 2);
    }
}
